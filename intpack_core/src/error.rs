use thiserror::Error;

/// Unified error type for every codec operation in the workspace.
///
/// Nothing in this subsystem is logged-and-swallowed: a failure while
/// encoding or decoding always reaches the caller as one of these variants.
/// All operations are deterministic, so retrying without fixing the cause
/// (buffer sizing, pool capacity, input domain) will fail the same way.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The pre-sized output buffer ran out of bits mid-encode.
    ///
    /// Codecs size their buffers with generous fixed slack, so hitting this
    /// signals either a sizing bug or pathological input (e.g. a huge unary
    /// run in Rice coding).
    #[error("bit buffer overflow: needed {needed} bits but capacity is {capacity} bits")]
    BufferOverflow { needed: usize, capacity: usize },

    /// A read ran past the end of the compressed stream.
    #[error("unexpected end of compressed stream at bit {pos}")]
    UnexpectedEof { pos: usize },

    /// A gamma-family codec was handed a zero.
    ///
    /// Gamma codes cannot represent zero; callers are expected to have
    /// applied the delta transform (whose +1 bump guarantees values ≥ 1)
    /// before compressing an ascending id list.
    #[error("value at index {index} is zero; gamma coding requires values >= 1 (apply delta first)")]
    NonPositiveValue { index: usize },

    /// The caller's output slice cannot hold the decoded values.
    #[error("output slice too small: need {need} values, have room for {have}")]
    OutputTooSmall { need: usize, have: usize },

    /// A decoded prefix implies a value wider than 32 bits — the stream is
    /// corrupt or was produced by a different codec.
    #[error("corrupt code at bit {pos}: implied width {width} exceeds 32 bits")]
    CorruptCode { pos: usize, width: u32 },

    /// A compressed unit is shorter than its header or the requested window
    /// says it must be.
    #[error("compressed unit truncated: expected {claimed} ints but unit holds {actual}")]
    TruncatedUnit { claimed: usize, actual: usize },

    /// No pooled compressor instance became available within the bounded wait.
    #[error("compressor pool exhausted: no instance available after {waited_ms} ms")]
    PoolExhausted { waited_ms: u64 },

    /// The wrapped block-compression algorithm itself failed.
    #[error("block compressor failed: {0}")]
    Compressor(String),
}

pub type Result<T> = std::result::Result<T, CodecError>;
