//! Opaque block compressors wrapped by the pooled and per-call codecs.
//!
//! A [`BlockCompressor`] is a stateful, non-reentrant algorithm operating on
//! int arrays — the contract of PFOR-style libraries. The wrappers in
//! [`pooled`](crate::pooled) adapt any implementation to the [`Codec`]
//! contract; two real compressors from the workspace stack are bundled here.
//!
//! [`Codec`]: intpack_core::Codec

use intpack_core::error::{CodecError, Result};

/// Stateful block-compression algorithm over `u32` arrays.
///
/// Implementations may hold mutable scratch state between calls (reusable
/// contexts, work buffers) and are NOT assumed thread-safe: the wrappers
/// guarantee at most one in-flight call per instance.
pub trait BlockCompressor {
    /// Compress all of `input` into `output`, returning the number of ints
    /// written. Fails with [`CodecError::BufferOverflow`] if `output` cannot
    /// hold the result.
    fn compress(&mut self, input: &[u32], output: &mut [u32]) -> Result<usize>;

    /// Reconstruct exactly `output.len()` values from `input`, returning the
    /// number of input ints consumed.
    fn uncompress(&mut self, input: &[u32], output: &mut [u32]) -> Result<usize>;
}

// ── int/byte framing shared by the bundled compressors ─────────────────────
//
// Both bundled algorithms are byte-oriented, so the block is serialized to
// LE bytes and the compressed bytes are packed back into ints:
//   output[0]  = exact compressed byte count
//   output[1..] = compressed bytes, 4 per int, last int zero-padded

fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    bytes
}

fn pack_bytes(bytes: &[u8], output: &mut [u32]) -> Result<usize> {
    let words = bytes.len().div_ceil(4);
    let needed = 1 + words;
    if needed > output.len() {
        return Err(CodecError::BufferOverflow {
            needed: needed * 32,
            capacity: output.len() * 32,
        });
    }
    output[0] = bytes.len() as u32;
    for (i, chunk) in bytes.chunks(4).enumerate() {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        output[1 + i] = u32::from_le_bytes(word);
    }
    Ok(needed)
}

/// Returns `(compressed bytes, ints consumed)`.
fn unpack_bytes(input: &[u32]) -> Result<(Vec<u8>, usize)> {
    let byte_len = *input.first().ok_or(CodecError::TruncatedUnit {
        claimed: 1,
        actual: 0,
    })? as usize;
    let words = byte_len.div_ceil(4);
    if input.len() < 1 + words {
        return Err(CodecError::TruncatedUnit {
            claimed: 1 + words,
            actual: input.len(),
        });
    }
    let mut bytes = words_to_bytes(&input[1..1 + words]);
    bytes.truncate(byte_len);
    Ok((bytes, 1 + words))
}

fn bytes_to_output(bytes: &[u8], output: &mut [u32]) -> Result<()> {
    if bytes.len() != output.len() * 4 {
        return Err(CodecError::Compressor(format!(
            "decompressed to {} bytes, expected {}",
            bytes.len(),
            output.len() * 4
        )));
    }
    for (slot, chunk) in output.iter_mut().zip(bytes.chunks_exact(4)) {
        *slot = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(())
}

// ── zstd ───────────────────────────────────────────────────────────────────

/// Zstd-backed block compressor with reusable contexts.
///
/// The `zstd::bulk` compressor and decompressor contexts are created once
/// and reused across calls — genuinely mutable, non-thread-safe state, which
/// makes this the motivating case for [`PooledBlockCodec`].
///
/// Contexts are created lazily on first use so construction stays
/// infallible (pool factories are plain closures).
///
/// [`PooledBlockCodec`]: crate::PooledBlockCodec
pub struct ZstdBlockCompressor {
    level: i32,
    cctx: Option<zstd::bulk::Compressor<'static>>,
    dctx: Option<zstd::bulk::Decompressor<'static>>,
}

impl ZstdBlockCompressor {
    /// Level 1 = fast / larger, 22 = slow / smallest; 3 is the usual default.
    pub fn new(level: i32) -> Self {
        Self {
            level,
            cctx: None,
            dctx: None,
        }
    }
}

impl Default for ZstdBlockCompressor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl BlockCompressor for ZstdBlockCompressor {
    fn compress(&mut self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        let cctx = match self.cctx {
            Some(ref mut ctx) => ctx,
            None => {
                let ctx = zstd::bulk::Compressor::new(self.level)
                    .map_err(|e| CodecError::Compressor(e.to_string()))?;
                self.cctx.insert(ctx)
            }
        };
        let raw = words_to_bytes(input);
        let compressed = cctx
            .compress(&raw)
            .map_err(|e| CodecError::Compressor(e.to_string()))?;
        pack_bytes(&compressed, output)
    }

    fn uncompress(&mut self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        let dctx = match self.dctx {
            Some(ref mut ctx) => ctx,
            None => {
                let ctx = zstd::bulk::Decompressor::new()
                    .map_err(|e| CodecError::Compressor(e.to_string()))?;
                self.dctx.insert(ctx)
            }
        };
        let (compressed, consumed) = unpack_bytes(input)?;
        let raw = dctx
            .decompress(&compressed, output.len() * 4)
            .map_err(|e| CodecError::Compressor(e.to_string()))?;
        bytes_to_output(&raw, output)?;
        Ok(consumed)
    }
}

// ── lz4 ────────────────────────────────────────────────────────────────────

/// LZ4-backed block compressor using `lz4_flex` one-shot functions.
///
/// Carries no state at all, so it is cheap to construct fresh per call —
/// the motivating case for [`FreshBlockCodec`](crate::FreshBlockCodec).
#[derive(Debug, Default, Clone, Copy)]
pub struct Lz4BlockCompressor;

impl BlockCompressor for Lz4BlockCompressor {
    fn compress(&mut self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        let raw = words_to_bytes(input);
        let compressed = lz4_flex::compress_prepend_size(&raw);
        pack_bytes(&compressed, output)
    }

    fn uncompress(&mut self, input: &[u32], output: &mut [u32]) -> Result<usize> {
        let (compressed, consumed) = unpack_bytes(input)?;
        let raw = lz4_flex::decompress_size_prepended(&compressed)
            .map_err(|e| CodecError::Compressor(e.to_string()))?;
        bytes_to_output(&raw, output)?;
        Ok(consumed)
    }
}
