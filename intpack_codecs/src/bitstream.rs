use intpack_core::codec::{Codec, CodecStats, StatsSnapshot};
use intpack_core::error::Result;
use intpack_core::{BitReader, BitWriter};

/// Fixed slack added to every bit-stream output buffer, in bytes.
///
/// Generous enough that no realistic gap distribution resizes mid-stream;
/// pathological input that still overflows surfaces as a typed
/// `BufferOverflow` rather than a truncated write.
const BUFFER_SLACK: usize = 1024;

/// Per-value encoding strategy plugged into [`BitStreamCodec`].
///
/// The framing owns buffer allocation, truncation, and stats; the coder
/// only turns values into bits and back.
pub trait BitCoder {
    /// Encode every value of `values` into `writer`, in order.
    fn encode(&self, values: &[u32], writer: &mut BitWriter) -> Result<()>;

    /// Decode exactly `output.len()` values from `reader`, in order.
    fn decode(&self, reader: &mut BitReader<'_>, output: &mut [u32]) -> Result<()>;
}

/// Shared framing for bit-level entropy coders.
///
/// Compress allocates `len * 4 + 1024` bytes, runs the coder through a
/// [`BitWriter`], and truncates to the exact bytes written (final partial
/// byte rounded up, trailing bits zero). Decompress opens a [`BitReader`]
/// over the unit and reads exactly as many codes as the output window holds.
///
/// The whole family is non-integrated: callers delta ascending input before
/// `compress` and atled the output after `decompress`.
pub struct BitStreamCodec<C> {
    coder: C,
    stats: CodecStats,
}

impl<C: BitCoder> BitStreamCodec<C> {
    pub fn new(coder: C) -> Self {
        Self {
            coder,
            stats: CodecStats::new(),
        }
    }
}

impl<C: BitCoder + Default> Default for BitStreamCodec<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: BitCoder> Codec for BitStreamCodec<C> {
    type Compressed = Vec<u8>;

    fn compress(&self, input: &[u32]) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(input.len() * 4 + BUFFER_SLACK);
        self.coder.encode(input, &mut writer)?;
        let bytes = writer.into_bytes();
        self.stats.record(input.len() as u64 * 4, bytes.len() as u64);
        Ok(bytes)
    }

    /// Returns the number of values written (always `output.len()`).
    fn decompress(&self, unit: &Vec<u8>, output: &mut [u32]) -> Result<usize> {
        let mut reader = BitReader::new(unit);
        self.coder.decode(&mut reader, output)?;
        Ok(output.len())
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn reset(&self) {
        self.stats.reset();
    }

    fn is_integrated(&self) -> bool {
        false
    }
}
