use intpack_core::error::{CodecError, Result};
use intpack_core::{BitReader, BitWriter};

use crate::bitstream::{BitCoder, BitStreamCodec};

/// Rice (power-of-two Golomb) codec over the shared bit-stream framing.
///
/// One parameter `b` is computed per compressed block from the block's
/// arithmetic mean and written as a fixed 32-bit header; every value is
/// then a unary quotient (`v >> b`) followed by a `b`-bit remainder.
///
/// The heuristic `b = max(1, floor(0.69 * mean))` assumes a roughly
/// geometric value distribution — true for d-gaps of sorted id lists — and
/// is recomputed independently per block, with no cross-block adaptation.
/// Fully deterministic: the same block always yields the same header and
/// the same bytes.
///
/// Tolerates zeros, unlike gamma.
pub type RiceCodec = BitStreamCodec<RiceCoder>;

/// Per-block Rice coder.
#[derive(Debug, Default)]
pub struct RiceCoder;

impl RiceCoder {
    /// Rice parameter for one block: `max(1, floor(0.69 * mean))`.
    ///
    /// 0.69 ≈ ln 2; for a geometric distribution the optimal divisor is
    /// near `2^(ln 2 · mean)`, and the lower clamp keeps a usable remainder
    /// width on near-constant blocks. The upper clamp at 31 keeps every
    /// shift in u32 range.
    fn parameter(values: &[u32]) -> u32 {
        if values.is_empty() {
            return 1;
        }
        let sum: u64 = values.iter().map(|&v| v as u64).sum();
        let mean = sum as f64 / values.len() as f64;
        ((0.69 * mean) as u32).clamp(1, 31)
    }
}

impl BitCoder for RiceCoder {
    fn encode(&self, values: &[u32], writer: &mut BitWriter) -> Result<()> {
        let b = Self::parameter(values);
        writer.write_bits(b, 32)?;
        let mask = if b > 0 { (1u32 << b) - 1 } else { 0 };
        for &v in values {
            writer.write_unary(v >> b)?;
            if b > 0 {
                writer.write_bits(v & mask, b)?;
            }
        }
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>, output: &mut [u32]) -> Result<()> {
        let b = reader.read_bits(32)?;
        if b > 31 {
            return Err(CodecError::CorruptCode {
                pos: reader.bits_read(),
                width: b,
            });
        }
        for slot in output.iter_mut() {
            let quotient = reader.read_unary()?;
            if b > 0 && quotient >> (32 - b) != 0 {
                return Err(CodecError::CorruptCode {
                    pos: reader.bits_read(),
                    width: b + 32 - quotient.leading_zeros(),
                });
            }
            *slot = if b > 0 {
                (quotient << b) | reader.read_bits(b)?
            } else {
                quotient
            };
        }
        Ok(())
    }
}
