use intpack_core::error::{CodecError, Result};
use intpack_core::{BitReader, BitWriter};

use crate::bitstream::{BitCoder, BitStreamCodec};

/// Elias-gamma codec over the shared bit-stream framing.
///
/// Best for: d-gaps of dense ascending id lists, where most gaps are tiny
/// and the implicit geometric prior of gamma codes fits well.
///
/// Domain: values must be ≥ 1. Pair with the delta transform, whose +1 bump
/// guarantees this for strictly ascending input; a raw zero fails fast with
/// [`CodecError::NonPositiveValue`].
pub type GammaCodec = BitStreamCodec<GammaCoder>;

/// Per-value Elias-gamma coder.
///
/// For `v` with bit length `b + 1`: a unary prefix of `b` zeros, then `v`
/// in `b + 1` bits. The leading 1 of `v` doubles as the unary terminator,
/// so encode emits `unary(b)` followed by the low `b` bits of `v`.
#[derive(Debug, Default)]
pub struct GammaCoder;

impl BitCoder for GammaCoder {
    fn encode(&self, values: &[u32], writer: &mut BitWriter) -> Result<()> {
        for (index, &v) in values.iter().enumerate() {
            if v == 0 {
                return Err(CodecError::NonPositiveValue { index });
            }
            let b = 31 - v.leading_zeros();
            writer.write_unary(b)?;
            if b > 0 {
                writer.write_bits(v & ((1 << b) - 1), b)?;
            }
        }
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>, output: &mut [u32]) -> Result<()> {
        for slot in output.iter_mut() {
            let b = reader.read_unary()?;
            if b > 31 {
                return Err(CodecError::CorruptCode {
                    pos: reader.bits_read(),
                    width: b + 1,
                });
            }
            let rest = if b > 0 { reader.read_bits(b)? } else { 0 };
            *slot = (1 << b) | rest;
        }
        Ok(())
    }
}
