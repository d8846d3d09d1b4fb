use intpack_core::codec::{Codec, CodecStats, StatsSnapshot};
use intpack_core::error::{CodecError, Result};

/// No-op codec: stores the window verbatim, with no compression.
///
/// Useful for:
/// - Verifying storage-layer plumbing independently of any real codec.
/// - Baseline ratios when comparing codecs on the same id lists.
///
/// `is_integrated()` returns `true` even though nothing delta-sensitive
/// happens here. This is a deliberate convention, not a bug: it tells
/// upstream callers they may skip the delta/atled stage entirely, which is
/// exactly right for a verbatim copy. Downstream code relies on it — do not
/// "fix" it.
#[derive(Debug, Default)]
pub struct IdentityCodec {
    stats: CodecStats,
}

impl IdentityCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Codec for IdentityCodec {
    type Compressed = Vec<u32>;

    fn compress(&self, input: &[u32]) -> Result<Vec<u32>> {
        self.stats
            .record(input.len() as u64 * 4, input.len() as u64 * 4);
        Ok(input.to_vec())
    }

    /// Returns the number of values written (always `output.len()`).
    fn decompress(&self, unit: &Vec<u32>, output: &mut [u32]) -> Result<usize> {
        if unit.len() < output.len() {
            return Err(CodecError::TruncatedUnit {
                claimed: output.len(),
                actual: unit.len(),
            });
        }
        output.copy_from_slice(&unit[..output.len()]);
        Ok(output.len())
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn reset(&self) {
        self.stats.reset();
    }

    fn is_integrated(&self) -> bool {
        true
    }
}
