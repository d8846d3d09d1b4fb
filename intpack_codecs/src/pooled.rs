use intpack_core::codec::{Codec, CodecStats, StatsSnapshot};
use intpack_core::error::{CodecError, Result};

use crate::block::BlockCompressor;
use crate::pool::{CompressorPool, PoolConfig, PoolGuard};

/// Fixed slack added to every block-codec scratch buffer, in ints.
const BLOCK_SLACK: usize = 1024;

/// Compressed unit layout shared by the block wrappers:
/// `unit[0]` = count of compressed ints that follow, `unit[1..]` = payload.
fn frame_unit(payload: &[u32], written: usize) -> Vec<u32> {
    let mut unit = Vec::with_capacity(1 + written);
    unit.push(written as u32);
    unit.extend_from_slice(&payload[..written]);
    unit
}

/// Splits a unit into its payload, validating the count header.
fn unframe_unit(unit: &[u32]) -> Result<&[u32]> {
    let claimed = *unit.first().ok_or(CodecError::TruncatedUnit {
        claimed: 1,
        actual: 0,
    })? as usize;
    if unit.len() < 1 + claimed {
        return Err(CodecError::TruncatedUnit {
            claimed: 1 + claimed,
            actual: unit.len(),
        });
    }
    Ok(&unit[1..1 + claimed])
}

/// Adapts a stateful [`BlockCompressor`] to the [`Codec`] contract through
/// an instance pool.
///
/// Each `compress`/`decompress` call checks one instance out of the pool
/// for its whole duration and returns it on every exit path, so many
/// threads can share one codec while no wrapped instance ever sees two
/// concurrent calls.
///
/// Whether the wrapped algorithm wants delta-free input is a property of
/// that algorithm, not of this wrapper — it is threaded through at
/// construction as `integrated`.
pub struct PooledBlockCodec<C: BlockCompressor> {
    pool: CompressorPool<C>,
    integrated: bool,
    stats: CodecStats,
}

impl<C: BlockCompressor> PooledBlockCodec<C> {
    pub fn new(
        factory: impl Fn() -> C + Send + Sync + 'static,
        config: PoolConfig,
        integrated: bool,
    ) -> Self {
        Self {
            pool: CompressorPool::new(factory, config),
            integrated,
            stats: CodecStats::new(),
        }
    }

    fn checkout(&self) -> Result<PoolGuard<'_, C>> {
        self.pool.acquire()
    }
}

impl<C: BlockCompressor> Codec for PooledBlockCodec<C> {
    type Compressed = Vec<u32>;

    fn compress(&self, input: &[u32]) -> Result<Vec<u32>> {
        let mut scratch = vec![0u32; input.len() + BLOCK_SLACK];
        let written = {
            let mut compressor = self.checkout()?;
            compressor.compress(input, &mut scratch)?
        };
        let unit = frame_unit(&scratch, written);
        self.stats
            .record(input.len() as u64 * 4, unit.len() as u64 * 4);
        Ok(unit)
    }

    /// Returns the number of unit ints consumed, count header included.
    fn decompress(&self, unit: &Vec<u32>, output: &mut [u32]) -> Result<usize> {
        let payload = unframe_unit(unit)?;
        let mut compressor = self.checkout()?;
        compressor.uncompress(payload, output)?;
        Ok(1 + payload.len())
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn reset(&self) {
        self.stats.reset();
    }

    fn is_integrated(&self) -> bool {
        self.integrated
    }
}

/// Per-call variant of [`PooledBlockCodec`] for compressors that are cheap
/// to construct fresh — a stateless algorithm gains nothing from pooling,
/// and a new instance per call is thread-safe by construction.
///
/// Produces the same unit layout as the pooled wrapper.
pub struct FreshBlockCodec<C, F> {
    factory: F,
    integrated: bool,
    stats: CodecStats,
    _marker: std::marker::PhantomData<fn() -> C>,
}

impl<C, F> FreshBlockCodec<C, F>
where
    C: BlockCompressor,
    F: Fn() -> C,
{
    pub fn new(factory: F, integrated: bool) -> Self {
        Self {
            factory,
            integrated,
            stats: CodecStats::new(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<C, F> Codec for FreshBlockCodec<C, F>
where
    C: BlockCompressor,
    F: Fn() -> C,
{
    type Compressed = Vec<u32>;

    fn compress(&self, input: &[u32]) -> Result<Vec<u32>> {
        let mut scratch = vec![0u32; input.len() + BLOCK_SLACK];
        let written = (self.factory)().compress(input, &mut scratch)?;
        let unit = frame_unit(&scratch, written);
        self.stats
            .record(input.len() as u64 * 4, unit.len() as u64 * 4);
        Ok(unit)
    }

    /// Returns the number of unit ints consumed, count header included.
    fn decompress(&self, unit: &Vec<u32>, output: &mut [u32]) -> Result<usize> {
        let payload = unframe_unit(unit)?;
        (self.factory)().uncompress(payload, output)?;
        Ok(1 + payload.len())
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn reset(&self) {
        self.stats.reset();
    }

    fn is_integrated(&self) -> bool {
        self.integrated
    }
}
