use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

/// Core compression abstraction.
///
/// Each `Codec` implementation:
/// - Compresses one integer window per call into an opaque unit of type
///   [`Compressed`](Codec::Compressed) — a byte buffer for bit-stream codecs,
///   an int buffer for block codecs. One `compress` produces exactly one
///   unit; one `decompress` with the matching output length consumes it.
/// - Keeps cumulative `(bytes_in, bytes_out)` counters. Only `compress`
///   drives the counters; `decompress` is deliberately not counted, so the
///   ratio read from [`stats`](Codec::stats) reflects what was *built*, not
///   what was read back.
/// - Declares via [`is_integrated`](Codec::is_integrated) whether callers
///   must delta-transform ascending input before compressing.
///
/// Instances are long-lived and may be shared across threads: the only
/// shared mutable state is the stats pair (atomics) and, for pooled
/// wrappers, the instance pool itself.
pub trait Codec {
    /// Opaque compressed unit produced by this codec.
    type Compressed;

    /// Compress the whole `input` window into one unit.
    ///
    /// Adds `input.len() * 4` to `bytes_in` and the serialized size of the
    /// returned unit to `bytes_out`.
    fn compress(&self, input: &[u32]) -> Result<Self::Compressed>;

    /// Reconstruct exactly `output.len()` values from `unit` into `output`.
    ///
    /// The return value is codec-specific — the number of values written for
    /// bit-stream and identity codecs, the number of unit ints consumed
    /// (header included) for block codecs. See each codec's docs; do not
    /// assume it is uniform.
    fn decompress(&self, unit: &Self::Compressed, output: &mut [u32]) -> Result<usize>;

    /// Cumulative `(bytes_in, bytes_out)` since construction or the last
    /// [`reset`](Codec::reset).
    fn stats(&self) -> StatsSnapshot;

    /// Zero both counters. Units already produced remain valid.
    fn reset(&self);

    /// `true` means the codec operates directly on unmodified (non-delta)
    /// sequences and the caller must NOT apply [`delta`](crate::delta::delta)
    /// before `compress`; `false` means the caller must delta ascending
    /// input and [`atled`](crate::delta::atled) the decoded output.
    ///
    /// Fixed at construction.
    fn is_integrated(&self) -> bool;
}

/// Point-in-time copy of a codec's cumulative byte counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Raw bytes handed to `compress` (4 per input value).
    pub bytes_in: u64,
    /// Serialized bytes of every unit produced.
    pub bytes_out: u64,
}

impl StatsSnapshot {
    /// Compression ratio (raw / compressed); 1.0 when nothing was compressed.
    pub fn ratio(&self) -> f64 {
        if self.bytes_out == 0 {
            return 1.0;
        }
        self.bytes_in as f64 / self.bytes_out as f64
    }
}

/// Shared byte counters, composed into every codec.
///
/// Updated with atomic fetch-and-add so concurrent `compress` calls on the
/// same codec instance never lose updates and never need a lock.
#[derive(Debug, Default)]
pub struct CodecStats {
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
}

impl CodecStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one compress call: `raw` input bytes became `compressed` bytes.
    #[inline]
    pub fn record(&self, raw: u64, compressed: u64) {
        self.bytes_in.fetch_add(raw, Ordering::Relaxed);
        self.bytes_out.fetch_add(compressed, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.bytes_in.store(0, Ordering::Relaxed);
        self.bytes_out.store(0, Ordering::Relaxed);
    }
}
