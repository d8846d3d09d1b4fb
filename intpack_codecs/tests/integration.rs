//! Codec-level tests: round-trips for every bundled codec, the gamma value
//! domain, Rice determinism, and the pooled wrapper's checkout discipline.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use intpack_codecs::{
    BlockCompressor, CompressorPool, FreshBlockCodec, GammaCodec, IdentityCodec,
    Lz4BlockCompressor, PoolConfig, PooledBlockCodec, RiceCodec, ZstdBlockCompressor,
};
use intpack_core::error::CodecError;
use intpack_core::{atled, delta, Codec};

/// Deterministic pseudo-random gaps (geometric-ish, mostly small) using a
/// simple LCG.
fn pseudo_random_gaps(len: usize, seed: u64) -> Vec<u32> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            // Bias toward small gaps, never zero.
            1 + ((rng >> 33) % 64) as u32
        })
        .collect()
}

fn ascending_ids(len: usize, seed: u64) -> Vec<u32> {
    let mut ids = pseudo_random_gaps(len, seed);
    let mut sum = 0u32;
    for id in ids.iter_mut() {
        sum += *id;
        *id = sum;
    }
    ids
}

// ── gamma ──────────────────────────────────────────────────────────────────

#[test]
fn test_gamma_roundtrip() {
    let codec = GammaCodec::default();
    let values = pseudo_random_gaps(2000, 0xDEAD_BEEF);
    let unit = codec.compress(&values).unwrap();
    let mut decoded = vec![0u32; values.len()];
    let written = codec.decompress(&unit, &mut decoded).unwrap();
    assert_eq!(written, values.len());
    assert_eq!(decoded, values);
}

#[test]
fn test_gamma_extreme_values() {
    let codec = GammaCodec::default();
    let values = vec![1u32, 2, 3, u32::MAX, 1 << 31, (1 << 31) - 1, 1];
    let unit = codec.compress(&values).unwrap();
    let mut decoded = vec![0u32; values.len()];
    codec.decompress(&unit, &mut decoded).unwrap();
    assert_eq!(decoded, values);
}

#[test]
fn test_gamma_rejects_zero() {
    let codec = GammaCodec::default();
    let err = codec.compress(&[3, 1, 0, 7]).unwrap_err();
    assert!(
        matches!(err, CodecError::NonPositiveValue { index: 2 }),
        "expected NonPositiveValue at index 2, got {err}"
    );
}

#[test]
fn test_gamma_is_not_integrated() {
    assert!(!GammaCodec::default().is_integrated());
    assert!(!RiceCodec::default().is_integrated());
}

// ── rice ───────────────────────────────────────────────────────────────────

#[test]
fn test_rice_roundtrip_with_zeros() {
    let codec = RiceCodec::default();
    let mut values = pseudo_random_gaps(2000, 0x1234_5678);
    values[0] = 0;
    values[999] = 0;
    let unit = codec.compress(&values).unwrap();
    let mut decoded = vec![0u32; values.len()];
    codec.decompress(&unit, &mut decoded).unwrap();
    assert_eq!(decoded, values);
}

#[test]
fn test_rice_parameter_is_deterministic() {
    let codec = RiceCodec::default();
    let values = pseudo_random_gaps(500, 42);
    let first = codec.compress(&values).unwrap();
    let second = codec.compress(&values).unwrap();
    assert_eq!(first, second, "same block must yield identical bytes");
}

#[test]
fn test_rice_header_holds_the_parameter() {
    let codec = RiceCodec::default();
    // Mean of a constant block of 10s: b = floor(0.69 * 10) = 6.
    let values = vec![10u32; 64];
    let unit = codec.compress(&values).unwrap();
    // The 32-bit header is written MSB-first.
    let b = u32::from_be_bytes([unit[0], unit[1], unit[2], unit[3]]);
    assert_eq!(b, 6);
}

#[test]
fn test_rice_empty_block() {
    let codec = RiceCodec::default();
    let unit = codec.compress(&[]).unwrap();
    assert_eq!(unit.len(), 4, "empty block still carries the 32-bit header");
    let mut decoded: [u32; 0] = [];
    codec.decompress(&unit, &mut decoded).unwrap();
}

// ── the ascending-ids scenario ─────────────────────────────────────────────

/// The end-to-end contract on real input: delta an ascending id list, gamma
/// must reject the zero gap from the duplicate id, Rice must round-trip the
/// same gaps and atled must recover the original ids exactly.
#[test]
fn test_duplicate_id_scenario() {
    let ids = [5u32, 9, 9, 20];

    let mut gaps = ids;
    delta(&mut gaps);
    assert_eq!(gaps, [6, 4, 0, 11]);

    // The duplicate id produced a zero gap, which gamma cannot represent.
    let gamma = GammaCodec::default();
    assert!(matches!(
        gamma.compress(&gaps).unwrap_err(),
        CodecError::NonPositiveValue { index: 2 }
    ));

    // Rice tolerates the zero and round-trips back to the original ids.
    let rice = RiceCodec::default();
    let unit = rice.compress(&gaps).unwrap();
    let mut decoded = vec![0u32; gaps.len()];
    rice.decompress(&unit, &mut decoded).unwrap();
    atled(&mut decoded);
    assert_eq!(decoded, ids);
}

// ── identity ───────────────────────────────────────────────────────────────

#[test]
fn test_identity_roundtrip_and_integrated_convention() {
    let codec = IdentityCodec::new();
    // Integrated by convention: callers skip delta entirely, so the codec
    // sees raw ids.
    assert!(codec.is_integrated());

    let ids = ascending_ids(100, 7);
    let unit = codec.compress(&ids).unwrap();
    assert_eq!(unit, ids, "identity stores the window verbatim");

    let mut decoded = vec![0u32; ids.len()];
    let written = codec.decompress(&unit, &mut decoded).unwrap();
    assert_eq!(written, ids.len());
    assert_eq!(decoded, ids);

    let stats = codec.stats();
    assert_eq!(stats.bytes_in, stats.bytes_out);
}

// ── stats through the codec contract ───────────────────────────────────────

#[test]
fn test_stats_grow_on_compress_only() {
    let codec = RiceCodec::default();
    let values = pseudo_random_gaps(256, 9);

    let unit = codec.compress(&values).unwrap();
    let after_compress = codec.stats();
    assert_eq!(after_compress.bytes_in, 256 * 4);
    assert_eq!(after_compress.bytes_out, unit.len() as u64);

    // Decompress deliberately leaves the counters untouched.
    let mut decoded = vec![0u32; values.len()];
    codec.decompress(&unit, &mut decoded).unwrap();
    assert_eq!(codec.stats(), after_compress);

    codec.reset();
    let zeroed = codec.stats();
    assert_eq!((zeroed.bytes_in, zeroed.bytes_out), (0, 0));
}

// ── block wrappers ─────────────────────────────────────────────────────────

#[test]
fn test_pooled_zstd_roundtrip() {
    let codec = PooledBlockCodec::new(ZstdBlockCompressor::default, PoolConfig::default(), false);
    let mut gaps = ascending_ids(4096, 0xABCD);
    delta(&mut gaps);

    let unit = codec.compress(&gaps).unwrap();
    assert_eq!(
        unit[0] as usize,
        unit.len() - 1,
        "header counts the compressed ints that follow"
    );

    let mut decoded = vec![0u32; gaps.len()];
    let consumed = codec.decompress(&unit, &mut decoded).unwrap();
    assert_eq!(consumed, unit.len(), "cursor covers header plus payload");
    assert_eq!(decoded, gaps);

    // Small ascending gaps are highly repetitive; zstd should win.
    let stats = codec.stats();
    assert!(stats.bytes_out < stats.bytes_in);
}

#[test]
fn test_fresh_lz4_roundtrip() {
    let codec = FreshBlockCodec::new(|| Lz4BlockCompressor, false);
    let mut gaps = ascending_ids(1000, 3);
    delta(&mut gaps);

    let unit = codec.compress(&gaps).unwrap();
    let mut decoded = vec![0u32; gaps.len()];
    let consumed = codec.decompress(&unit, &mut decoded).unwrap();
    assert_eq!(consumed, unit.len());
    assert_eq!(decoded, gaps);
}

#[test]
fn test_block_unit_truncation_is_typed() {
    let codec = FreshBlockCodec::new(|| Lz4BlockCompressor, false);
    let unit = codec.compress(&[1, 2, 3, 4]).unwrap();

    let mut out = vec![0u32; 4];
    let truncated = unit[..unit.len() - 1].to_vec();
    assert!(matches!(
        codec.decompress(&truncated, &mut out).unwrap_err(),
        CodecError::TruncatedUnit { .. }
    ));
    assert!(matches!(
        codec.decompress(&Vec::new(), &mut out).unwrap_err(),
        CodecError::TruncatedUnit { .. }
    ));
}

// ── pool discipline ────────────────────────────────────────────────────────

/// Instrumented test double: a verbatim-copy block compressor whose
/// instances assert they are never used by two threads at once.
struct ProbeCompressor {
    in_use: AtomicBool,
    overlaps: Arc<AtomicUsize>,
}

impl ProbeCompressor {
    fn enter(&self) {
        if self.in_use.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn exit(&self) {
        self.in_use.store(false, Ordering::SeqCst);
    }
}

impl BlockCompressor for ProbeCompressor {
    fn compress(
        &mut self,
        input: &[u32],
        output: &mut [u32],
    ) -> intpack_core::Result<usize> {
        self.enter();
        thread::sleep(Duration::from_micros(50));
        output[..input.len()].copy_from_slice(input);
        self.exit();
        Ok(input.len())
    }

    fn uncompress(
        &mut self,
        input: &[u32],
        output: &mut [u32],
    ) -> intpack_core::Result<usize> {
        self.enter();
        output.copy_from_slice(&input[..output.len()]);
        self.exit();
        Ok(output.len())
    }
}

#[test]
fn test_pooled_wrapper_single_ownership_under_contention() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 50;

    let overlaps = Arc::new(AtomicUsize::new(0));
    let overlaps_for_factory = Arc::clone(&overlaps);
    let codec = Arc::new(PooledBlockCodec::new(
        move || ProbeCompressor {
            in_use: AtomicBool::new(false),
            overlaps: Arc::clone(&overlaps_for_factory),
        },
        PoolConfig {
            max_size: 3,
            acquire_timeout: Duration::from_secs(10),
        },
        false,
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let codec = Arc::clone(&codec);
            thread::spawn(move || {
                for round in 0..ROUNDS {
                    let values = pseudo_random_gaps(64, (t * ROUNDS + round) as u64);
                    let unit = codec.compress(&values).unwrap();
                    let mut decoded = vec![0u32; values.len()];
                    codec.decompress(&unit, &mut decoded).unwrap();
                    assert_eq!(decoded, values, "corruption under contention");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(
        overlaps.load(Ordering::SeqCst),
        0,
        "a pooled instance was used by two threads at once"
    );
}

#[test]
fn test_pool_exhaustion_is_a_bounded_wait() {
    let pool: CompressorPool<Lz4BlockCompressor> = CompressorPool::new(
        || Lz4BlockCompressor,
        PoolConfig {
            max_size: 1,
            acquire_timeout: Duration::from_millis(50),
        },
    );

    let held = pool.acquire().unwrap();
    let err = pool.acquire().unwrap_err();
    assert!(
        matches!(err, CodecError::PoolExhausted { .. }),
        "expected PoolExhausted, got {err}"
    );

    drop(held);
    // The instance is back; the next checkout succeeds immediately.
    pool.acquire().unwrap();
    assert_eq!(pool.idle_count(), 1);
}

#[test]
fn test_pool_capacity_survives_factory_panic() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let fail_first = Arc::new(AtomicBool::new(true));
    let fail = Arc::clone(&fail_first);
    let pool: CompressorPool<Lz4BlockCompressor> = CompressorPool::new(
        move || {
            if fail.swap(false, Ordering::SeqCst) {
                panic!("synthetic construction failure");
            }
            Lz4BlockCompressor
        },
        PoolConfig {
            max_size: 1,
            acquire_timeout: Duration::from_millis(50),
        },
    );

    // The first checkout panics inside the factory; the reserved creation
    // slot must be handed back, not counted as created forever.
    assert!(catch_unwind(AssertUnwindSafe(|| pool.acquire())).is_err());

    // With a pool of one, a leaked slot would turn this into PoolExhausted.
    let guard = pool.acquire().unwrap();
    drop(guard);
    assert_eq!(pool.idle_count(), 1);
}

/// A compressor that always fails, for proving the guard returns instances
/// on the error path.
struct FailingCompressor;

impl BlockCompressor for FailingCompressor {
    fn compress(&mut self, _: &[u32], _: &mut [u32]) -> intpack_core::Result<usize> {
        Err(CodecError::Compressor("synthetic failure".into()))
    }

    fn uncompress(&mut self, _: &[u32], _: &mut [u32]) -> intpack_core::Result<usize> {
        Err(CodecError::Compressor("synthetic failure".into()))
    }
}

#[test]
fn test_pool_releases_instance_when_compressor_fails() {
    let codec = PooledBlockCodec::new(
        || FailingCompressor,
        PoolConfig {
            max_size: 1,
            acquire_timeout: Duration::from_millis(50),
        },
        false,
    );

    // With a pool of one and a short wait, a leaked instance would turn the
    // second call into PoolExhausted. Both calls must instead surface the
    // compressor's own error.
    for _ in 0..2 {
        let err = codec.compress(&[1, 2, 3]).unwrap_err();
        assert!(
            matches!(err, CodecError::Compressor(_)),
            "expected Compressor error, got {err}"
        );
    }
}
