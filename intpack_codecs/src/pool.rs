//! Bounded pool of reusable compressor instances.
//!
//! Block-compression contexts are mutable and not thread-safe; the pool
//! hands each one to at most one caller at a time. Instances are created
//! lazily through a factory closure up to a fixed cap, after which callers
//! wait on a condvar for a bounded time and then fail with
//! [`CodecError::PoolExhausted`] instead of blocking forever.
//!
//! Checkout is scoped: [`PoolGuard`] returns the instance on `Drop`, so the
//! pool is whole again on every exit path — success, typed error, or panic
//! unwinding through the caller.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use intpack_core::error::{CodecError, Result};

/// Pool sizing and wait policy.
///
/// Sizing is a throughput knob, not a correctness requirement: a pool of
/// one is merely a serializing bottleneck.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum instances ever created.
    pub max_size: usize,
    /// Bounded wait for an instance once the cap is reached.
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

struct PoolState<C> {
    idle: Vec<C>,
    created: usize,
}

/// Lazily-populated, bounded pool of `C` instances.
pub struct CompressorPool<C> {
    state: Mutex<PoolState<C>>,
    returned: Condvar,
    factory: Box<dyn Fn() -> C + Send + Sync>,
    config: PoolConfig,
}

impl<C> CompressorPool<C> {
    pub fn new(factory: impl Fn() -> C + Send + Sync + 'static, config: PoolConfig) -> Self {
        Self {
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                created: 0,
            }),
            returned: Condvar::new(),
            factory: Box::new(factory),
            config,
        }
    }

    /// Check out an instance, creating one if the cap allows.
    ///
    /// Blocks up to `acquire_timeout` for a return once the cap is reached.
    pub fn acquire(&self) -> Result<PoolGuard<'_, C>> {
        let deadline = Instant::now() + self.config.acquire_timeout;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(instance) = state.idle.pop() {
                return Ok(self.guard(instance));
            }
            if state.created < self.config.max_size {
                state.created += 1;
                drop(state);
                // The slot is reserved before the factory runs outside the
                // lock; if construction panics, give it back so capacity is
                // not permanently lost.
                let slot = SlotReservation { pool: self };
                let instance = (self.factory)();
                std::mem::forget(slot);
                return Ok(self.guard(instance));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(CodecError::PoolExhausted {
                    waited_ms: self.config.acquire_timeout.as_millis() as u64,
                });
            }
            let (guard, timeout) = self
                .returned
                .wait_timeout(state, remaining)
                .unwrap_or_else(|e| e.into_inner());
            state = guard;
            if timeout.timed_out() && state.idle.is_empty() {
                return Err(CodecError::PoolExhausted {
                    waited_ms: self.config.acquire_timeout.as_millis() as u64,
                });
            }
        }
    }

    fn guard(&self, instance: C) -> PoolGuard<'_, C> {
        PoolGuard {
            pool: self,
            instance: Some(instance),
        }
    }

    fn release(&self, instance: C) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.idle.push(instance);
        drop(state);
        self.returned.notify_one();
    }

    /// Instances currently checked in.
    pub fn idle_count(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).idle.len()
    }
}

/// Reserved-but-unfilled creation slot; dropped only if the factory panics,
/// handing the slot back to the pool.
struct SlotReservation<'a, C> {
    pool: &'a CompressorPool<C>,
}

impl<C> Drop for SlotReservation<'_, C> {
    fn drop(&mut self) {
        let mut state = self.pool.state.lock().unwrap_or_else(|e| e.into_inner());
        state.created -= 1;
        drop(state);
        self.pool.returned.notify_one();
    }
}

/// Scoped checkout of one pooled instance.
///
/// Dereferences to the instance; returns it to the pool on `Drop`.
pub struct PoolGuard<'a, C> {
    pool: &'a CompressorPool<C>,
    instance: Option<C>,
}

impl<C> fmt::Debug for PoolGuard<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolGuard").finish_non_exhaustive()
    }
}

impl<C> Deref for PoolGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.instance.as_ref().expect("instance present until drop")
    }
}

impl<C> DerefMut for PoolGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.instance.as_mut().expect("instance present until drop")
    }
}

impl<C> Drop for PoolGuard<'_, C> {
    fn drop(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.pool.release(instance);
        }
    }
}
