//! Shared deterministic random source
//!
//! The partition is generated once, but many systems created afterwards
//! (object scattering, spawn pickers, ...) keep drawing seeded values from the
//! same stream for the lifetime of the world. [`SeedSource`] is the handle they
//! share. It starts uninitialized; draws made before
//! [`SeedSource::initialize`] fail with [`SeedNotReady`], which callers are
//! expected to retry (see [`pick_seeded`]).

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{trace, warn};

/// The seed source has not been initialized yet
///
/// This is an expected condition for consumers racing map generation, not a
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("seed source has not been initialized")]
pub struct SeedNotReady;

struct SeededStream {
    seed: u64,
    rng: ChaCha8Rng,
}

#[derive(Default)]
struct SeedState {
    stream: Mutex<Option<SeededStream>>,
    ready: Condvar,
}

/// Cloneable handle to a seeded ChaCha8 stream
///
/// All clones share one cursor: every draw advances the stream for everyone.
/// Draws are serialized by a mutex. For a fixed seed and a fixed order of
/// calls the output is identical on every platform.
///
/// # Example
///
/// ```
/// use region_partition::SeedSource;
///
/// let source = SeedSource::new();
/// assert!(source.next_int(0, 9).is_err());
///
/// source.initialize(42);
/// let value = source.next_int(0, 9).unwrap();
/// assert!((0..=9).contains(&value));
/// ```
#[derive(Clone, Default)]
pub struct SeedSource {
    state: Arc<SeedState>,
}

impl SeedSource {
    /// Create an uninitialized source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source that is initialized right away
    pub fn with_seed(seed: u64) -> Self {
        let source = Self::new();
        source.initialize(seed);
        source
    }

    /// (Re)seed the stream and wake every consumer waiting for it
    pub fn initialize(&self, seed: u64) {
        let mut stream = self.state.stream.lock();
        *stream = Some(SeededStream {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        });
        self.state.ready.notify_all();
    }

    /// Whether [`initialize`](Self::initialize) has been called
    pub fn is_ready(&self) -> bool {
        self.state.stream.lock().is_some()
    }

    /// The seed the stream was last initialized with
    pub fn seed(&self) -> Option<u64> {
        self.state.stream.lock().as_ref().map(|s| s.seed)
    }

    /// Draw an integer uniformly from `min..=max`
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn next_int(&self, min: i32, max: i32) -> Result<i32, SeedNotReady> {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.with_rng(|rng| rng.gen_range(lo..=hi))
    }

    /// Draw a float uniformly from `min..max`
    ///
    /// Returns `min` without advancing the stream when the range is empty.
    pub fn next_float(&self, min: f32, max: f32) -> Result<f32, SeedNotReady> {
        self.with_rng(|rng| if max > min { rng.gen_range(min..max) } else { min })
    }

    /// Block until the source is initialized or `timeout` elapses
    ///
    /// Returns whether the source is ready.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        let mut stream = self.state.stream.lock();
        if stream.is_some() {
            return true;
        }
        self.state
            .ready
            .wait_while_for(&mut stream, |s| s.is_none(), timeout);
        stream.is_some()
    }

    fn with_rng<T>(&self, draw: impl FnOnce(&mut ChaCha8Rng) -> T) -> Result<T, SeedNotReady> {
        let mut stream = self.state.stream.lock();
        match stream.as_mut() {
            Some(s) => Ok(draw(&mut s.rng)),
            None => {
                trace!(target: "region_partition", "seed source drawn before initialization");
                Err(SeedNotReady)
            }
        }
    }
}

impl std::fmt::Debug for SeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedSource").field("seed", &self.seed()).finish()
    }
}

/// How long a late-binding consumer keeps waiting for the seed source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Number of waits after the first failed draw
    pub max_attempts: u32,
    /// Length of each wait
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}

/// Outcome of [`pick_seeded`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededPick {
    /// Chosen option index
    pub index: usize,
    /// `false` when the retries ran out and a non-deterministic RNG was used
    pub deterministic: bool,
}

/// Pick one of `option_count` options from the shared stream
///
/// Draws immediately when the source is ready. Otherwise waits for the ready
/// notification up to `policy.max_attempts` times, then degrades to a
/// non-deterministic thread-local RNG instead of blocking forever.
/// Returns `None` when there is nothing to pick from.
pub fn pick_seeded(source: &SeedSource, option_count: usize, policy: &RetryPolicy) -> Option<SeededPick> {
    if option_count == 0 {
        return None;
    }
    let last = i32::try_from(option_count - 1).unwrap_or(i32::MAX);

    let mut attempt = 0;
    loop {
        if let Ok(index) = source.next_int(0, last) {
            return Some(SeededPick {
                index: index as usize,
                deterministic: true,
            });
        }
        if attempt >= policy.max_attempts {
            break;
        }
        attempt += 1;
        source.wait_ready(policy.interval);
    }

    warn!(
        target: "region_partition",
        "seed source still uninitialized after {} attempts, using non-deterministic pick",
        policy.max_attempts
    );
    Some(SeededPick {
        index: rand::thread_rng().gen_range(0..option_count),
        deterministic: false,
    })
}
