//! Frame-driven interpolation
//!
//! [`AnimationDriver`] advances interpolations one step per frame. It does
//! not own a timer: whoever drives the display calls [`AnimationDriver::tick`]
//! once per refresh, and time comes from a [`FrameClock`]. Tasks are keyed by
//! the visual target they drive; starting a task for a key cancels the one
//! already running for it.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of frame timestamps
pub trait FrameClock: Send + Sync {
    /// Monotonic time since the clock's origin
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// Cubic ease-out, `1 - (1 - p)^3` with `p` clamped to `[0, 1]`
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// What a task interpolates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpolation {
    /// Integer counter from 0 to `target`
    CountUp { target: i64, duration: Duration },
    /// Arc fill from 0 to `target_percent`, held at 0 for `delay`
    ArcFill {
        target_percent: f64,
        delay: Duration,
        duration: Duration,
    },
}

impl Interpolation {
    pub fn count_up(target: i64, duration: Duration) -> Self {
        Interpolation::CountUp { target, duration }
    }

    pub fn arc_fill(target_percent: f64, delay: Duration, duration: Duration) -> Self {
        Interpolation::ArcFill {
            target_percent,
            delay,
            duration,
        }
    }

    /// Value at `elapsed` since the task's first frame, and whether it is final
    pub fn sample(&self, elapsed: Duration) -> (f64, bool) {
        match *self {
            Interpolation::CountUp { target, duration } => {
                let p = progress(elapsed, duration);
                ((target as f64 * ease_out_cubic(p)).floor(), p >= 1.0)
            }
            Interpolation::ArcFill {
                target_percent,
                delay,
                duration,
            } => {
                if elapsed < delay {
                    return (0.0, false);
                }
                let p = progress(elapsed - delay, duration);
                (target_percent * ease_out_cubic(p), p >= 1.0)
            }
        }
    }

    /// Value once the task completes
    pub fn target(&self) -> f64 {
        match *self {
            Interpolation::CountUp { target, .. } => target as f64,
            Interpolation::ArcFill { target_percent, .. } => target_percent,
        }
    }
}

/// Identity of a visual target
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationKey(pub String);

impl AnimationKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl fmt::Display for AnimationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ticket for one started task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationHandle {
    pub key: AnimationKey,
    generation: u64,
}

/// Value produced for one target on one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub key: AnimationKey,
    pub value: f64,
    pub finished: bool,
}

#[derive(Debug)]
struct Task {
    generation: u64,
    interpolation: Interpolation,
    started_at: Option<Duration>,
    last_value: f64,
}

/// Cooperative, per-key interpolation scheduler
pub struct AnimationDriver {
    clock: Arc<dyn FrameClock>,
    tasks: BTreeMap<AnimationKey, Task>,
    next_generation: u64,
}

impl AnimationDriver {
    pub fn new(clock: Arc<dyn FrameClock>) -> Self {
        Self {
            clock,
            tasks: BTreeMap::new(),
            next_generation: 0,
        }
    }

    /// Start a task for `key`, cancelling any task already running for it
    pub fn start(&mut self, key: AnimationKey, interpolation: Interpolation) -> AnimationHandle {
        self.next_generation += 1;
        let generation = self.next_generation;

        let task = Task {
            generation,
            interpolation,
            started_at: None,
            last_value: 0.0,
        };
        if self.tasks.insert(key.clone(), task).is_some() {
            tracing::trace!("animation {} restarted", key);
        }

        AnimationHandle { key, generation }
    }

    /// Advance every task to the clock's current time
    pub fn tick(&mut self) -> Vec<Frame> {
        let now = self.clock.now();
        let mut frames = Vec::with_capacity(self.tasks.len());

        for (key, task) in self.tasks.iter_mut() {
            let started = *task.started_at.get_or_insert(now);
            let (value, finished) = task.interpolation.sample(now.saturating_sub(started));
            task.last_value = value;
            frames.push(Frame {
                key: key.clone(),
                value,
                finished,
            });
        }

        for frame in frames.iter().filter(|f| f.finished) {
            self.tasks.remove(&frame.key);
            tracing::trace!("animation {} finished at {}", frame.key, frame.value);
        }

        frames
    }

    /// Drop the task for `key`; later ticks emit nothing for it
    pub fn cancel(&mut self, key: &AnimationKey) -> bool {
        self.tasks.remove(key).is_some()
    }

    /// Drop every task, for view teardown
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Whether the task behind `handle` is still the one running for its key
    pub fn is_live(&self, handle: &AnimationHandle) -> bool {
        self.tasks
            .get(&handle.key)
            .map(|t| t.generation == handle.generation)
            .unwrap_or(false)
    }

    pub fn is_running(&self, key: &AnimationKey) -> bool {
        self.tasks.contains_key(key)
    }

    /// Last value emitted for a running task
    pub fn current(&self, key: &AnimationKey) -> Option<f64> {
        self.tasks.get(key).map(|t| t.last_value)
    }

    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl fmt::Debug for AnimationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationDriver")
            .field("tasks", &self.tasks)
            .finish()
    }
}
