// FXOS Capture — Elapsed-Time Source
//
// A free-running microsecond counter that can be re-zeroed at collection
// start.  Read from both the data-ready interrupt (timestamping) and the main
// loop (window expiry), so every field is a single 32-bit atomic word.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Monotonic microsecond counter backing an [`ElapsedTimer`].
///
/// Implementations must be callable from interrupt context.
pub trait Clock {
    fn now_us(&self) -> u64;
}

/// `std::time::Instant` based clock, anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_us(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }
}

/// Hand-driven clock for tests and simulations.  Clones share one counter.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_us: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

#[cfg(not(target_os = "espidf"))]
impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_us(&self, us: u64) {
        self.now_us.store(us, Ordering::SeqCst);
    }

    pub fn set(&self, at: Duration) {
        self.set_us(at.as_micros() as u64);
    }

    pub fn advance(&self, by: Duration) {
        self.now_us.fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }
}

#[cfg(not(target_os = "espidf"))]
impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.now_us.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Elapsed timer
// ---------------------------------------------------------------------------

/// Elapsed time since the last [`reset_and_start`](Self::reset_and_start).
///
/// Reads return zero until the timer has been started.  The origin is kept
/// as a truncated 32-bit microsecond count and differences are wrapping, so
/// results are exact for spans under ~71 minutes.
#[derive(Debug)]
pub struct ElapsedTimer<C> {
    clock: C,
    origin_us: AtomicU32,
    running: AtomicBool,
}

impl<C: Clock> ElapsedTimer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            origin_us: AtomicU32::new(0),
            running: AtomicBool::new(false),
        }
    }

    /// Establish time zero and start counting.
    pub fn reset_and_start(&self) {
        self.origin_us.store(self.clock.now_us() as u32, Ordering::Relaxed);
        self.running.store(true, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Microseconds since start.  Interrupt safe, never blocks.
    pub fn read_us(&self) -> u32 {
        if !self.running.load(Ordering::Acquire) {
            return 0;
        }
        let now = self.clock.now_us() as u32;
        now.wrapping_sub(self.origin_us.load(Ordering::Relaxed))
    }

    pub fn read(&self) -> Duration {
        Duration::from_micros(u64::from(self.read_us()))
    }
}
