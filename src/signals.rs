// FXOS Capture — Signal Latches & Shared Acquisition Context
//
// The only state shared between the GPIO interrupt handlers and the main
// loop.  Each latch has exactly one producer (an interrupt) and one consumer
// (the loop):
//
//   - `set()` runs in interrupt context: one atomic store, no I/O.
//   - `test_and_clear()` runs in the loop: one atomic swap.
//
// The data-ready handler writes the timestamp *before* setting its latch, and
// the loop reads the timestamp *after* clearing it, so a consumed latch
// always sees the timestamp of the edge that set it (or a later one).

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::timer::{Clock, ElapsedTimer};

/// Single-bit, coalescing interrupt → loop flag.
#[derive(Debug, Default)]
pub struct SignalLatch {
    flag: AtomicBool,
}

impl SignalLatch {
    pub const fn new() -> Self {
        Self { flag: AtomicBool::new(false) }
    }

    /// Interrupt side.  A second `set()` before the loop observes the first
    /// is coalesced.
    #[inline]
    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Loop side.  Returns whether the latch was set, clearing it.
    #[inline]
    pub fn test_and_clear(&self) -> bool {
        self.flag.swap(false, Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Acquisition context
// ---------------------------------------------------------------------------

/// Everything the interrupt handlers may touch, owned behind an `Arc` by the
/// control loop.
#[derive(Debug)]
pub struct AcquisitionContext<C> {
    arm: SignalLatch,
    data_ready: SignalLatch,
    captured_us: AtomicU32,
    timer: ElapsedTimer<C>,
}

impl<C: Clock> AcquisitionContext<C> {
    pub fn new(clock: C) -> Self {
        Self {
            arm: SignalLatch::new(),
            data_ready: SignalLatch::new(),
            captured_us: AtomicU32::new(0),
            timer: ElapsedTimer::new(clock),
        }
    }

    // ---- interrupt side ---------------------------------------------------

    pub fn on_arm_edge(&self) {
        self.arm.set();
    }

    /// Capture the elapsed time, then latch.  Last write wins if the loop has
    /// not drained the previous edge yet.
    pub fn on_data_ready_edge(&self) {
        self.captured_us.store(self.timer.read_us(), Ordering::Relaxed);
        self.data_ready.set();
    }

    // ---- loop side --------------------------------------------------------

    pub fn take_arm(&self) -> bool {
        self.arm.test_and_clear()
    }

    pub fn take_data_ready(&self) -> bool {
        self.data_ready.test_and_clear()
    }

    /// Timestamp of the most recent data-ready edge.
    pub fn captured_us(&self) -> u32 {
        self.captured_us.load(Ordering::Relaxed)
    }

    pub fn timer(&self) -> &ElapsedTimer<C> {
        &self.timer
    }
}

impl<C: Clock + Send + Sync + 'static> AcquisitionContext<C> {
    /// Handler for the arm button's falling edge.
    pub fn arm_handler(self: &Arc<Self>) -> impl FnMut() + Send + 'static {
        let ctx = Arc::clone(self);
        move || ctx.on_arm_edge()
    }

    /// Handler for the sensor's data-ready falling edge.
    pub fn data_ready_handler(self: &Arc<Self>) -> impl FnMut() + Send + 'static {
        let ctx = Arc::clone(self);
        move || ctx.on_data_ready_edge()
    }
}
