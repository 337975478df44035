// FXOS Capture — Acquisition Task
//
// The control loop.  Lifecycle:
//
//   Idle ──arm edge──▶ Armed ──prepared──▶ Collecting ──window elapsed──▶ Done
//
// The loop never blocks on the sensor: each iteration tests the latches set
// by the GPIO interrupts, does at most one sensor read, and hands back the
// delay to wait before the next iteration.  The collect delay must stay well
// under the data-ready period (500 µs vs 5 ms at 200 Hz); if two data-ready
// edges land in one iteration the first is lost and the reported timestamp
// is that of the second.
//
// On hardware the data-ready interrupt is one-shot: it must be re-enabled
// once its latch is drained and before the bus read releases INT2, or the
// next falling edge lands on a disabled pin and collection stalls.  That is
// the job of the rearm hook.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use crate::config::*;
use crate::drivers::status_led::StatusIndicator;
use crate::events::{AcquisitionState, Indication, Reading, ReportEvent};
use crate::report::Reporter;
use crate::sensor::MotionSensor;
use crate::signals::AcquisitionContext;
use crate::timer::Clock;

/// Fixed timing of the loop.  Firmware uses [`Timing::default`]; tests and
/// simulations may shrink or stretch the intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Samples are accepted until elapsed time exceeds this.
    pub window: Duration,
    pub idle_poll: Duration,
    pub collect_poll: Duration,
    pub heartbeat: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(COLLECTION_WINDOW_MS),
            idle_poll: Duration::from_millis(IDLE_POLL_INTERVAL_MS),
            collect_poll: Duration::from_micros(COLLECT_POLL_INTERVAL_US),
            heartbeat: Duration::from_millis(HEARTBEAT_INTERVAL_MS),
        }
    }
}

/// Re-enables the data-ready interrupt after its latch has been drained.
pub type RearmHook = Box<dyn FnMut() -> anyhow::Result<()>>;

pub struct Acquisition<S, R, I, C> {
    sensor: S,
    reporter: R,
    status: I,
    ctx: Arc<AcquisitionContext<C>>,
    timing: Timing,
    state: AcquisitionState,
    rearm: Option<RearmHook>,
}

impl<S, R, I, C> Acquisition<S, R, I, C>
where
    S: MotionSensor,
    R: Reporter,
    I: StatusIndicator,
    C: Clock,
{
    pub fn new(sensor: S, reporter: R, status: I, ctx: Arc<AcquisitionContext<C>>, timing: Timing) -> Self {
        Self {
            sensor,
            reporter,
            status,
            ctx,
            timing,
            state: AcquisitionState::Idle,
            rearm: None,
        }
    }

    /// Install a hook run each time the data-ready latch is drained, before
    /// the sensor is read.
    pub fn with_data_ready_rearm<F>(mut self, hook: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.rearm = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    pub fn context(&self) -> &Arc<AcquisitionContext<C>> {
        &self.ctx
    }

    /// One-time bring-up: identity check, sensor enable, one diagnostic
    /// sample, then wait for the arm trigger.
    pub fn startup(&mut self) -> anyhow::Result<()> {
        self.status.show(Indication::Off)?;

        let id = self.sensor.device_identity()?;
        log::info!("Sensor WHO_AM_I = 0x{:02X}", id);
        self.reporter.report(ReportEvent::DeviceIdentity(id))?;

        self.sensor.enable()?;

        let sample = self.sensor.read_motion_sample()?;
        self.reporter.report(ReportEvent::Reading(Reading {
            timestamp_us: self.ctx.timer().read_us(),
            sample,
        }))?;

        self.reporter.report(ReportEvent::WaitingForTrigger)?;
        self.enter(AcquisitionState::Idle)
    }

    /// Run one loop iteration and return how long to wait before the next.
    pub fn step(&mut self) -> anyhow::Result<Duration> {
        match self.state {
            AcquisitionState::Idle => {
                if !self.ctx.take_arm() {
                    return Ok(self.timing.idle_poll);
                }
                self.enter(AcquisitionState::Armed)?;
                self.begin_collection()?;
                Ok(self.timing.collect_poll)
            }
            AcquisitionState::Armed => {
                self.begin_collection()?;
                Ok(self.timing.collect_poll)
            }
            AcquisitionState::Collecting => self.collect(),
            AcquisitionState::Done => {
                self.reporter.report(ReportEvent::Heartbeat)?;
                Ok(self.timing.heartbeat)
            }
        }
    }

    /// Drive the loop forever.  `pace` performs the inter-iteration wait
    /// (and any per-iteration platform housekeeping).  Only returns on a
    /// collaborator failure.
    pub fn run<F>(&mut self, mut pace: F) -> anyhow::Result<Infallible>
    where
        F: FnMut(Duration) -> anyhow::Result<()>,
    {
        loop {
            let wait = self.step()?;
            pace(wait)?;
        }
    }

    /// Safe to re-run after a failure: `CollectionStarted` is only reported
    /// once the drain read has succeeded.
    fn begin_collection(&mut self) -> anyhow::Result<()> {
        let full_scale_g = self.sensor.accel_full_scale_range()?;

        self.ctx.timer().reset_and_start();
        self.ctx.take_data_ready();
        self.rearm_data_ready()?;

        // Drain whatever data-ready condition is pending so the first edge
        // inside the window belongs to a fresh sample.
        let _ = self.sensor.read_motion_sample()?;

        self.reporter.report(ReportEvent::CollectionStarted { full_scale_g })?;
        self.enter(AcquisitionState::Collecting)
    }

    fn collect(&mut self) -> anyhow::Result<Duration> {
        if self.ctx.timer().read() > self.timing.window {
            log::info!("Collection window ({:?}) elapsed", self.timing.window);
            self.enter(AcquisitionState::Done)?;
            self.reporter.report(ReportEvent::CollectionComplete)?;
            return Ok(self.timing.collect_poll);
        }

        if self.ctx.take_data_ready() {
            // Timestamp first: a new edge during the bus read must not
            // relabel this sample.
            let timestamp_us = self.ctx.captured_us();
            self.rearm_data_ready()?;
            let sample = self.sensor.read_motion_sample()?;
            self.reporter.report(ReportEvent::Reading(Reading { timestamp_us, sample }))?;
        }

        Ok(self.timing.collect_poll)
    }

    fn rearm_data_ready(&mut self) -> anyhow::Result<()> {
        match self.rearm.as_mut() {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }

    fn enter(&mut self, next: AcquisitionState) -> anyhow::Result<()> {
        log::info!("Acquisition {:?} → {:?}", self.state, next);
        self.state = next;
        self.status.show(next.into())
    }
}
