// FXOS Capture — Host Simulation
//
// Stand-ins for the board so the acquisition loop can run on a workstation:
// a synthetic sensor, a status "light" that logs, and threads that play the
// part of the GPIO interrupts.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::drivers::fxos8700::WHO_AM_I_EXPECTED;
use crate::drivers::status_led::StatusIndicator;
use crate::events::{Indication, MotionSample, Vector3};
use crate::sensor::MotionSensor;
use crate::signals::AcquisitionContext;
use crate::timer::Clock;

/// Synthetic FXOS8700: a slow sawtooth on accel X over 1 g on Z, fixed field.
#[derive(Debug, Default)]
pub struct SimulatedSensor {
    enabled: bool,
    reads: u32,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> u32 {
        self.reads
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl MotionSensor for SimulatedSensor {
    fn device_identity(&mut self) -> anyhow::Result<u8> {
        Ok(WHO_AM_I_EXPECTED)
    }

    fn enable(&mut self) -> anyhow::Result<()> {
        self.enabled = true;
        Ok(())
    }

    fn read_motion_sample(&mut self) -> anyhow::Result<MotionSample> {
        let n = (self.reads % 200) as i16;
        self.reads += 1;
        Ok(MotionSample {
            accel: Vector3::new(n * 10 - 1000, -n, 2048),
            mag: Vector3::new(300, -120, 45),
        })
    }

    fn accel_full_scale_range(&mut self) -> anyhow::Result<u8> {
        Ok(4)
    }
}

/// Logs indications in place of LEDs.
#[derive(Debug, Default)]
pub struct LoggedStatus;

impl StatusIndicator for LoggedStatus {
    fn show(&mut self, indication: Indication) -> anyhow::Result<()> {
        log::info!("Status lights: {:?}", indication);
        Ok(())
    }
}

/// Fire the data-ready handler at `rate_hz`, forever.
pub fn spawn_data_ready<C>(ctx: &Arc<AcquisitionContext<C>>, rate_hz: u32) -> anyhow::Result<thread::JoinHandle<()>>
where
    C: Clock + Send + Sync + 'static,
{
    let period = Duration::from_secs(1) / rate_hz.max(1);
    let mut on_edge = ctx.data_ready_handler();
    let handle = thread::Builder::new()
        .name("sim-drdy".into())
        .spawn(move || loop {
            thread::sleep(period);
            on_edge();
        })?;
    Ok(handle)
}

/// Press the arm button once after `delay`.
pub fn spawn_arm_press<C>(ctx: &Arc<AcquisitionContext<C>>, delay: Duration) -> anyhow::Result<thread::JoinHandle<()>>
where
    C: Clock + Send + Sync + 'static,
{
    let mut on_press = ctx.arm_handler();
    let handle = thread::Builder::new()
        .name("sim-arm".into())
        .spawn(move || {
            thread::sleep(delay);
            log::info!("Simulated arm button press");
            on_press();
        })?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;

    #[test]
    fn simulated_sensor_counts_reads() {
        let mut sensor = SimulatedSensor::new();
        assert!(!sensor.is_enabled());
        sensor.enable().unwrap();
        assert!(sensor.is_enabled());

        let first = sensor.read_motion_sample().unwrap();
        let second = sensor.read_motion_sample().unwrap();
        assert_ne!(first, second);
        assert_eq!(sensor.reads(), 2);
        assert_eq!(sensor.device_identity().unwrap(), 0xC7);
    }

    #[test]
    fn arm_press_thread_latches_once() {
        let ctx = Arc::new(AcquisitionContext::new(ManualClock::new()));
        spawn_arm_press(&ctx, Duration::from_millis(1))
            .unwrap()
            .join()
            .unwrap();
        assert!(ctx.take_arm());
        assert!(!ctx.take_arm());
    }
}
