// FXOS Capture — Sensor Transport Interface
//
// The acquisition loop only needs four operations from the motion sensor.
// Bus protocol and register layout live in the driver; any failure returned
// here is fatal to the loop (there is no retry policy).

use crate::events::MotionSample;

pub trait MotionSensor {
    /// Diagnostic identity register (WHO_AM_I).
    fn device_identity(&mut self) -> anyhow::Result<u8>;

    /// Configure the part and start producing data-ready edges.
    fn enable(&mut self) -> anyhow::Result<()>;

    /// Read one sample.  Also clears the sensor's data-ready condition.
    fn read_motion_sample(&mut self) -> anyhow::Result<MotionSample>;

    /// Accelerometer full-scale range in g.
    fn accel_full_scale_range(&mut self) -> anyhow::Result<u8>;
}

impl<S: MotionSensor + ?Sized> MotionSensor for &mut S {
    fn device_identity(&mut self) -> anyhow::Result<u8> {
        (**self).device_identity()
    }

    fn enable(&mut self) -> anyhow::Result<()> {
        (**self).enable()
    }

    fn read_motion_sample(&mut self) -> anyhow::Result<MotionSample> {
        (**self).read_motion_sample()
    }

    fn accel_full_scale_range(&mut self) -> anyhow::Result<u8> {
        (**self).accel_full_scale_range()
    }
}
