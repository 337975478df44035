// FXOS Capture — FXOS8700CQ Driver
//
// Register-level accelerometer + magnetometer driver over any embedded-hal
// I2C bus.  Runs the part in hybrid mode at 200 Hz with the data-ready
// interrupt routed to INT2 (active LOW, push-pull).

use embedded_hal::i2c::I2c;

use crate::events::{MotionSample, Vector3};
use crate::sensor::MotionSensor;

// FXOS8700CQ register addresses
const REG_STATUS: u8 = 0x00; // Start of 13-byte hybrid burst (status + accel + mag)
const REG_WHO_AM_I: u8 = 0x0D;
const REG_XYZ_DATA_CFG: u8 = 0x0E;
const REG_CTRL_REG1: u8 = 0x2A;
const REG_CTRL_REG2: u8 = 0x2B;
const REG_CTRL_REG3: u8 = 0x2C;
const REG_CTRL_REG4: u8 = 0x2D;
const REG_CTRL_REG5: u8 = 0x2E;
const REG_M_CTRL_REG1: u8 = 0x5B;
const REG_M_CTRL_REG2: u8 = 0x5C;

pub const WHO_AM_I_EXPECTED: u8 = 0xC7;

const CTRL_REG1_STANDBY: u8 = 0x00;
const CTRL_REG1_ACTIVE_200HZ: u8 = 0x0D; // DR=001 (200 Hz hybrid), LNOISE, ACTIVE
const CTRL_REG2_HIGH_RES: u8 = 0x02;
const CTRL_REG3_ACTIVE_LOW_PP: u8 = 0x00;
const CTRL_REG4_INT_EN_DRDY: u8 = 0x01;
const CTRL_REG5_DRDY_ON_INT2: u8 = 0x00;
const M_CTRL_REG1_HYBRID_OSR7: u8 = 0x1F;
const M_CTRL_REG2_HYB_AUTOINC: u8 = 0x20;
const XYZ_DATA_CFG_4G: u8 = 0x01;
const XYZ_DATA_CFG_FS_MASK: u8 = 0x03;

const BURST_LEN: usize = 13;

#[derive(Debug, thiserror::Error)]
pub enum Fxos8700Error<E: core::fmt::Debug> {
    #[error("I2C transfer failed: {0:?}")]
    Bus(E),
    #[error("unexpected WHO_AM_I 0x{found:02X} (expected 0x{:02X})", WHO_AM_I_EXPECTED)]
    WrongDevice { found: u8 },
    #[error("reserved accelerometer full-scale setting {0:#04x}")]
    ReservedRange(u8),
}

pub struct Fxos8700<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Fxos8700<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn who_am_i(&mut self) -> Result<u8, Fxos8700Error<I2C::Error>> {
        self.read_reg(REG_WHO_AM_I)
    }

    /// Check identity, then configure hybrid mode and go active.
    pub fn configure(&mut self) -> Result<(), Fxos8700Error<I2C::Error>> {
        let found = self.who_am_i()?;
        if found != WHO_AM_I_EXPECTED {
            return Err(Fxos8700Error::WrongDevice { found });
        }

        // Configuration registers are only writable in standby.
        self.write_reg(REG_CTRL_REG1, CTRL_REG1_STANDBY)?;

        // Hybrid accel + mag, max oversampling, burst rolls over into mag data
        self.write_reg(REG_M_CTRL_REG1, M_CTRL_REG1_HYBRID_OSR7)?;
        self.write_reg(REG_M_CTRL_REG2, M_CTRL_REG2_HYB_AUTOINC)?;

        // Accelerometer: ±4 g, high resolution
        self.write_reg(REG_XYZ_DATA_CFG, XYZ_DATA_CFG_4G)?;
        self.write_reg(REG_CTRL_REG2, CTRL_REG2_HIGH_RES)?;

        // Data-ready interrupt on INT2, active LOW push-pull
        self.write_reg(REG_CTRL_REG3, CTRL_REG3_ACTIVE_LOW_PP)?;
        self.write_reg(REG_CTRL_REG4, CTRL_REG4_INT_EN_DRDY)?;
        self.write_reg(REG_CTRL_REG5, CTRL_REG5_DRDY_ON_INT2)?;

        self.write_reg(REG_CTRL_REG1, CTRL_REG1_ACTIVE_200HZ)?;

        log::info!("FXOS8700 initialised (hybrid, ±4g, 200Hz, DRDY→INT2)");
        Ok(())
    }

    /// Burst-read status, accel and mag.  Reading the data clears DRDY.
    pub fn read_sample(&mut self) -> Result<MotionSample, Fxos8700Error<I2C::Error>> {
        let mut raw = [0u8; BURST_LEN];
        self.i2c
            .write_read(self.address, &[REG_STATUS], &mut raw)
            .map_err(Fxos8700Error::Bus)?;

        // raw[0] = status — skipped
        // Accel is 14-bit left-justified; arithmetic shift keeps the sign.
        let accel = |i: usize| i16::from_be_bytes([raw[i], raw[i + 1]]) >> 2;
        let mag = |i: usize| i16::from_be_bytes([raw[i], raw[i + 1]]);

        Ok(MotionSample {
            accel: Vector3::new(accel(1), accel(3), accel(5)),
            mag: Vector3::new(mag(7), mag(9), mag(11)),
        })
    }

    /// Configured accelerometer range in g.
    pub fn full_scale_g(&mut self) -> Result<u8, Fxos8700Error<I2C::Error>> {
        match self.read_reg(REG_XYZ_DATA_CFG)? & XYZ_DATA_CFG_FS_MASK {
            0 => Ok(2),
            1 => Ok(4),
            2 => Ok(8),
            other => Err(Fxos8700Error::ReservedRange(other)),
        }
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, Fxos8700Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(Fxos8700Error::Bus)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Fxos8700Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Fxos8700Error::Bus)
    }
}

impl<I2C> MotionSensor for Fxos8700<I2C>
where
    I2C: I2c,
    I2C::Error: Send + Sync + 'static,
{
    fn device_identity(&mut self) -> anyhow::Result<u8> {
        Ok(self.who_am_i()?)
    }

    fn enable(&mut self) -> anyhow::Result<()> {
        Ok(self.configure()?)
    }

    fn read_motion_sample(&mut self) -> anyhow::Result<MotionSample> {
        Ok(self.read_sample()?)
    }

    fn accel_full_scale_range(&mut self) -> anyhow::Result<u8> {
        Ok(self.full_scale_g()?)
    }
}
