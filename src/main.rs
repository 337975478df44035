// FXOS Capture — Firmware Entry Point
//
// Boot sequence:
//   1. Status lights off, FXOS8700 identity check, sensor enable.
//   2. Print one diagnostic sample, light "waiting".
//   3. Wait for the arm button (falling edge on GPIO3).
//   4. Collect for one second: one line per data-ready edge (GPIO5).
//   5. Light "done" and print an idle dot every second until reset.
//
// On a non-ESP host the same loop runs against a simulated sensor so the
// output can be inspected without hardware.

use std::sync::Arc;

use fxos_capture::config::*;
use fxos_capture::report::SerialReporter;
use fxos_capture::signals::AcquisitionContext;
use fxos_capture::tasks::acquisition::{Acquisition, Timing};

// ---------------------------------------------------------------------------
// Firmware (ESP32-C3)
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_hal::gpio::{InterruptType, OutputPin, PinDriver, Pull};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;

    use fxos_capture::drivers::fxos8700::Fxos8700;
    use fxos_capture::drivers::status_led::StatusLights;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("FXOS capture firmware starting…");
    log::info!(
        "Pins: arm GPIO{}, data-ready GPIO{}, I2C SDA GPIO{} SCL GPIO{}, LEDs GPIO{}/{}/{}",
        PIN_ARM_BUTTON,
        PIN_DATA_READY,
        PIN_I2C_SDA,
        PIN_I2C_SCL,
        PIN_LED_WAITING,
        PIN_LED_BUSY,
        PIN_LED_DONE
    );

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    let status = StatusLights::active_low(
        PinDriver::output(peripherals.pins.gpio2.downgrade_output())?,
        PinDriver::output(peripherals.pins.gpio4.downgrade_output())?,
        PinDriver::output(peripherals.pins.gpio10.downgrade_output())?,
    );

    let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    let sensor = Fxos8700::new(i2c, I2C_ADDR_FXOS8700);

    // ---- Interrupts -------------------------------------------------------
    let ctx = Arc::new(AcquisitionContext::new(EspTimerClock));

    // Active-low data-ready line from FXOS INT2.
    let mut data_ready = PinDriver::input(peripherals.pins.gpio5)?;
    data_ready.set_interrupt_type(InterruptType::NegEdge)?;
    // SAFETY: the handler only touches atomics and the ISR-safe esp_timer.
    unsafe { data_ready.subscribe(ctx.data_ready_handler())? };
    data_ready.enable_interrupt()?;

    // Arm button: the board has no external pull-up.
    let mut arm_button = PinDriver::input(peripherals.pins.gpio3)?;
    arm_button.set_pull(Pull::Up)?;
    arm_button.set_interrupt_type(InterruptType::NegEdge)?;
    // SAFETY: as above, latch only.
    unsafe { arm_button.subscribe(ctx.arm_handler())? };
    arm_button.enable_interrupt()?;

    // ---- Acquisition loop ---------------------------------------------------
    // esp-idf-hal disables a GPIO interrupt after every notification.  The
    // data-ready pin is re-enabled as soon as its latch is drained, before
    // the read releases INT2; the arm button once per iteration.
    let reporter = SerialReporter::new(std::io::stdout());
    let mut acquisition = Acquisition::new(sensor, reporter, status, ctx, Timing::default())
        .with_data_ready_rearm(move || {
            data_ready.enable_interrupt()?;
            Ok(())
        });
    acquisition.startup()?;

    let halted = acquisition.run(|wait| {
        arm_button.enable_interrupt()?;
        pace(wait);
        Ok(())
    });

    let err = match halted {
        Ok(never) => match never {},
        Err(e) => e,
    };
    log::error!("Acquisition halted: {:#}", err);
    Err(err)
}

/// Microseconds since boot from the high-resolution esp_timer.  Safe to call
/// from ISR context.
#[cfg(target_os = "espidf")]
struct EspTimerClock;

#[cfg(target_os = "espidf")]
impl fxos_capture::timer::Clock for EspTimerClock {
    fn now_us(&self) -> u64 {
        unsafe { esp_idf_sys::esp_timer_get_time() as u64 }
    }
}

/// Busy-wait short delays (the collect poll is far below one FreeRTOS tick),
/// yield for long ones.
#[cfg(target_os = "espidf")]
fn pace(wait: std::time::Duration) {
    use esp_idf_hal::delay::{Ets, FreeRtos};

    if wait.as_micros() < u128::from(BUSY_DELAY_LIMIT_US) {
        Ets::delay_us(wait.as_micros() as u32);
    } else {
        FreeRtos::delay_ms(wait.as_millis() as u32);
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use std::thread;
    use std::time::Duration;

    use fxos_capture::sim::{self, LoggedStatus, SimulatedSensor};
    use fxos_capture::timer::SystemClock;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("FXOS capture host simulation starting…");

    let ctx = Arc::new(AcquisitionContext::new(SystemClock::new()));
    let reporter = SerialReporter::new(std::io::stdout());
    let mut acquisition = Acquisition::new(
        SimulatedSensor::new(),
        reporter,
        LoggedStatus,
        Arc::clone(&ctx),
        Timing::default(),
    );
    acquisition.startup()?;

    sim::spawn_data_ready(&ctx, SENSOR_RATE_HZ)?;
    sim::spawn_arm_press(&ctx, Duration::from_millis(SIM_ARM_DELAY_MS))?;

    let halted = acquisition.run(|wait| {
        thread::sleep(wait);
        Ok(())
    });

    let err = match halted {
        Ok(never) => match never {},
        Err(e) => e,
    };
    log::error!("Acquisition halted: {:#}", err);
    Err(err)
}
