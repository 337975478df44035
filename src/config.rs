// FXOS Capture — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V) + FXOS8700CQ breakout

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_ARM_BUTTON: i32 = 3;  // D1    — Arm button (INPUT_PULLUP, falling edge)
pub const PIN_DATA_READY: i32 = 5;  // D3    — FXOS INT2, active-low data-ready
pub const PIN_I2C_SDA: i32 = 6;     // D4    — I2C data line
pub const PIN_I2C_SCL: i32 = 7;     // D5    — I2C clock line
pub const PIN_LED_WAITING: i32 = 2; // D0    — "waiting" LED (active LOW)
pub const PIN_LED_BUSY: i32 = 4;    // D2    — "collecting" LED (active LOW)
pub const PIN_LED_DONE: i32 = 10;   // D10   — "complete" LED (active LOW)

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_FXOS8700: u8 = 0x1E; // SA1=0, SA0=0
pub const I2C_BAUDRATE_KHZ: u32 = 400;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
pub const COLLECTION_WINDOW_MS: u64 = 1000;
pub const IDLE_POLL_INTERVAL_MS: u64 = 50;       // fast enough for a button press
pub const COLLECT_POLL_INTERVAL_US: u64 = 500;   // 1/10th of the 200 Hz sample period
pub const HEARTBEAT_INTERVAL_MS: u64 = 1000;

/// Nominal data-ready rate in hybrid (accel + mag) mode.
pub const SENSOR_RATE_HZ: u32 = 200;

/// Below this delay the firmware busy-waits instead of yielding to FreeRTOS
/// (one tick at the default 100 Hz tick rate).
pub const BUSY_DELAY_LIMIT_US: u64 = 10_000;

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------
pub const SIM_ARM_DELAY_MS: u64 = 250;
