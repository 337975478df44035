// FXOS Capture — Library Root
//
// Everything except board bring-up lives here so the acquisition loop can be
// exercised on the host.  The firmware binary (`main.rs`) wires these
// pieces to ESP-IDF GPIO, I2C and the UART console.

pub mod config;
pub mod drivers;
pub mod events;
pub mod report;
pub mod sensor;
pub mod signals;
pub mod tasks;
pub mod timer;

#[cfg(not(target_os = "espidf"))]
pub mod sim;

#[cfg(all(test, not(target_os = "espidf")))]
mod scenario_tests;
