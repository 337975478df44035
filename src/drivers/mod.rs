pub mod fxos8700;
pub mod status_led;
