// FXOS Capture — Sample Reporter
//
// Turns report events into the serial text stream: one line per sample plus
// a few one-time status lines and an idle heartbeat dot.

use std::io::Write;

use crate::events::{Reading, ReportEvent};

pub trait Reporter {
    fn report(&mut self, event: ReportEvent) -> anyhow::Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: ReportEvent) -> anyhow::Result<()> {
        (**self).report(event)
    }
}

/// Fixed-width sample line: elapsed µs, then accel and mag axes.
pub fn format_reading(reading: &Reading) -> String {
    let a = reading.sample.accel;
    let m = reading.sample.mag;
    format!(
        "{} A X:{:5},Y:{:5},Z:{:5}   M X:{:5},Y:{:5},Z:{:5}",
        reading.timestamp_us, a.x, a.y, a.z, m.x, m.y, m.z
    )
}

/// Line-oriented reporter over any byte sink (stdout → UART console on the
/// device).
pub struct SerialReporter<W> {
    out: W,
}

impl<W: Write> SerialReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> anyhow::Result<()> {
        write!(self.out, "{}\r\n", text)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Reporter for SerialReporter<W> {
    fn report(&mut self, event: ReportEvent) -> anyhow::Result<()> {
        match event {
            ReportEvent::DeviceIdentity(id) => self.line(&format!("FXOS8700 Who Am I = 0x{:02X}", id)),
            ReportEvent::Reading(reading) => self.line(&format_reading(&reading)),
            ReportEvent::WaitingForTrigger => self.line("Waiting for data collection trigger"),
            ReportEvent::CollectionStarted { full_scale_g } => self.line(&format!(
                "Started data collection. Accelerometer at max {}g.",
                full_scale_g
            )),
            ReportEvent::CollectionComplete => self.line("Done. Reset to repeat."),
            ReportEvent::Heartbeat => {
                self.out.write_all(b".")?;
                self.out.flush()?;
                Ok(())
            }
        }
    }
}
