// FXOS Capture — Status Lights
//
// Three GPIO-driven LEDs: waiting, busy (collecting) and done.  At most one
// is lit at a time.

use embedded_hal::digital::OutputPin;

use crate::events::Indication;

pub trait StatusIndicator {
    fn show(&mut self, indication: Indication) -> anyhow::Result<()>;
}

impl<I: StatusIndicator + ?Sized> StatusIndicator for &mut I {
    fn show(&mut self, indication: Indication) -> anyhow::Result<()> {
        (**self).show(indication)
    }
}

pub struct StatusLights<P> {
    waiting: P,
    busy: P,
    done: P,
    active_low: bool,
}

impl<P: OutputPin> StatusLights<P> {
    pub fn new(waiting: P, busy: P, done: P, active_low: bool) -> Self {
        Self { waiting, busy, done, active_low }
    }

    /// Board LEDs wired to VCC (lit when the pin is driven LOW).
    pub fn active_low(waiting: P, busy: P, done: P) -> Self {
        Self::new(waiting, busy, done, true)
    }

    fn drive(pin: &mut P, on: bool, active_low: bool) -> anyhow::Result<()> {
        let result = if on != active_low { pin.set_high() } else { pin.set_low() };
        result.map_err(|e| anyhow::anyhow!("status LED write failed: {:?}", e))
    }
}

impl<P: OutputPin> StatusIndicator for StatusLights<P> {
    fn show(&mut self, indication: Indication) -> anyhow::Result<()> {
        let lit = match indication {
            Indication::Off => [false, false, false],
            Indication::Waiting => [true, false, false],
            Indication::Busy => [false, true, false],
            Indication::Complete => [false, false, true],
        };
        let active_low = self.active_low;
        let mut pins = [&mut self.waiting, &mut self.busy, &mut self.done];

        // Old light off before the new one comes on.
        for pass_on in [false, true] {
            for (pin, on) in pins.iter_mut().zip(lit) {
                if on == pass_on {
                    Self::drive(pin, on, active_low)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::rc::Rc;

    use embedded_hal::digital::ErrorType;

    use super::*;

    /// Records the electrical level of a pin into a shared log.
    struct FakePin {
        name: &'static str,
        log: Rc<RefCell<Vec<(&'static str, bool)>>>,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push((self.name, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push((self.name, true));
            Ok(())
        }
    }

    fn lights(active_low: bool) -> (StatusLights<FakePin>, Rc<RefCell<Vec<(&'static str, bool)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let pin = |name| FakePin { name, log: Rc::clone(&log) };
        (StatusLights::new(pin("waiting"), pin("busy"), pin("done"), active_low), log)
    }

    #[test]
    fn active_low_busy_drives_only_busy_low() {
        let (mut lights, log) = lights(true);
        lights.show(Indication::Busy).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![("waiting", true), ("done", true), ("busy", false)]
        );
    }

    #[test]
    fn off_turns_everything_off() {
        let (mut lights, log) = lights(true);
        lights.show(Indication::Off).unwrap();
        assert!(log.borrow().iter().all(|(_, level)| *level));
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn active_high_complete() {
        let (mut lights, log) = lights(false);
        lights.show(Indication::Complete).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![("waiting", false), ("busy", false), ("done", true)]
        );
    }
}
