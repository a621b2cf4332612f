//! LED blink task
//!
//! Two-state machine toggling an output line once per interval. Purely
//! time-driven; no error conditions.

use crate::config::CFG_BLINK_INTERVAL_TICKS;
use crate::hal::OutputPin;
use crate::task::{Control, Task};
use crate::types::Tick;

/// Periodic LED toggler
pub struct BlinkTask<P: OutputPin> {
    pin: P,
    interval: Tick,
    led_on: bool,
    toggles: u32,
}

impl<P: OutputPin> BlinkTask<P> {
    /// Blink at the configured default interval
    pub fn new(pin: P) -> Self {
        Self::with_interval(pin, CFG_BLINK_INTERVAL_TICKS)
    }

    /// Blink at an explicit interval in ticks
    pub fn with_interval(pin: P, interval: Tick) -> Self {
        Self {
            pin,
            interval,
            led_on: false,
            toggles: 0,
        }
    }

    /// Level changes performed so far
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    /// Access the underlying pin
    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: OutputPin> Task for BlinkTask<P> {
    fn name(&self) -> &'static str {
        "blink"
    }

    fn poll(&mut self, _now: Tick) -> crate::Result<Control> {
        self.led_on = !self.led_on;
        if self.led_on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        self.toggles = self.toggles.wrapping_add(1);

        Ok(Control::Sleep(self.interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::MockPin;

    #[test]
    fn alternates_levels() {
        let mut task = BlinkTask::with_interval(MockPin::new(), 10);

        assert_eq!(task.poll(0), Ok(Control::Sleep(10)));
        assert!(task.pin().is_high());

        task.poll(10).unwrap();
        assert!(!task.pin().is_high());

        assert_eq!(task.toggles(), 2);
    }
}
