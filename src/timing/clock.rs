//! Monotonic millisecond clock stub.

use crate::core::config::TimingConfig;
use crate::recorder::function::FunctionEmulator;

/// Every read advances the clock by a fixed increment and is recorded as a call.
#[derive(Debug)]
pub struct MillisEmulator {
    total: u64,
    increment: u64,
    recorder: FunctionEmulator,
}

impl Default for MillisEmulator {
    fn default() -> Self {
        Self::from_config(&TimingConfig::default())
    }
}

impl MillisEmulator {
    /// Clock seeded at `start`, advancing by `increment` per read.
    #[must_use]
    pub fn new(start: u64, increment: u64) -> Self {
        Self {
            total: start,
            increment,
            recorder: FunctionEmulator::new("millis"),
        }
    }

    #[must_use]
    pub fn from_config(timing: &TimingConfig) -> Self {
        Self::new(timing.millis_start, timing.millis_increment)
    }

    /// Advance and return the new total.
    pub fn millis(&mut self) -> u64 {
        self.recorder.record(Vec::new());
        self.total = self.total.saturating_add(self.increment);
        self.total
    }

    /// Current total without advancing or recording.
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.total
    }

    pub fn reset_millis(&mut self) {
        self.total = 0;
    }

    pub fn set_time_increment(&mut self, increment: u64) {
        self.increment = increment;
    }

    #[must_use]
    pub const fn time_increment(&self) -> u64 {
        self.increment
    }

    #[must_use]
    pub const fn was_called(&self) -> bool {
        self.recorder.was_called()
    }

    #[must_use]
    pub const fn times_called(&self) -> u64 {
        self.recorder.times_called()
    }

    #[must_use]
    pub const fn recorder(&self) -> &FunctionEmulator {
        &self.recorder
    }

    /// Zero the clock and forget recorded reads; the increment is kept.
    pub fn reset(&mut self) {
        self.reset_millis();
        self.recorder.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clock_advances_by_one_hundred() {
        let mut clock = MillisEmulator::default();
        assert_eq!(clock.millis(), 100);
        assert_eq!(clock.millis(), 200);
        assert_eq!(clock.times_called(), 2);
    }

    #[test]
    fn start_and_increment_come_from_config() {
        let timing = TimingConfig {
            millis_start: 5_000,
            millis_increment: 20,
            ..TimingConfig::default()
        };
        let mut clock = MillisEmulator::from_config(&timing);
        assert_eq!(clock.peek(), 5_000);
        assert_eq!(clock.millis(), 5_020);
        assert!(!clock.recorder().calls().is_empty());
    }

    #[test]
    fn reset_millis_zeroes_total_but_keeps_calls() {
        let mut clock = MillisEmulator::new(1_000, 10);
        clock.millis();
        clock.reset_millis();
        assert_eq!(clock.millis(), 10);
        assert_eq!(clock.times_called(), 2);
    }

    #[test]
    fn increment_can_change_mid_test() {
        let mut clock = MillisEmulator::new(0, 1);
        clock.millis();
        clock.set_time_increment(1_000);
        assert_eq!(clock.millis(), 1_001);
        assert_eq!(clock.time_increment(), 1_000);
    }

    #[test]
    fn full_reset_forgets_reads() {
        let mut clock = MillisEmulator::new(0, 5);
        clock.millis();
        clock.reset();
        assert!(!clock.was_called());
        assert_eq!(clock.peek(), 0);
    }

    #[test]
    fn total_saturates_instead_of_wrapping() {
        let mut clock = MillisEmulator::new(u64::MAX - 1, 10);
        assert_eq!(clock.millis(), u64::MAX);
    }
}
