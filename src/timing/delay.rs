//! Blocking delay stub.

use std::time::Duration;

use crate::args;
use crate::core::config::TimingConfig;
use crate::recorder::function::FunctionEmulator;
use crate::timing::sleeper::{Sleeper, ThreadSleeper};

/// Records every `delay(ms)` request, then waits through its sleeper.
pub struct DelayEmulator {
    recorder: FunctionEmulator,
    sleeper: Box<dyn Sleeper>,
}

impl std::fmt::Debug for DelayEmulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayEmulator")
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}

impl Default for DelayEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayEmulator {
    /// Stub performing real, unscaled waits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sleeper(ThreadSleeper::default())
    }

    #[must_use]
    pub fn from_config(timing: &TimingConfig) -> Self {
        Self::with_sleeper(ThreadSleeper::from_config(timing))
    }

    #[must_use]
    pub fn with_sleeper(sleeper: impl Sleeper + 'static) -> Self {
        Self {
            recorder: FunctionEmulator::new("delay"),
            sleeper: Box::new(sleeper),
        }
    }

    pub fn delay(&mut self, ms: u64) {
        self.recorder.record(args![ms]);
        self.sleeper.sleep(Duration::from_millis(ms));
    }

    /// Requested durations in call order.
    #[must_use]
    pub fn requested(&self) -> Vec<u64> {
        let args = self.recorder.arguments();
        (0..args.call_count()).map(|call| args.resolve(call, 0)).collect()
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

    pub fn reset(&mut self) {
        self.recorder.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::sleeper::RecordingSleeper;

    #[test]
    fn delay_records_argument_and_sleeps() {
        let sleeper = RecordingSleeper::new();
        let mut stub = DelayEmulator::with_sleeper(sleeper.clone());
        stub.delay(250);
        stub.delay(10);

        assert_eq!(stub.times_called(), 2);
        assert_eq!(stub.requested(), vec![250, 10]);
        assert_eq!(stub.recorder().argument::<u64>(0, 0), 250);
        assert_eq!(sleeper.total(), Duration::from_millis(260));
    }

    #[test]
    fn bypassed_config_still_records() {
        let timing = TimingConfig {
            bypass_delays: true,
            ..TimingConfig::default()
        };
        let mut stub = DelayEmulator::from_config(&timing);
        stub.delay(60_000);
        assert!(stub.was_called());
        assert_eq!(stub.requested(), vec![60_000]);
    }

    #[test]
    fn reset_forgets_requests() {
        let mut stub = DelayEmulator::with_sleeper(RecordingSleeper::new());
        stub.delay(1);
        stub.reset();
        assert!(!stub.was_called());
        assert!(stub.requested().is_empty());
    }
}
