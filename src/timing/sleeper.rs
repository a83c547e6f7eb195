//! Blocking-wait seam used by configured delays and the delay stub.

#![allow(missing_docs)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::config::TimingConfig;

/// Performs (or pretends to perform) a blocking wait.
pub trait Sleeper: Send {
    fn sleep(&mut self, duration: Duration);
}

/// Real `thread::sleep`, scaled by a factor or bypassed entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreadSleeper {
    scale: f64,
    bypass: bool,
}

impl Default for ThreadSleeper {
    fn default() -> Self {
        Self {
            scale: 1.0,
            bypass: false,
        }
    }
}

impl ThreadSleeper {
    /// Sleeper multiplying every wait by `scale`; invalid scales collapse to zero.
    #[must_use]
    pub fn scaled(scale: f64) -> Self {
        let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
        Self {
            scale,
            bypass: false,
        }
    }

    /// Sleeper that never blocks.
    #[must_use]
    pub const fn bypassed() -> Self {
        Self {
            scale: 0.0,
            bypass: true,
        }
    }

    #[must_use]
    pub fn from_config(timing: &TimingConfig) -> Self {
        if timing.bypass_delays {
            Self::bypassed()
        } else {
            Self::scaled(timing.delay_scale)
        }
    }

    /// Duration actually waited for a requested `duration`. Saturates at
    /// `Duration::MAX` when the scaled wait does not fit.
    #[must_use]
    pub fn effective(&self, duration: Duration) -> Duration {
        if self.bypass {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(duration.as_secs_f64() * self.scale)
                .unwrap_or(Duration::MAX)
        }
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        let effective = self.effective(duration);
        if !effective.is_zero() {
            thread::sleep(effective);
        }
    }
}

/// Never blocks; remembers every requested wait. Clones share the log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        self.slept.lock().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn scale_applies_to_requested_duration() {
        let sleeper = ThreadSleeper::scaled(0.5);
        assert_eq!(
            sleeper.effective(Duration::from_millis(40)),
            Duration::from_millis(20)
        );
    }

    #[test]
    fn invalid_scale_collapses_to_zero() {
        assert_eq!(
            ThreadSleeper::scaled(f64::NAN).effective(Duration::from_secs(1)),
            Duration::ZERO
        );
        assert_eq!(
            ThreadSleeper::scaled(-2.0).effective(Duration::from_secs(1)),
            Duration::ZERO
        );
    }

    #[test]
    fn huge_scale_saturates_instead_of_overflowing() {
        let timing = TimingConfig {
            delay_scale: 1e300,
            ..TimingConfig::default()
        };
        let sleeper = ThreadSleeper::from_config(&timing);
        assert_eq!(sleeper.effective(Duration::from_millis(1)), Duration::MAX);
        assert_eq!(sleeper.effective(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn bypass_from_config_never_blocks() {
        let timing = TimingConfig {
            bypass_delays: true,
            ..TimingConfig::default()
        };
        let mut sleeper = ThreadSleeper::from_config(&timing);
        let started = Instant::now();
        sleeper.sleep(Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn real_sleep_waits_at_least_the_scaled_duration() {
        let mut sleeper = ThreadSleeper::default();
        let started = Instant::now();
        sleeper.sleep(Duration::from_millis(15));
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn recording_sleeper_clones_share_requests() {
        let observer = RecordingSleeper::new();
        let mut sleeper = observer.clone();
        sleeper.sleep(Duration::from_millis(5));
        sleeper.sleep(Duration::from_millis(7));
        assert_eq!(
            observer.requests(),
            vec![Duration::from_millis(5), Duration::from_millis(7)]
        );
        assert_eq!(observer.total(), Duration::from_millis(12));
    }
}
