//! Method profiles: per-name return stages and their playback state.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

use crate::engine::value::Value;

/// One return stage: a value and how many more calls it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCell {
    /// Remaining uses. `0` means the cell is exhausted.
    pub repeat: u32,
    pub value: Value,
}

impl ValueCell {
    /// A fresh cell answering exactly one call.
    #[must_use]
    pub fn once(value: Value) -> Self {
        Self { repeat: 1, value }
    }
}

/// Stored configuration and live playback state for one mocked method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodProfile {
    name: String,
    active: ValueCell,
    queue: VecDeque<ValueCell>,
    invocation_count: u64,
    delay: Duration,
}

impl MethodProfile {
    /// New profile returning `value` once, then forever once exhausted.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value, delay: Duration) -> Self {
        Self {
            name: name.into(),
            active: ValueCell::once(value),
            queue: VecDeque::new(),
            invocation_count: 0,
            delay,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn active(&self) -> &ValueCell {
        &self.active
    }

    /// Follow-up stages not yet promoted to active.
    pub fn queued(&self) -> impl Iterator<Item = &ValueCell> {
        self.queue.iter()
    }

    /// Number of successful resolutions served by this profile.
    #[must_use]
    pub const fn invocation_count(&self) -> u64 {
        self.invocation_count
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Distinct return stages still held: the active cell plus the queue.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        1 + self.queue.len()
    }

    pub(crate) fn push_stage(&mut self, value: Value) {
        self.queue.push_back(ValueCell::once(value));
    }

    /// Set the repeat count of the stage configured last.
    pub(crate) fn set_repeat(&mut self, repeat: u32) {
        match self.queue.back_mut() {
            Some(last) => last.repeat = repeat,
            None => self.active.repeat = repeat,
        }
    }

    pub(crate) fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Advance playback by one call and return the value that answers it.
    ///
    /// A cell with uses left is consumed. An exhausted cell is replaced by the
    /// next queued one without spending the call. With nothing queued, the last
    /// active value keeps answering.
    pub(crate) fn play(&mut self) -> &Value {
        loop {
            if self.active.repeat > 0 {
                self.active.repeat -= 1;
                break;
            }
            match self.queue.pop_front() {
                Some(next) => self.active = next,
                None => break,
            }
        }
        self.invocation_count += 1;
        &self.active.value
    }
}

/// Serializable view of a profile for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub method: String,
    pub invoked: u64,
    pub return_values: usize,
    pub delay_ms: u64,
}

impl From<&MethodProfile> for ProfileSummary {
    fn from(profile: &MethodProfile) -> Self {
        Self {
            method: profile.name.clone(),
            invoked: profile.invocation_count,
            return_values: profile.stage_count(),
            delay_ms: u64::try_from(profile.delay.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(value: i64) -> MethodProfile {
        MethodProfile::new("read", Value::Int(value), Duration::ZERO)
    }

    fn play_n(profile: &mut MethodProfile, n: usize) -> Vec<Value> {
        (0..n).map(|_| profile.play().clone()).collect()
    }

    #[test]
    fn single_stage_is_sticky() {
        let mut p = profile(7);
        assert_eq!(play_n(&mut p, 4), vec![Value::Int(7); 4]);
        assert_eq!(p.invocation_count(), 4);
    }

    #[test]
    fn repeat_then_chain_plays_in_order() {
        let mut p = profile(1);
        p.set_repeat(2);
        p.push_stage(Value::Int(2));
        assert_eq!(
            play_n(&mut p, 4),
            vec![Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(2)]
        );
    }

    #[test]
    fn repeat_targets_last_queued_stage() {
        let mut p = profile(10);
        p.push_stage(Value::Int(20));
        p.set_repeat(3);
        p.push_stage(Value::Int(30));
        assert_eq!(
            play_n(&mut p, 6),
            vec![
                Value::Int(10),
                Value::Int(20),
                Value::Int(20),
                Value::Int(20),
                Value::Int(30),
                Value::Int(30),
            ]
        );
    }

    #[test]
    fn zero_repeat_advances_without_spending_a_call() {
        let mut p = profile(1);
        p.set_repeat(0);
        p.push_stage(Value::Int(2));
        assert_eq!(p.play(), &Value::Int(2));
        assert_eq!(p.invocation_count(), 1);
        assert_eq!(p.stage_count(), 1);
    }

    #[test]
    fn zero_repeat_on_every_stage_lands_on_last_value() {
        let mut p = profile(1);
        p.set_repeat(0);
        p.push_stage(Value::Int(2));
        p.set_repeat(0);
        p.push_stage(Value::Int(3));
        p.set_repeat(0);
        assert_eq!(play_n(&mut p, 2), vec![Value::Int(3), Value::Int(3)]);
    }

    #[test]
    fn stage_count_shrinks_as_queue_drains() {
        let mut p = profile(1);
        p.push_stage(Value::Int(2));
        p.push_stage(Value::Int(3));
        assert_eq!(p.stage_count(), 3);
        p.play();
        p.play();
        assert_eq!(p.stage_count(), 2);
    }

    #[test]
    fn summary_reflects_profile() {
        let mut p = MethodProfile::new("seek", Value::Bool(true), Duration::from_millis(15));
        p.push_stage(Value::Bool(false));
        p.play();
        let summary = ProfileSummary::from(&p);
        assert_eq!(
            summary,
            ProfileSummary {
                method: "seek".to_string(),
                invoked: 1,
                return_values: 2,
                delay_ms: 15,
            }
        );
    }
}
