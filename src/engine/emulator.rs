//! The behavior engine: return-value configuration, configured exceptions and
//! deterministic playback for every mocked surface.
//!
//! Configuration goes through [`Emulator::returns`], which hands back a
//! [`ProfileHandle`] bound to the profile it just created:
//!
//! ```rust
//! use hw_emulator::engine::emulator::Emulator;
//!
//! let mut emu = Emulator::new();
//! emu.returns("read", 10).times(3).then(0);
//!
//! let reads: Vec<i32> = (0..5).map(|_| emu.invoke("read").unwrap()).collect();
//! assert_eq!(reads, [10, 10, 10, 0, 0]);
//! ```
//!
//! Resolution order for `invoke(name)`:
//! 1. engine-wide wait, if any
//! 2. exception table (first match raises, profiles are never consulted)
//! 3. first profile registered under `name`, else `NoReturnValue`
//! 4. playback, then the profile's own delay, then the typed cast

use std::fmt;
use std::panic::Location;
use std::time::Duration;

use crate::core::config::Config;
use crate::core::errors::{EmuError, ExceptionCode, Result};
use crate::engine::exceptions::ExceptionTable;
use crate::engine::profile::MethodProfile;
use crate::engine::value::{FromValue, Value};
use crate::logger::jsonl::{EventType, LogEntry, Severity};
use crate::logger::sink::{LogSink, NullSink};
use crate::logger::sink_from_config;
use crate::report::MethodReport;
use crate::timing::sleeper::{Sleeper, ThreadSleeper};

/// Last internal condition seen by [`Emulator::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    /// Nothing invoked since construction or the last reset.
    #[default]
    Clear,
    /// The exception table had no entry for the invoked method.
    NoExceptionConfigured,
    /// A configured exception preempted resolution.
    ExceptionRaised(ExceptionCode),
    /// No profile existed for the invoked method.
    NoReturnValue,
}

/// Owns all method profiles and the exception table for one test case.
pub struct Emulator {
    profiles: Vec<MethodProfile>,
    exceptions: ExceptionTable,
    wait: Duration,
    last_method: Option<String>,
    last_condition: Condition,
    sink: Box<dyn LogSink>,
    sleeper: Box<dyn Sleeper>,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Emulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emulator")
            .field("profiles", &self.profiles)
            .field("exceptions", &self.exceptions)
            .field("wait", &self.wait)
            .field("last_condition", &self.last_condition)
            .finish_non_exhaustive()
    }
}

impl Emulator {
    /// Engine with no logging and real, unscaled waits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
            exceptions: ExceptionTable::new(),
            wait: Duration::ZERO,
            last_method: None,
            last_condition: Condition::Clear,
            sink: Box::new(NullSink),
            sleeper: Box::new(ThreadSleeper::default()),
        }
    }

    /// Engine whose sink and wait behavior follow `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            sink: sink_from_config(config),
            sleeper: Box::new(ThreadSleeper::from_config(&config.timing)),
            ..Self::new()
        }
    }

    /// Replace the log sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace the blocking-wait implementation.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    // ──────────────────── configuration ────────────────────

    /// Register a new profile for `method` answering with `value`.
    ///
    /// Registering the same name again creates an additional profile, but
    /// resolution always uses the first one registered.
    pub fn returns(&mut self, method: impl Into<String>, value: impl Into<Value>) -> ProfileHandle<'_> {
        self.returns_after(method, value, Duration::ZERO)
    }

    /// Like [`Emulator::returns`], blocking for `delay` on every resolution.
    pub fn returns_after(
        &mut self,
        method: impl Into<String>,
        value: impl Into<Value>,
        delay: Duration,
    ) -> ProfileHandle<'_> {
        let profile = MethodProfile::new(method, value.into(), delay);
        let mut entry = LogEntry::for_method(EventType::ReturnConfigured, Severity::Debug, profile.name());
        entry.value = Some(profile.active().value.to_string());
        entry.duration_ms = duration_ms(delay);
        self.sink.record(&entry);

        self.last_method = Some(profile.name().to_string());
        self.profiles.push(profile);
        let index = self.profiles.len() - 1;
        ProfileHandle {
            emulator: self,
            index,
        }
    }

    /// Append a follow-up stage to the profile that answers the most recently
    /// configured method name, i.e. the first one registered under it.
    ///
    /// Silently ignored when nothing has been registered yet.
    pub fn then(&mut self, value: impl Into<Value>) -> &mut Self {
        if let Some(index) = self.chain_target() {
            self.chain_stage(index, value.into());
        }
        self
    }

    /// Set the repeat count of the last configured stage of the profile that
    /// answers the most recently configured method name. Silently ignored
    /// when nothing has been registered.
    pub fn times(&mut self, n: u32) -> &mut Self {
        if let Some(index) = self.chain_target() {
            self.set_repeat(index, n);
        }
        self
    }

    /// Make every call to `method` fail with `code`, ahead of any return value.
    pub fn set_exception(&mut self, method: impl Into<String>, code: ExceptionCode) {
        let method = method.into();
        let mut entry = LogEntry::for_method(EventType::ExceptionConfigured, Severity::Debug, &method);
        entry.code = Some(code);
        self.sink.record(&entry);
        self.exceptions.push(method, code);
    }

    /// Engine-wide wait applied before every invocation.
    pub fn waits(&mut self, wait: Duration) {
        self.wait = wait;
    }

    /// Drop all profiles, exceptions and wait state.
    pub fn reset(&mut self) {
        self.profiles.clear();
        self.exceptions.clear();
        self.wait = Duration::ZERO;
        self.last_method = None;
        self.last_condition = Condition::Clear;
        self.sink.record(&LogEntry::new(EventType::Reset, Severity::Info));
    }

    fn chain_target(&self) -> Option<usize> {
        let method = self.last_method.as_deref()?;
        self.profiles.iter().position(|profile| profile.name() == method)
    }

    fn chain_stage(&mut self, index: usize, value: Value) {
        let Some(profile) = self.profiles.get_mut(index) else {
            return;
        };
        let mut entry = LogEntry::for_method(EventType::StageChained, Severity::Debug, profile.name());
        entry.value = Some(value.to_string());
        profile.push_stage(value);
        self.sink.record(&entry);
    }

    fn set_repeat(&mut self, index: usize, n: u32) {
        let Some(profile) = self.profiles.get_mut(index) else {
            return;
        };
        profile.set_repeat(n);
        let mut entry = LogEntry::for_method(EventType::RepeatSet, Severity::Debug, profile.name());
        entry.details = Some(format!("repeat={n}"));
        self.sink.record(&entry);
    }

    // ──────────────────── resolution ────────────────────

    /// Resolve the next outcome for `method` as `T`.
    ///
    /// Fails with the configured code when an exception is registered, with
    /// `NoReturnValue` (carrying the caller's location) when nothing is
    /// configured, and with `TypeMismatch` when the stored value is not a `T`.
    #[track_caller]
    pub fn invoke<T: FromValue>(&mut self, method: &str) -> Result<T> {
        let location = Location::caller();
        let value = self.resolve_value(method, location)?;
        match value.resolve::<T>() {
            Some(resolved) => Ok(resolved),
            None => {
                let err = EmuError::TypeMismatch {
                    method: method.to_string(),
                    expected: std::any::type_name::<T>(),
                    found: value.kind(),
                };
                self.sink.record(
                    &LogEntry::for_method(EventType::TypeMismatch, Severity::Warning, method)
                        .with_error(&err),
                );
                Err(err)
            }
        }
    }

    /// Like [`Emulator::invoke`], but a type mismatch yields `T::default()`.
    ///
    /// Configured exceptions and missing configuration still fail.
    #[track_caller]
    pub fn invoke_or_default<T: FromValue + Default>(&mut self, method: &str) -> Result<T> {
        match self.invoke::<T>(method) {
            Err(err) if err.is_recoverable() => Ok(T::default()),
            other => other,
        }
    }

    /// Resolve the next outcome for `method` without a typed cast.
    #[track_caller]
    pub fn invoke_value(&mut self, method: &str) -> Result<Value> {
        self.resolve_value(method, Location::caller())
    }

    fn resolve_value(&mut self, method: &str, location: &Location<'_>) -> Result<Value> {
        if !self.wait.is_zero() {
            self.pause(method, self.wait);
        }

        if let Some(code) = self.exceptions.lookup(method) {
            self.last_condition = Condition::ExceptionRaised(code);
            let err = EmuError::Raised {
                method: method.to_string(),
                code,
            };
            let mut entry = LogEntry::for_method(EventType::ExceptionRaised, Severity::Warning, method)
                .with_error(&err);
            entry.code = Some(code);
            self.sink.record(&entry);
            return Err(err);
        }
        self.last_condition = Condition::NoExceptionConfigured;

        let Some(profile) = self.profiles.iter_mut().find(|profile| profile.name() == method) else {
            self.last_condition = Condition::NoReturnValue;
            let err = EmuError::NoReturnValue {
                method: method.to_string(),
                location: format!("{}:{}", location.file(), location.line()),
            };
            self.sink.record(
                &LogEntry::for_method(EventType::NoReturnValue, Severity::Error, method)
                    .with_error(&err),
            );
            return Err(err);
        };

        let value = profile.play().clone();
        let delay = profile.delay();

        let mut entry = LogEntry::for_method(EventType::Invoked, Severity::Debug, method);
        entry.value = Some(value.to_string());
        self.sink.record(&entry);

        if !delay.is_zero() {
            self.pause(method, delay);
        }
        Ok(value)
    }

    fn pause(&mut self, method: &str, duration: Duration) {
        let mut entry = LogEntry::for_method(EventType::Delay, Severity::Debug, method);
        entry.duration_ms = duration_ms(duration);
        self.sink.record(&entry);
        self.sleeper.sleep(duration);
    }

    // ──────────────────── inspection ────────────────────

    /// All profiles in registration order.
    #[must_use]
    pub fn profiles(&self) -> &[MethodProfile] {
        &self.profiles
    }

    /// The profile `invoke(method)` resolves against.
    #[must_use]
    pub fn profile(&self, method: &str) -> Option<&MethodProfile> {
        self.profiles.iter().find(|profile| profile.name() == method)
    }

    /// Resolutions served for `method`; `0` when it was never configured.
    #[must_use]
    pub fn invocations(&self, method: &str) -> u64 {
        self.profile(method).map_or(0, MethodProfile::invocation_count)
    }

    #[must_use]
    pub const fn exceptions(&self) -> &ExceptionTable {
        &self.exceptions
    }

    #[must_use]
    pub const fn last_condition(&self) -> Condition {
        self.last_condition
    }

    #[must_use]
    pub const fn wait(&self) -> Duration {
        self.wait
    }

    /// Human-readable invocation report over the current profiles.
    #[must_use]
    pub fn report(&self) -> MethodReport {
        MethodReport::from_profiles(&self.profiles)
    }

    /// Push any buffered log lines to their destination.
    pub fn flush_log(&mut self) {
        self.sink.flush();
    }

    /// Forward an entry produced outside the engine (call recording) to its sink.
    pub(crate) fn log(&mut self, entry: &LogEntry) {
        self.sink.record(entry);
    }
}

/// Chaining handle bound to exactly one profile.
#[derive(Debug)]
pub struct ProfileHandle<'a> {
    emulator: &'a mut Emulator,
    index: usize,
}

impl ProfileHandle<'_> {
    /// Queue another stage answering once.
    #[must_use = "the handle configures further stages; drop it when done"]
    pub fn then(self, value: impl Into<Value>) -> Self {
        self.emulator.chain_stage(self.index, value.into());
        self
    }

    /// Repeat count of the stage configured last.
    #[must_use = "the handle configures further stages; drop it when done"]
    pub fn times(self, n: u32) -> Self {
        self.emulator.set_repeat(self.index, n);
        self
    }

    /// Delay applied on every resolution of this profile.
    #[must_use = "the handle configures further stages; drop it when done"]
    pub fn delay(self, delay: Duration) -> Self {
        if let Some(profile) = self.emulator.profiles.get_mut(self.index) {
            profile.set_delay(delay);
        }
        self
    }

    /// The profile this handle configures.
    #[must_use]
    pub fn profile(&self) -> &MethodProfile {
        &self.emulator.profiles[self.index]
    }
}

fn duration_ms(duration: Duration) -> Option<u64> {
    (!duration.is_zero()).then(|| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
