//! Free-function stubs: call recording plus an engine for their return values.
//!
//! The recorder's call count is its own. It moves only when [`FunctionEmulator::record`]
//! runs at invocation time, never when a return value is configured, and it is
//! unrelated to the engine's per-profile invocation count.

use crate::core::errors::Result;
use crate::engine::emulator::{Emulator, ProfileHandle};
use crate::engine::value::{FromValue, Value};
use crate::logger::jsonl::{EventType, LogEntry, Severity};
use crate::recorder::args::{ArgContext, CallRecord};

/// Stub for one named free function.
#[derive(Debug)]
pub struct FunctionEmulator {
    name: String,
    engine: Emulator,
    call_count: u64,
    captured: Vec<CallRecord>,
}

impl FunctionEmulator {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_engine(name, Emulator::new())
    }

    /// Stub backed by a preconfigured engine (custom sink or sleeper).
    #[must_use]
    pub fn with_engine(name: impl Into<String>, engine: Emulator) -> Self {
        Self {
            name: name.into(),
            engine,
            call_count: 0,
            captured: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capture one invocation's arguments.
    pub fn record(&mut self, arguments: Vec<Value>) {
        let call_index = self.captured.len();
        let mut entry = LogEntry::for_method(EventType::CallRecorded, Severity::Debug, &self.name);
        entry.details = Some(format!("call={call_index} args={}", arguments.len()));
        self.engine.log(&entry);

        self.call_count += 1;
        self.captured.push(CallRecord {
            function: self.name.clone(),
            call_index,
            arguments,
        });
    }

    #[must_use]
    pub const fn was_called(&self) -> bool {
        self.call_count > 0
    }

    #[must_use]
    pub const fn times_called(&self) -> u64 {
        self.call_count
    }

    /// Typed view over every captured call.
    #[must_use]
    pub fn arguments(&self) -> ArgContext<'_> {
        ArgContext::new(&self.name, &self.captured)
    }

    #[must_use]
    pub fn calls(&self) -> &[CallRecord] {
        &self.captured
    }

    /// Shorthand for `arguments().resolve(call, arg)`.
    #[must_use]
    pub fn argument<T: FromValue + Default>(&self, call: usize, arg: usize) -> T {
        self.arguments().resolve(call, arg)
    }

    #[must_use]
    pub const fn engine(&self) -> &Emulator {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Emulator {
        &mut self.engine
    }

    /// Configure this function's return value; chain stages on the result.
    pub fn returns(&mut self, value: impl Into<Value>) -> ProfileHandle<'_> {
        self.engine.returns(self.name.clone(), value)
    }

    /// Record `arguments`, then resolve the configured return value.
    #[track_caller]
    pub fn call<T: FromValue>(&mut self, arguments: Vec<Value>) -> Result<T> {
        self.record(arguments);
        self.engine.invoke(&self.name)
    }

    /// Forget captured calls and every configured return value.
    pub fn reset(&mut self) {
        self.call_count = 0;
        self.captured.clear();
        self.engine.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::core::errors::EmuError;
    use crate::logger::sink::MemorySink;

    #[test]
    fn fresh_stub_was_not_called() {
        let stub = FunctionEmulator::new("digitalWrite");
        assert!(!stub.was_called());
        assert_eq!(stub.times_called(), 0);
        assert_eq!(stub.argument::<u8>(0, 0), 0);
    }

    #[test]
    fn configuring_returns_does_not_count_as_a_call() {
        let mut stub = FunctionEmulator::new("analogRead");
        let _ = stub.returns(512_u16).then(1023_u16);
        assert_eq!(stub.times_called(), 0);
        assert!(!stub.was_called());
    }

    #[test]
    fn call_records_then_resolves() {
        let mut stub = FunctionEmulator::new("analogRead");
        let _ = stub.returns(512_u16).times(2).then(1023_u16);

        let reads: Vec<u16> = (0_u8..3)
            .map(|pin| stub.call(args![pin]).unwrap())
            .collect();
        assert_eq!(reads, vec![512, 512, 1023]);
        assert_eq!(stub.times_called(), 3);
        assert_eq!(stub.argument::<u8>(2, 0), 2);
        assert_eq!(stub.engine().invocations("analogRead"), 3);
    }

    #[test]
    fn counters_stay_independent() {
        let mut stub = FunctionEmulator::new("pinMode");
        stub.record(args![13_u8, 1_u8]);
        stub.record(args![12_u8, 0_u8]);
        assert_eq!(stub.times_called(), 2);
        assert_eq!(stub.engine().invocations("pinMode"), 0);
    }

    #[test]
    fn call_without_configuration_is_still_recorded() {
        let mut stub = FunctionEmulator::new("tone");
        let err = stub.call::<()>(args![8_u8, 440_u32]).unwrap_err();
        assert!(matches!(err, EmuError::NoReturnValue { .. }));
        assert_eq!(stub.times_called(), 1);
        assert_eq!(stub.calls()[0].arguments.len(), 2);
    }

    #[test]
    fn reset_clears_calls_and_returns() {
        let mut stub = FunctionEmulator::new("micros");
        let _ = stub.returns(5_u64);
        stub.call::<u64>(args![]).unwrap();
        stub.reset();
        assert!(!stub.was_called());
        assert!(stub.calls().is_empty());
        assert!(stub.call::<u64>(args![]).is_err());
    }

    #[test]
    fn recording_is_logged_through_engine_sink() {
        let sink = MemorySink::new();
        let mut stub = FunctionEmulator::with_engine("noTone", Emulator::new().with_sink(sink.clone()));
        stub.record(args![8_u8]);
        assert_eq!(sink.events(), vec![EventType::CallRecorded]);
    }
}
