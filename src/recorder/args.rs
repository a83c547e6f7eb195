//! Captured call arguments and their typed retrieval.

use serde::Serialize;

use crate::core::errors::{EmuError, Result};
use crate::engine::value::{FromValue, Value};

/// Snapshot of one invocation's arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    pub function: String,
    /// Zero-based position among this function's calls.
    pub call_index: usize,
    pub arguments: Vec<Value>,
}

/// Read-only view over every captured call of one function.
#[derive(Debug, Clone, Copy)]
pub struct ArgContext<'a> {
    function: &'a str,
    records: &'a [CallRecord],
}

impl<'a> ArgContext<'a> {
    #[must_use]
    pub const fn new(function: &'a str, records: &'a [CallRecord]) -> Self {
        Self { function, records }
    }

    /// Argument `arg` of call `call` as `T`; `T::default()` when it is absent
    /// or stored as another type.
    #[must_use]
    pub fn resolve<T: FromValue + Default>(&self, call: usize, arg: usize) -> T {
        self.try_resolve(call, arg).unwrap_or_default()
    }

    /// Argument `arg` of call `call` as `T`, or why it cannot be produced.
    pub fn try_resolve<T: FromValue>(&self, call: usize, arg: usize) -> Result<T> {
        let value = self.get(call, arg).ok_or_else(|| EmuError::ArgumentUnavailable {
            function: self.function.to_string(),
            call_index: call,
            arg_index: arg,
        })?;
        value.resolve::<T>().ok_or_else(|| EmuError::TypeMismatch {
            method: self.function.to_string(),
            expected: std::any::type_name::<T>(),
            found: value.kind(),
        })
    }

    /// Raw stored argument.
    #[must_use]
    pub fn get(&self, call: usize, arg: usize) -> Option<&'a Value> {
        self.records.get(call)?.arguments.get(arg)
    }

    #[must_use]
    pub const fn call_count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn call(&self, call: usize) -> Option<&'a CallRecord> {
        self.records.get(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn records() -> Vec<CallRecord> {
        vec![
            CallRecord {
                function: "delay".to_string(),
                call_index: 0,
                arguments: args![250_u64],
            },
            CallRecord {
                function: "delay".to_string(),
                call_index: 1,
                arguments: args![1000_u64, "spin"],
            },
        ]
    }

    #[test]
    fn resolves_arguments_by_call_and_position() {
        let records = records();
        let ctx = ArgContext::new("delay", &records);
        assert_eq!(ctx.resolve::<u64>(0, 0), 250);
        assert_eq!(ctx.resolve::<u32>(1, 0), 1000);
        assert_eq!(ctx.resolve::<String>(1, 1), "spin");
        assert_eq!(ctx.call_count(), 2);
    }

    #[test]
    fn mismatch_and_absence_fall_back_to_default() {
        let records = records();
        let ctx = ArgContext::new("delay", &records);
        assert_eq!(ctx.resolve::<u64>(1, 1), 0);
        assert_eq!(ctx.resolve::<u64>(5, 0), 0);
        assert!(!ctx.resolve::<bool>(0, 3));
    }

    #[test]
    fn try_resolve_distinguishes_failures() {
        let records = records();
        let ctx = ArgContext::new("delay", &records);
        assert!(matches!(
            ctx.try_resolve::<u64>(2, 0),
            Err(EmuError::ArgumentUnavailable {
                call_index: 2,
                arg_index: 0,
                ..
            })
        ));
        assert!(matches!(
            ctx.try_resolve::<bool>(0, 0),
            Err(EmuError::TypeMismatch { found: "uint", .. })
        ));
    }
}
