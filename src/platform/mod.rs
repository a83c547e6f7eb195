//! Hardware shims: typed device APIs answered by an inner [`Emulator`].
//!
//! Each shim owns one engine. Tests configure it through [`Emulated`], then
//! hand the shim to firmware logic that only sees the device API.

pub mod fs;
pub mod modem;
pub mod ssl;

use crate::core::errors::ExceptionCode;
use crate::engine::emulator::{Emulator, ProfileHandle};
use crate::engine::value::Value;
use crate::report::MethodReport;

/// Access to the engine behind a shim.
pub trait Emulated {
    fn emulator(&self) -> &Emulator;

    fn emulator_mut(&mut self) -> &mut Emulator;

    /// Configure the value `method` answers with.
    fn returns(&mut self, method: &str, value: impl Into<Value>) -> ProfileHandle<'_>
    where
        Self: Sized,
    {
        self.emulator_mut().returns(method, value)
    }

    fn set_exception(&mut self, method: &str, code: ExceptionCode) {
        self.emulator_mut().set_exception(method, code);
    }

    fn reset(&mut self) {
        self.emulator_mut().reset();
    }

    fn report(&self) -> MethodReport {
        self.emulator().report()
    }
}

/// Implements [`Emulated`] for a shim given the field path to its engine.
macro_rules! impl_emulated {
    ($shim:ty, $($field:ident).+) => {
        impl $crate::platform::Emulated for $shim {
            fn emulator(&self) -> &$crate::engine::emulator::Emulator {
                &self.$($field).+
            }

            fn emulator_mut(&mut self) -> &mut $crate::engine::emulator::Emulator {
                &mut self.$($field).+
            }
        }
    };
}

pub(crate) use impl_emulated;
