//! Thread-safe handle over one [`Emulator`], shared by every mock in a test.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::core::errors::{ExceptionCode, Result};
use crate::engine::emulator::Emulator;
use crate::engine::value::FromValue;

/// Cloneable handle; clones drive the same engine.
#[derive(Clone, Default)]
pub struct SharedEmulator {
    inner: Arc<Mutex<Emulator>>,
}

impl fmt::Debug for SharedEmulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(emu) => f.debug_tuple("SharedEmulator").field(&*emu).finish(),
            None => f.write_str("SharedEmulator(<locked>)"),
        }
    }
}

impl From<Emulator> for SharedEmulator {
    fn from(emulator: Emulator) -> Self {
        Self::new(emulator)
    }
}

impl SharedEmulator {
    #[must_use]
    pub fn new(emulator: Emulator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(emulator)),
        }
    }

    /// Exclusive access for multi-step configuration or inspection.
    pub fn lock(&self) -> MutexGuard<'_, Emulator> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access and return its result.
    pub fn configure<R>(&self, f: impl FnOnce(&mut Emulator) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// See [`Emulator::invoke`].
    #[track_caller]
    pub fn invoke<T: FromValue>(&self, method: &str) -> Result<T> {
        self.inner.lock().invoke(method)
    }

    /// See [`Emulator::invoke_or_default`].
    #[track_caller]
    pub fn invoke_or_default<T: FromValue + Default>(&self, method: &str) -> Result<T> {
        self.inner.lock().invoke_or_default(method)
    }

    pub fn set_exception(&self, method: impl Into<String>, code: ExceptionCode) {
        self.inner.lock().set_exception(method, code);
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Whether two handles drive the same engine.
    #[must_use]
    pub fn same_engine(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
