//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use hw_emulator::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{EmuError, ExceptionCode, Result};

// Engine
pub use crate::engine::emulator::{Condition, Emulator, ProfileHandle};
pub use crate::engine::shared::SharedEmulator;
pub use crate::engine::value::{FromValue, Value};

// Logging
pub use crate::logger::jsonl::{JsonlConfig, JsonlSink};
pub use crate::logger::sink::{LogSink, MemorySink, NullSink};

// Shims
pub use crate::platform::Emulated;
pub use crate::platform::fs::{MockFile, MockFs, MockSpiffs, OpenMode, SeekMode};
pub use crate::platform::modem::{MockModem, RegStatus};
pub use crate::platform::ssl::MockSslClient;

// Recorder and time
pub use crate::recorder::function::FunctionEmulator;
pub use crate::report::MethodReport;
pub use crate::scenario::Scenario;
pub use crate::timing::clock::MillisEmulator;
pub use crate::timing::delay::DelayEmulator;
pub use crate::timing::sleeper::{RecordingSleeper, Sleeper, ThreadSleeper};

pub use crate::{args, opaque_value};
