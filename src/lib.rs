#![forbid(unsafe_code)]

//! Hardware API emulation for host-side firmware tests.
//!
//! Firmware logic that talks to files, TLS sockets, modems and clocks is
//! compiled against shims whose every call is answered by a behavior engine:
//!
//! 1. **Behavior engine**: per-method return stages with repeat counts,
//!    configured exceptions that preempt them, and deterministic playback
//! 2. **Call recorder**: captured arguments and call counts for free functions
//! 3. **Time emulation**: a monotonic clock stub and a recorded delay stub
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust
//! use hw_emulator::prelude::*;
//!
//! let mut modem = MockModem::default();
//! let _ = modem.returns("getSignalQuality", 12_i16).times(2).then(99_i16);
//! assert_eq!(modem.signal_quality().unwrap(), 12);
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use hw_emulator::core::config::Config;
//! use hw_emulator::engine::emulator::Emulator;
//! ```

pub mod prelude;

pub mod core;
pub mod engine;
pub mod logger;
pub mod platform;
pub mod recorder;
pub mod report;
pub mod scenario;
pub mod timing;
