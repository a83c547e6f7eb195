//! Behavior engine: values, profiles, exceptions and playback.

pub mod emulator;
pub mod exceptions;
pub mod profile;
pub mod shared;
pub mod value;
