//! Time emulation: clock and delay stubs over an injectable sleeper.

pub mod clock;
pub mod delay;
pub mod sleeper;
