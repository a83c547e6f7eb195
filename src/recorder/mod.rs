//! Call recording for free-function stubs.

pub mod args;
pub mod function;
