//! Ordered method-name → exception-code table.

use serde::{Deserialize, Serialize};

use crate::core::errors::ExceptionCode;

/// One configured failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionEntry {
    pub method: String,
    pub code: ExceptionCode,
}

/// Append-only list scanned front to back; the first matching entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionTable {
    entries: Vec<ExceptionEntry>,
}

impl ExceptionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, method: impl Into<String>, code: ExceptionCode) {
        self.entries.push(ExceptionEntry {
            method: method.into(),
            code,
        });
    }

    /// Code of the first entry registered for `method`.
    #[must_use]
    pub fn lookup(&self, method: &str) -> Option<ExceptionCode> {
        self.entries
            .iter()
            .find(|entry| entry.method == method)
            .map(|entry| entry.code)
    }

    #[must_use]
    pub fn entries(&self) -> &[ExceptionEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
