//! EMU-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, EmuError>;

/// Numeric failure code a test configures for a mocked method.
pub type ExceptionCode = i32;

/// Top-level error type for the emulation engine.
#[derive(Debug, Error)]
pub enum EmuError {
    #[error("[EMU-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[EMU-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[EMU-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error(
        "[EMU-2001] {location}: could not find a return value for {method}(), .returns() must be called for this method"
    )]
    NoReturnValue { method: String, location: String },

    #[error(
        "[EMU-2002] return value for {method}() found, casting to {expected} failed (stored {found})"
    )]
    TypeMismatch {
        method: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("[EMU-2003] {method}() raised configured exception {code}")]
    Raised { method: String, code: ExceptionCode },

    #[error("[EMU-2101] no captured argument {arg_index} for call {call_index} of {function}()")]
    ArgumentUnavailable {
        function: String,
        call_index: usize,
        arg_index: usize,
    },

    #[error("[EMU-3001] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[EMU-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EmuError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "EMU-1001",
            Self::MissingConfig { .. } => "EMU-1002",
            Self::ConfigParse { .. } => "EMU-1003",
            Self::NoReturnValue { .. } => "EMU-2001",
            Self::TypeMismatch { .. } => "EMU-2002",
            Self::Raised { .. } => "EMU-2003",
            Self::ArgumentUnavailable { .. } => "EMU-2101",
            Self::Serialization { .. } => "EMU-3001",
            Self::Io { .. } => "EMU-3002",
        }
    }

    /// Whether a caller may substitute a default value and keep going.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. } | Self::ArgumentUnavailable { .. }
        )
    }

    /// The configured exception code, when this error is a configured exception.
    #[must_use]
    pub const fn exception_code(&self) -> Option<ExceptionCode> {
        match self {
            Self::Raised { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for EmuError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for EmuError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<EmuError> {
        vec![
            EmuError::InvalidConfig {
                details: String::new(),
            },
            EmuError::MissingConfig {
                path: PathBuf::new(),
            },
            EmuError::ConfigParse {
                context: "",
                details: String::new(),
            },
            EmuError::NoReturnValue {
                method: String::new(),
                location: String::new(),
            },
            EmuError::TypeMismatch {
                method: String::new(),
                expected: "",
                found: "",
            },
            EmuError::Raised {
                method: String::new(),
                code: 0,
            },
            EmuError::ArgumentUnavailable {
                function: String::new(),
                call_index: 0,
                arg_index: 0,
            },
            EmuError::Serialization {
                context: "",
                details: String::new(),
            },
            EmuError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = all_variants();
        let codes: Vec<&str> = errors.iter().map(EmuError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn error_codes_have_emu_prefix() {
        for err in &all_variants() {
            assert!(
                err.code().starts_with("EMU-"),
                "code {} must start with EMU-",
                err.code()
            );
        }
    }

    #[test]
    fn no_return_value_display_names_method_and_location() {
        let err = EmuError::NoReturnValue {
            method: "read".to_string(),
            location: "src/fs.rs:42".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("EMU-2001"), "missing code: {msg}");
        assert!(msg.contains("read()"), "missing method: {msg}");
        assert!(msg.contains("src/fs.rs:42"), "missing location: {msg}");
    }

    #[test]
    fn only_mismatches_are_recoverable() {
        assert!(
            EmuError::TypeMismatch {
                method: "read".to_string(),
                expected: "bool",
                found: "int",
            }
            .is_recoverable()
        );
        assert!(
            !EmuError::NoReturnValue {
                method: "read".to_string(),
                location: String::new(),
            }
            .is_recoverable()
        );
        assert!(
            !EmuError::Raised {
                method: "read".to_string(),
                code: 3,
            }
            .is_recoverable()
        );
    }

    #[test]
    fn exception_code_only_for_raised() {
        let raised = EmuError::Raised {
            method: "connect".to_string(),
            code: -7,
        };
        assert_eq!(raised.exception_code(), Some(-7));
        assert_eq!(
            EmuError::InvalidConfig {
                details: String::new()
            }
            .exception_code(),
            None
        );
    }

    #[test]
    fn io_convenience_constructor() {
        let err = EmuError::io(
            "/tmp/method.log",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "EMU-3002");
        assert!(err.to_string().contains("/tmp/method.log"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: EmuError = json_err.into();
        assert_eq!(err.code(), "EMU-3001");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: EmuError = toml_err.into();
        assert_eq!(err.code(), "EMU-1003");
    }
}
