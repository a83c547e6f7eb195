//! Declarative TOML scenarios: return stages and exceptions loaded from disk.
//!
//! ```toml
//! wait_ms = 0
//!
//! [[returns]]
//! method = "read"
//! stages = [{ value = { int = 10 }, times = 3 }, { value = { int = 0 } }]
//!
//! [[exceptions]]
//! method = "connect"
//! code = -1
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{EmuError, Result};
use crate::engine::emulator::Emulator;
use crate::engine::exceptions::ExceptionEntry;
use crate::engine::value::Value;

/// One return stage: a value answering `times` calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    pub value: Value,
    #[serde(default = "default_times")]
    pub times: u32,
}

const fn default_times() -> u32 {
    1
}

/// Return configuration for one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSpec {
    pub method: String,
    #[serde(default)]
    pub delay_ms: u64,
    pub stages: Vec<StageSpec>,
}

/// A whole test setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Engine-wide wait before every invocation.
    pub wait_ms: u64,
    pub returns: Vec<ReturnSpec>,
    pub exceptions: Vec<ExceptionEntry>,
}

impl Scenario {
    /// Read, parse and validate a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EmuError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| EmuError::io(path, source))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(raw)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject entries the engine could not play back meaningfully.
    pub fn validate(&self) -> Result<()> {
        for spec in &self.returns {
            if spec.method.trim().is_empty() {
                return Err(EmuError::InvalidConfig {
                    details: "returns entry with an empty method name".to_string(),
                });
            }
            if spec.stages.is_empty() {
                return Err(EmuError::InvalidConfig {
                    details: format!("returns entry for {}() has no stages", spec.method),
                });
            }
        }
        if let Some(entry) = self.exceptions.iter().find(|e| e.method.trim().is_empty()) {
            return Err(EmuError::InvalidConfig {
                details: format!("exception {} configured for an empty method name", entry.code),
            });
        }
        Ok(())
    }

    /// Method names with return stages, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.returns.iter().map(|spec| spec.method.as_str())
    }
}

impl Emulator {
    /// Register every profile, exception and wait declared by `scenario`.
    ///
    /// Existing configuration is kept; a scenario adds to it.
    pub fn apply_scenario(&mut self, scenario: &Scenario) {
        for spec in &scenario.returns {
            let Some((first, rest)) = spec.stages.split_first() else {
                continue;
            };
            let mut handle = self
                .returns_after(
                    spec.method.clone(),
                    first.value.clone(),
                    Duration::from_millis(spec.delay_ms),
                )
                .times(first.times);
            for stage in rest {
                handle = handle.then(stage.value.clone()).times(stage.times);
            }
        }
        for entry in &scenario.exceptions {
            self.set_exception(entry.method.clone(), entry.code);
        }
        if scenario.wait_ms > 0 {
            self.waits(Duration::from_millis(scenario.wait_ms));
        }
    }
}
