//! Configuration system: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{EmuError, Result};

/// Full emulation configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub timing: TimingConfig,
    pub logging: LoggingConfig,
    pub report: ReportConfig,
    pub paths: PathsConfig,
}

/// Knobs for the monotonic clock and delay stubs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Value the emulated millisecond counter starts from.
    pub millis_start: u64,
    /// Amount added to the emulated millisecond counter on every read.
    pub millis_increment: u64,
    /// Multiplier applied to every real blocking wait.
    pub delay_scale: f64,
    /// Skip real blocking waits entirely (calls are still recorded).
    pub bypass_delays: bool,
}

/// Structured log sink selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write engine events to `paths.jsonl_log`.
    pub enabled: bool,
    /// Mirror every entry to stderr.
    pub echo_stderr: bool,
}

/// Method report output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    pub enabled: bool,
    /// Base file name; the report is written to `<report_dir>/<name>.log`.
    pub name: String,
}

/// Filesystem paths used by the emulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub jsonl_log: PathBuf,
    pub report_dir: PathBuf,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            millis_start: 0,
            millis_increment: 100,
            delay_scale: 1.0,
            bypass_delays: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: "method".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("emulation.toml"),
            jsonl_log: PathBuf::from("emulation.jsonl"),
            report_dir: PathBuf::from("."),
        }
    }
}

impl ReportConfig {
    /// Full report path under `dir`.
    #[must_use]
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.log", self.name))
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| EmuError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(EmuError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config, FNV-1a over canonical JSON.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // timing
        if let Some(raw) = lookup("EMU_TIMING_MILLIS_START") {
            self.timing.millis_start = parse_env_u64("EMU_TIMING_MILLIS_START", &raw)?;
        }
        if let Some(raw) = lookup("EMU_TIMING_MILLIS_INCREMENT") {
            self.timing.millis_increment = parse_env_u64("EMU_TIMING_MILLIS_INCREMENT", &raw)?;
        }
        if let Some(raw) = lookup("EMU_TIMING_DELAY_SCALE") {
            self.timing.delay_scale = parse_env_f64("EMU_TIMING_DELAY_SCALE", &raw)?;
        }
        if let Some(raw) = lookup("EMU_TIMING_BYPASS_DELAYS") {
            self.timing.bypass_delays = parse_env_bool("EMU_TIMING_BYPASS_DELAYS", &raw)?;
        }

        // logging
        if let Some(raw) = lookup("EMU_LOGGING_ENABLED") {
            self.logging.enabled = parse_env_bool("EMU_LOGGING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("EMU_LOGGING_ECHO_STDERR") {
            self.logging.echo_stderr = parse_env_bool("EMU_LOGGING_ECHO_STDERR", &raw)?;
        }

        // report
        if let Some(raw) = lookup("EMU_REPORT_ENABLED") {
            self.report.enabled = parse_env_bool("EMU_REPORT_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("EMU_REPORT_NAME") {
            self.report.name = raw;
        }

        // paths
        if let Some(raw) = lookup("EMU_PATHS_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("EMU_PATHS_REPORT_DIR") {
            self.paths.report_dir = PathBuf::from(raw);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.timing.millis_increment == 0 {
            return Err(EmuError::InvalidConfig {
                details: "timing.millis_increment must be > 0".to_string(),
            });
        }
        if !self.timing.delay_scale.is_finite() || self.timing.delay_scale < 0.0 {
            return Err(EmuError::InvalidConfig {
                details: format!(
                    "timing.delay_scale must be a finite value >= 0, got {}",
                    self.timing.delay_scale
                ),
            });
        }
        if self.logging.enabled && self.paths.jsonl_log.as_os_str().is_empty() {
            return Err(EmuError::InvalidConfig {
                details: "logging.enabled requires paths.jsonl_log".to_string(),
            });
        }
        if self.report.name.trim().is_empty() {
            return Err(EmuError::InvalidConfig {
                details: "report.name must not be empty".to_string(),
            });
        }
        if self.report.name.contains(['/', '\\']) {
            return Err(EmuError::InvalidConfig {
                details: format!(
                    "report.name must be a bare file name, got {:?}",
                    self.report.name
                ),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>().map_err(|error| EmuError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_f64(name: &str, raw: &str) -> Result<f64> {
    raw.parse::<f64>().map_err(|error| EmuError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.parse::<bool>().map_err(|error| EmuError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
