//! Per-method invocation report, written after a test run.
//!
//! One line per profile:
//!
//! ```text
//! Method: read() [invoked 4 times] with 2 return values
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::{EmuError, Result};
use crate::engine::profile::{MethodProfile, ProfileSummary};

/// Snapshot of every profile's invocation count and remaining stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodReport {
    summaries: Vec<ProfileSummary>,
}

impl MethodReport {
    #[must_use]
    pub fn from_profiles(profiles: &[MethodProfile]) -> Self {
        Self {
            summaries: profiles.iter().map(ProfileSummary::from).collect(),
        }
    }

    #[must_use]
    pub fn summaries(&self) -> &[ProfileSummary] {
        &self.summaries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// The report text, one newline-terminated line per method.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the rendered report to `path`, replacing any previous contents.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| EmuError::io(parent, source))?;
        }
        fs::write(path, self.render()).map_err(|source| EmuError::io(path, source))
    }

    /// Write to `<dir>/<name>.log` and return the path written.
    pub fn write_named(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{name}.log"));
        self.write_to(&path)?;
        Ok(path)
    }

    /// One JSON object per method, newline-separated.
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for summary in &self.summaries {
            out.push_str(&serde_json::to_string(summary)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl fmt::Display for MethodReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for summary in &self.summaries {
            writeln!(f, "{}", ReportLine(summary))?;
        }
        Ok(())
    }
}

struct ReportLine<'a>(&'a ProfileSummary);

impl fmt::Display for ReportLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        let time = if summary.invoked == 1 { "time" } else { "times" };
        let value = if summary.return_values == 1 { "value" } else { "values" };
        write!(
            f,
            "Method: {}() [invoked {} {time}] with {} return {value}",
            summary.method, summary.invoked, summary.return_values
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::emulator::Emulator;

    fn exercised() -> Emulator {
        let mut emu = Emulator::new();
        let _ = emu.returns("read", 10).times(3).then(0);
        let _ = emu.returns("available", 1);
        let _ = emu.returns("peek", 0);
        for _ in 0..4 {
            emu.invoke::<i32>("read").unwrap();
        }
        emu.invoke::<i32>("available").unwrap();
        emu
    }

    #[test]
    fn render_pluralizes_counts() {
        let report = exercised().report();
        assert_eq!(
            report.render(),
            "Method: read() [invoked 4 times] with 1 return value\n\
             Method: available() [invoked 1 time] with 1 return value\n\
             Method: peek() [invoked 0 times] with 1 return value\n"
        );
    }

    #[test]
    fn unplayed_stages_count_as_values() {
        let mut emu = Emulator::new();
        let _ = emu.returns("write", 1).then(2).then(3);
        assert_eq!(
            emu.report().render(),
            "Method: write() [invoked 0 times] with 3 return values\n"
        );
    }

    #[test]
    fn write_named_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = exercised()
            .report()
            .write_named(&dir.path().join("reports"), "modem")
            .unwrap();
        assert!(path.ends_with("reports/modem.log"));
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn json_lines_carry_summaries() {
        let json = exercised().report().to_json_lines().unwrap();
        let first: serde_json::Value = serde_json::from_str(json.lines().next().unwrap()).unwrap();
        assert_eq!(first["method"], "read");
        assert_eq!(first["invoked"], 4);
        assert_eq!(first["return_values"], 1);
    }

    #[test]
    fn empty_report_renders_nothing() {
        let report = MethodReport::default();
        assert!(report.is_empty());
        assert_eq!(report.render(), "");
    }
}
