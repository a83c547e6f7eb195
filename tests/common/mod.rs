use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// Outcome of one `emu` invocation plus the transcript left on disk for it.
pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_with_env(case_name, args, &[])
}

/// Run `emu` with real delays bypassed and `env` applied on top, then keep a
/// transcript under `<tmp>/emu-test-logs/` so failing assertions can point
/// at it.
pub fn run_cli_case_with_env(case_name: &str, args: &[&str], env: &[(&str, &str)]) -> CmdResult {
    let output = Command::new(env!("CARGO_BIN_EXE_emu"))
        .args(args)
        .env("EMU_TIMING_BYPASS_DELAYS", "true")
        .envs(env.iter().copied())
        .output()
        .expect("execute emu");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let log_path = write_transcript(case_name, args, env, output.status, &stdout, &stderr);

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

fn write_transcript(
    case_name: &str,
    args: &[&str],
    env: &[(&str, &str)],
    status: ExitStatus,
    stdout: &str,
    stderr: &str,
) -> PathBuf {
    let dir = std::env::temp_dir().join("emu-test-logs");
    fs::create_dir_all(&dir).expect("create transcript dir");

    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f");
    let file_name: String = case_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let path = dir.join(format!("{file_name}-{stamp}.log"));

    let mut transcript = String::new();
    let _ = writeln!(transcript, "$ emu {}", args.join(" "));
    for (key, value) in env {
        let _ = writeln!(transcript, "env {key}={value}");
    }
    let _ = writeln!(transcript, "exit {status}");
    let _ = writeln!(transcript, "--- stdout ---\n{stdout}");
    let _ = writeln!(transcript, "--- stderr ---\n{stderr}");
    fs::write(&path, transcript).expect("write transcript");
    path
}
