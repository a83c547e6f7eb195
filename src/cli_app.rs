//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use hw_emulator::core::config::Config;
use hw_emulator::core::errors::EmuError;
use hw_emulator::engine::emulator::Emulator;
use hw_emulator::report::MethodReport;
use hw_emulator::scenario::Scenario;
use hw_emulator::timing::sleeper::ThreadSleeper;

/// Hardware API emulator: inspect and replay behavior scenarios.
#[derive(Debug, Parser)]
#[command(
    name = "emu",
    author,
    version,
    about = "Hardware API emulator - scenario checker and replayer",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Validate a scenario file and print its method report.
    Check(CheckArgs),
    /// Play a method's configured outcomes from a scenario.
    Replay(ReplayArgs),
    /// View and validate configuration.
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Args)]
struct CheckArgs {
    /// Scenario TOML file.
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct ReplayArgs {
    /// Scenario TOML file.
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,
    /// Method to invoke.
    #[arg(value_name = "METHOD")]
    method: String,
    /// Number of invocations.
    #[arg(long, default_value_t = 1, value_name = "N")]
    calls: u32,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Validate configuration and print its hash.
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input (bad scenario, invalid config).
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

impl From<EmuError> for CliError {
    fn from(err: EmuError) -> Self {
        match err {
            EmuError::Io { .. } | EmuError::Serialization { .. } => Self::Runtime(err.to_string()),
            _ => Self::User(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Check(args) => run_check(cli, args),
        Command::Replay(args) => run_replay(cli, args),
        Command::Config(args) => run_config(cli, args),
    }
}

fn run_check(cli: &Cli, args: &CheckArgs) -> Result<(), CliError> {
    let scenario = Scenario::load(&args.scenario)?;
    let mut emu = Emulator::new().with_sleeper(ThreadSleeper::bypassed());
    emu.apply_scenario(&scenario);
    let report = emu.report();

    match output_mode(cli) {
        OutputMode::Human => {
            println!(
                "{} {} ({} methods, {} exceptions)",
                "valid".green().bold(),
                args.scenario.display(),
                scenario.returns.len(),
                scenario.exceptions.len()
            );
            print!("{}", report.render());
            for entry in &scenario.exceptions {
                println!("Exception: {}() raises {}", entry.method, entry.code);
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "check",
                "valid": true,
                "scenario": args.scenario.to_string_lossy(),
                "methods": report.summaries(),
                "exceptions": scenario.exceptions,
                "wait_ms": scenario.wait_ms,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_replay(cli: &Cli, args: &ReplayArgs) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let scenario = Scenario::load(&args.scenario)?;
    let mut emu = Emulator::from_config(&config);
    emu.apply_scenario(&scenario);

    let mode = output_mode(cli);
    for call in 1..=args.calls {
        let outcome = emu.invoke_value(&args.method);
        match mode {
            OutputMode::Human => match &outcome {
                Ok(value) => println!("call {call}: {value}"),
                Err(err) => println!("call {call}: {}", err.to_string().red()),
            },
            OutputMode::Json => {
                let payload = match &outcome {
                    Ok(value) => json!({
                        "command": "replay",
                        "method": args.method,
                        "call": call,
                        "value": serde_json::to_value(value)?,
                        "display": value.to_string(),
                    }),
                    Err(err) => json!({
                        "command": "replay",
                        "method": args.method,
                        "call": call,
                        "error_code": err.code(),
                        "exception": err.exception_code(),
                        "error": err.to_string(),
                    }),
                };
                write_json_line(&payload)?;
            }
        }
    }
    emu.flush_log();

    let report = emu.report();
    let written = if config.report.enabled {
        let path = config.report.path_in(&config.paths.report_dir);
        report.write_to(&path)?;
        Some(path)
    } else {
        None
    };
    emit_report(mode, &report, written)
}

fn emit_report(mode: OutputMode, report: &MethodReport, written: Option<PathBuf>) -> Result<(), CliError> {
    match mode {
        OutputMode::Human => {
            print!("{}", report.render());
            if let Some(path) = written {
                println!("Report written to {}", path.display());
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "replay",
                "report": report.summaries(),
                "report_path": written.map(|p| p.to_string_lossy().into_owned()),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        ConfigCommand::Validate => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config
                    .stable_hash()
                    .map_err(|e| CliError::Runtime(e.to_string()))?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("Configuration is INVALID: {e}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("EMU_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
