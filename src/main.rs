use clap::{Parser, Subcommand};
use log::error;
use powerloop_lib::{
    actions::{self, StatusSnapshot},
    config::MonitorConfig,
    error::AppError,
    ledger::LedgerStore,
    AppPaths, ForegroundInput,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Watches target apps and escalates from nudges to a forced lock
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// config file (defaults to the platform config dir)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// directory for the usage ledger and status snapshot
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// monitor the foreground app (default)
    Run {
        /// read app ids from stdin, one per line, instead of the window system
        #[clap(long)]
        stdin: bool,
    },
    /// print the last reported status and persisted usage
    Status,
    /// print the effective configuration as TOML
    ShowConfig,
    /// run the configured power action once
    TriggerPower,
}

#[allow(clippy::print_stdout, reason = "status is the command's output")]
fn print_status(paths: &AppPaths, config: &MonitorConfig) -> Result<(), AppError> {
    let ledger = powerloop_lib::open_ledger(&paths.ledger_db())?.load()?;

    match StatusSnapshot::read(&paths.status_file()) {
        Ok(snapshot) => {
            println!("Monitoring: {}", snapshot.target);
            println!("Remaining: {}s", snapshot.remaining_ms / 1000);
        }
        Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("Monitoring: not running");
            println!("Remaining: --");
        }
        Err(e) => return Err(e),
    }
    println!("Accumulated: {}s", ledger.accumulated_usage_ms / 1000);
    println!(
        "Settings: Warn {}s / Loop {}s / Reset after {}s idle",
        config.warning_threshold_ms / 1000,
        config.loop_threshold_ms / 1000,
        config.idle_reset_window_ms / 1000
    );
    Ok(())
}

#[allow(clippy::print_stdout, reason = "the config dump is the command's output")]
fn print_config(config: &MonitorConfig) -> Result<(), AppError> {
    print!("{}", config.to_toml()?);
    Ok(())
}

fn trigger_power(config: &MonitorConfig) {
    actions::manual_power_action(&config.actions).trigger_power_action();
}

fn dispatch(cli: Cli) -> Result<(), AppError> {
    let paths = AppPaths::resolve(cli.data_dir)?;
    let config = MonitorConfig::resolve(cli.config.as_deref(), Some(&paths.config_file))?;

    match cli.command.unwrap_or(Command::Run { stdin: false }) {
        Command::Run { stdin } => {
            let input = if stdin {
                ForegroundInput::Stdin
            } else {
                ForegroundInput::Native
            };
            powerloop_lib::run(config, &paths, input)
        }
        Command::Status => print_status(&paths, &config),
        Command::ShowConfig => print_config(&config),
        Command::TriggerPower => {
            trigger_power(&config);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match dispatch(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
