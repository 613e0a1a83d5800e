pub mod actions;
pub mod clock;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod ledger;
pub mod monitor;
pub mod platform;
pub mod proximity;
pub mod service;
#[cfg(test)]
mod test_utils;
pub mod validation;

use crate::actions::StatusFile;
use crate::clock::{SystemClock, ThreadRandom};
use crate::config::MonitorConfig;
use crate::constants::{CONFIG_FILE, LEDGER_DB_FILE, STATUS_FILE};
use crate::db::Database;
use crate::error::AppError;
use crate::ledger::SqliteLedgerStore;
use crate::monitor::{Collaborators, UsageMonitor};
use crate::proximity::{HomeProximity, ProximityCheck};
use crate::service::{ForegroundWatcher, MonitorHandle, MonitorService};
use directories::ProjectDirs;
use log::{error, info, warn};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often the main thread checks for a shutdown request
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// On-disk locations for the ledger, status snapshot and config.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
}

impl AppPaths {
    /// Resolve platform directories, creating the data directory.
    pub fn resolve(data_dir_override: Option<PathBuf>) -> Result<Self, AppError> {
        let proj_dirs = ProjectDirs::from("com", "powerloop", "Powerloop");
        let config_file = proj_dirs
            .as_ref()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE));

        let data_dir = match data_dir_override {
            Some(dir) => dir,
            None => proj_dirs
                .as_ref()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or(AppError::NoProjectDirs)?,
        };
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            config_file: config_file.unwrap_or_else(|| data_dir.join(CONFIG_FILE)),
            data_dir,
        })
    }

    pub fn ledger_db(&self) -> PathBuf {
        self.data_dir.join(LEDGER_DB_FILE)
    }

    pub fn status_file(&self) -> PathBuf {
        self.data_dir.join(STATUS_FILE)
    }
}

/// Where foreground-app changes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForegroundInput {
    /// The OS window system
    Native,
    /// One app id per line on standard input
    Stdin,
}

pub fn open_ledger(path: &Path) -> Result<SqliteLedgerStore, AppError> {
    let db = Database::open_migrated(path)?;
    Ok(SqliteLedgerStore::new(db))
}

/// Wire the monitor to its production collaborators.
pub fn build_monitor(config: MonitorConfig, paths: &AppPaths) -> Result<UsageMonitor, AppError> {
    let store = open_ledger(&paths.ledger_db())?;
    if config.actions.power_requires_home && !config.location.is_configured() {
        warn!(
            "power_requires_home is set but no location file or fixed point is configured; \
             the power action will never run"
        );
    }
    let proximity: Arc<dyn ProximityCheck> =
        Arc::new(HomeProximity::from_config(&config.home, &config.location));
    let (overlay, power) = actions::from_config(&config.actions, &proximity);

    let deps = Collaborators {
        overlay,
        power,
        status: Box::new(StatusFile::new(paths.status_file())),
        proximity,
        clock: Box::new(SystemClock),
        random: Box::new(ThreadRandom),
    };
    Ok(UsageMonitor::new(config, Box::new(store), deps))
}

fn register_shutdown_flag() -> Result<Arc<AtomicBool>, AppError> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&flag))?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&flag))?;
    Ok(flag)
}

fn spawn_stdin_reader(handle: MonitorHandle, done: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read foreground event from stdin: {e}");
                    break;
                }
            };
            let app_id = line.trim();
            if app_id.is_empty() {
                continue;
            }
            if handle.notify(app_id).is_err() {
                break;
            }
        }
        done.store(true, Ordering::SeqCst);
    });
}

/// Monitor until SIGINT/SIGTERM (or end of stdin in stdin mode), then
/// persist the running session and return.
pub fn run(config: MonitorConfig, paths: &AppPaths, input: ForegroundInput) -> Result<(), AppError> {
    let shutdown = register_shutdown_flag()?;
    let poll_interval = Duration::from_millis(config.poll_interval_ms);

    let monitor = build_monitor(config, paths)?;
    let service = MonitorService::new();
    let handle = service.handle();
    let worker = service.start(monitor);

    let input_done = Arc::new(AtomicBool::new(false));
    let watcher = ForegroundWatcher::new(poll_interval);
    let watcher_thread = match input {
        ForegroundInput::Native => match platform::native_source() {
            Some(source) => Some(watcher.start(source, handle.clone())),
            None => {
                error!("No foreground source available on this system; use --stdin");
                input_done.store(true, Ordering::SeqCst);
                None
            }
        },
        ForegroundInput::Stdin => {
            spawn_stdin_reader(handle.clone(), Arc::clone(&input_done));
            None
        }
    };

    info!("Powerloop running (data in {})", paths.data_dir.display());
    while !shutdown.load(Ordering::SeqCst) && !input_done.load(Ordering::SeqCst) {
        thread::sleep(SHUTDOWN_POLL);
    }

    watcher.stop();
    if let Some(thread) = watcher_thread {
        if thread.join().is_err() {
            warn!("Foreground watcher thread panicked");
        }
    }
    // The worker may already be gone if it panicked
    let _ = handle.shutdown();
    worker.join().map_err(|_| AppError::ServiceStopped)?;
    info!("Powerloop stopped");
    Ok(())
}
