//! Host-side collaborators invoked by the monitor: the warning overlay, the
//! forced power action and status observers.

use crate::clock::{Clock, SystemClock};
use crate::config::ActionsConfig;
use crate::error::AppError;
use crate::proximity::ProximityCheck;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

pub trait WarningOverlay: Send + Sync {
    fn show_warning(&self, message: &str);
}

pub trait PowerAction: Send + Sync {
    fn trigger_power_action(&self);
}

pub trait StatusObserver: Send + Sync {
    fn on_status_changed(&self, target: &str, remaining_ms: i64);
}

/// Spawn `argv` (plus an optional trailing argument) without waiting for it.
fn spawn_detached(argv: &[String], trailing: Option<&str>) -> std::io::Result<()> {
    let Some((program, args)) = argv.split_first() else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty command",
        ));
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Some(arg) = trailing {
        command.arg(arg);
    }

    let mut child = command.spawn()?;
    // Reap off-thread so the caller never blocks
    thread::spawn(move || {
        if let Err(e) = child.wait() {
            warn!("Failed waiting for action command: {e}");
        }
    });
    Ok(())
}

/// Shows warnings by running a desktop notifier with the message appended.
pub struct CommandOverlay {
    argv: Vec<String>,
}

impl CommandOverlay {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl WarningOverlay for CommandOverlay {
    fn show_warning(&self, message: &str) {
        info!("Showing warning: {}", message.replace('\n', " "));
        if let Err(e) = spawn_detached(&self.argv, Some(message)) {
            warn!("Error showing warning overlay ({:?}): {e}", self.argv);
        }
    }
}

pub struct LogOverlay;

impl WarningOverlay for LogOverlay {
    fn show_warning(&self, message: &str) {
        warn!("{}", message.replace('\n', " "));
    }
}

pub struct CommandPowerAction {
    argv: Vec<String>,
}

impl CommandPowerAction {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl PowerAction for CommandPowerAction {
    fn trigger_power_action(&self) {
        info!("Triggering power action {:?}", self.argv);
        if let Err(e) = spawn_detached(&self.argv, None) {
            warn!("Failed to trigger power action ({:?}): {e}", self.argv);
        }
    }
}

/// Only forwards the power action while the device is near home.
pub struct HomeGatedPowerAction {
    inner: Box<dyn PowerAction>,
    proximity: Arc<dyn ProximityCheck>,
}

impl HomeGatedPowerAction {
    pub fn new(inner: Box<dyn PowerAction>, proximity: Arc<dyn ProximityCheck>) -> Self {
        Self { inner, proximity }
    }
}

impl PowerAction for HomeGatedPowerAction {
    fn trigger_power_action(&self) {
        if self.proximity.is_near_home() {
            self.inner.trigger_power_action();
        } else {
            info!("Not near home, skipping power action");
        }
    }
}

/// The configured power action with no proximity gate, for explicit requests.
pub fn manual_power_action(actions: &ActionsConfig) -> Box<dyn PowerAction> {
    Box::new(CommandPowerAction::new(actions.power_command.clone()))
}

/// Build the overlay and power action described by the config.
pub fn from_config(
    actions: &ActionsConfig,
    proximity: &Arc<dyn ProximityCheck>,
) -> (Box<dyn WarningOverlay>, Box<dyn PowerAction>) {
    let overlay: Box<dyn WarningOverlay> = if actions.overlay_command.is_empty() {
        Box::new(LogOverlay)
    } else {
        Box::new(CommandOverlay::new(actions.overlay_command.clone()))
    };

    let power = manual_power_action(actions);
    let power: Box<dyn PowerAction> = if actions.power_requires_home {
        Box::new(HomeGatedPowerAction::new(power, Arc::clone(proximity)))
    } else {
        power
    };

    (overlay, power)
}

/// Last status reported by the monitor, as shown by `powerloop status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub target: String,
    pub remaining_ms: i64,
    pub updated_at_ms: i64,
}

impl StatusSnapshot {
    pub fn read(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Writes each status update to a JSON file for out-of-process readers.
pub struct StatusFile {
    path: PathBuf,
    clock: Box<dyn Clock>,
}

impl StatusFile {
    pub fn new(path: PathBuf) -> Self {
        Self::with_clock(path, Box::new(SystemClock))
    }

    pub fn with_clock(path: PathBuf, clock: Box<dyn Clock>) -> Self {
        Self { path, clock }
    }

    fn write(&self, snapshot: &StatusSnapshot) -> Result<(), AppError> {
        let json = serde_json::to_string(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StatusObserver for StatusFile {
    fn on_status_changed(&self, target: &str, remaining_ms: i64) {
        let snapshot = StatusSnapshot {
            target: target.to_string(),
            remaining_ms,
            updated_at_ms: self.clock.now_ms(),
        };
        if let Err(e) = self.write(&snapshot) {
            warn!("Failed to write status to {}: {e}", self.path.display());
        }
    }
}
