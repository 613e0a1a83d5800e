// src/constants.rs

/// YouTube Android package id
pub const PACKAGE_YOUTUBE: &str = "com.google.android.youtube";

/// X (Twitter) Android package id
pub const PACKAGE_X: &str = "com.twitter.android";

/// The monitor's own application id; its overlay must not end a session
pub const SELF_APP_ID: &str = "com.example.powermenuloop";

/// System surfaces that appear on top of the target app without leaving it
pub const DEFAULT_TRANSPARENT_APPS: &[&str] = &["com.android.systemui"];

/// Lower bound of the randomized initial nudge window (5 seconds)
pub const INITIAL_WARNING_START_MS: i64 = 5 * 1000;

/// Upper bound of the randomized initial nudge window (10 seconds)
pub const INITIAL_WARNING_END_MS: i64 = 10 * 1000;

/// Accumulated usage that starts the recurring warning band (5 minutes)
pub const WARNING_THRESHOLD_MS: i64 = 5 * 60 * 1000;

/// Accumulated usage that triggers the forced power action (10 minutes)
pub const LOOP_THRESHOLD_MS: i64 = 10 * 60 * 1000;

/// Gap after which accumulated usage is forgotten (30 minutes)
pub const TIMER_MAINTAIN_DURATION_MS: i64 = 30 * 60 * 1000;

/// Threshold evaluation cadence
pub const TICK_INTERVAL_MS: u64 = 1000;

/// Foreground watcher polling cadence
pub const POLL_INTERVAL_MS: u64 = 500;

pub const HOME_LATITUDE: f64 = 35.793_789_25;
pub const HOME_LONGITUDE: f64 = 139.969_755_16;

/// Distance from home (meters) that still counts as "near home"
pub const RADIUS_METERS: f64 = 100.0;

/// Mean Earth radius in meters (IUGG)
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

pub const INITIAL_NUDGE_MESSAGE: &str =
    "Build something, play a game, or go outside.\nHow about doing something?";

pub const LONG_USAGE_MESSAGE: &str =
    "You have been using this for a long time.\nTime to take a break.";

/// Target label reported to status observers while nothing is monitored
pub const IDLE_TARGET_LABEL: &str = "none";

/// Persistence namespace and keys for the usage ledger
pub const LEDGER_NAMESPACE: &str = "usage_monitor";
pub const KEY_ACCUMULATED_USAGE: &str = "accumulated_usage";
pub const KEY_LAST_SESSION_END: &str = "last_session_end";

pub const DEFAULT_OVERLAY_COMMAND: &[&str] = &["notify-send", "Powerloop"];
pub const DEFAULT_POWER_COMMAND: &[&str] = &["loginctl", "lock-session"];

pub const LEDGER_DB_FILE: &str = "ledger.db";
pub const STATUS_FILE: &str = "status.json";
pub const CONFIG_FILE: &str = "config.toml";
