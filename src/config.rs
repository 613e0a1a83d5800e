use crate::constants::{
    DEFAULT_OVERLAY_COMMAND, DEFAULT_POWER_COMMAND, DEFAULT_TRANSPARENT_APPS, HOME_LATITUDE,
    HOME_LONGITUDE, INITIAL_NUDGE_MESSAGE, INITIAL_WARNING_END_MS, INITIAL_WARNING_START_MS,
    LONG_USAGE_MESSAGE, LOOP_THRESHOLD_MS, PACKAGE_X, PACKAGE_YOUTUBE, POLL_INTERVAL_MS,
    RADIUS_METERS, SELF_APP_ID, TICK_INTERVAL_MS, TIMER_MAINTAIN_DURATION_MS, WARNING_THRESHOLD_MS,
};
use crate::error::AppError;
use crate::proximity::GeoPoint;
use crate::validation;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Process-wide monitor configuration, read once at startup.
///
/// Every field has a default, so a config file only needs the values it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// App ids whose foreground time is accumulated
    pub targets: Vec<String>,
    /// This program's own app id (its overlay never ends a session)
    pub self_app_id: String,
    /// System surfaces that do not count as leaving the target app
    pub transparent_apps: Vec<String>,
    pub warning_threshold_ms: i64,
    pub loop_threshold_ms: i64,
    pub idle_reset_window_ms: i64,
    pub initial_warn_min_ms: i64,
    pub initial_warn_max_ms: i64,
    pub tick_interval_ms: u64,
    pub poll_interval_ms: u64,
    pub home: HomeConfig,
    pub location: LocationConfig,
    pub messages: Messages,
    pub actions: ActionsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// JSON file holding the last known position, rewritten by a locator
    pub file: Option<PathBuf>,
    /// Fixed position, used when no file is configured
    pub fixed: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub initial_nudge: String,
    pub long_usage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Program and leading args; the warning text is appended last
    pub overlay_command: Vec<String>,
    pub power_command: Vec<String>,
    /// Re-check home proximity right before the power action runs
    pub power_requires_home: bool,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            targets: owned(&[PACKAGE_YOUTUBE, PACKAGE_X]),
            self_app_id: SELF_APP_ID.to_string(),
            transparent_apps: owned(DEFAULT_TRANSPARENT_APPS),
            warning_threshold_ms: WARNING_THRESHOLD_MS,
            loop_threshold_ms: LOOP_THRESHOLD_MS,
            idle_reset_window_ms: TIMER_MAINTAIN_DURATION_MS,
            initial_warn_min_ms: INITIAL_WARNING_START_MS,
            initial_warn_max_ms: INITIAL_WARNING_END_MS,
            tick_interval_ms: TICK_INTERVAL_MS,
            poll_interval_ms: POLL_INTERVAL_MS,
            home: HomeConfig::default(),
            location: LocationConfig::default(),
            messages: Messages::default(),
            actions: ActionsConfig::default(),
        }
    }
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            latitude: HOME_LATITUDE,
            longitude: HOME_LONGITUDE,
            radius_m: RADIUS_METERS,
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            initial_nudge: INITIAL_NUDGE_MESSAGE.to_string(),
            long_usage: LONG_USAGE_MESSAGE.to_string(),
        }
    }
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            overlay_command: owned(DEFAULT_OVERLAY_COMMAND),
            power_command: owned(DEFAULT_POWER_COMMAND),
            power_requires_home: true,
        }
    }
}

impl LocationConfig {
    pub fn is_configured(&self) -> bool {
        self.file.is_some() || self.fixed.is_some()
    }
}

impl MonitorConfig {
    /// Parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else `fallback` when it exists, else defaults.
    pub fn resolve(explicit: Option<&Path>, fallback: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            return Self::load(path);
        }
        match fallback {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::load(path)
            }
            Some(_) | None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_targets(&self.targets)?;
        validation::validate_thresholds(
            self.warning_threshold_ms,
            self.loop_threshold_ms,
            self.idle_reset_window_ms,
        )?;
        validation::validate_initial_warn_range(
            self.initial_warn_min_ms,
            self.initial_warn_max_ms,
            self.warning_threshold_ms,
        )?;
        validation::validate_interval("tick_interval_ms", self.tick_interval_ms)?;
        validation::validate_interval("poll_interval_ms", self.poll_interval_ms)?;
        validation::validate_home(self.home.latitude, self.home.longitude, self.home.radius_m)?;
        if let Some(point) = self.location.fixed {
            validation::validate_coordinates(point.latitude, point.longitude)?;
        }
        Ok(())
    }

    pub fn is_target(&self, app_id: &str) -> bool {
        self.targets.iter().any(|t| t == app_id)
    }

    /// The monitor itself or a system surface layered over the target app.
    pub fn is_transparent(&self, app_id: &str) -> bool {
        app_id == self.self_app_id || self.transparent_apps.iter().any(|t| t == app_id)
    }

    pub fn to_toml(&self) -> Result<String, AppError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_is_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.loop_threshold_ms, 10 * 60 * 1000);
        assert!(config.is_target(PACKAGE_YOUTUBE));
        assert!(config.is_target(PACKAGE_X));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
            targets = ["org.mozilla.firefox"]
            warning_threshold_ms = 5000
            loop_threshold_ms = 10000
            initial_warn_min_ms = 1000
            initial_warn_max_ms = 2000

            [home]
            radius_m = 250.0
            "#,
        );

        let config = MonitorConfig::load(file.path()).unwrap();
        assert_eq!(config.targets, vec!["org.mozilla.firefox".to_string()]);
        assert_eq!(config.warning_threshold_ms, 5000);
        assert_eq!(config.idle_reset_window_ms, TIMER_MAINTAIN_DURATION_MS);
        assert!((config.home.radius_m - 250.0).abs() < f64::EPSILON);
        assert!((config.home.latitude - HOME_LATITUDE).abs() < f64::EPSILON);
        assert_eq!(config.messages, Messages::default());
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let file = write_config("targets = [");
        let err = MonitorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_rejects_inverted_thresholds() {
        let file = write_config("warning_threshold_ms = 20000\nloop_threshold_ms = 10000\n");
        let err = MonitorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "warning_threshold_ms", .. }));
    }

    #[test]
    fn test_load_rejects_window_overlapping_warning() {
        let file = write_config("warning_threshold_ms = 8000\nloop_threshold_ms = 20000\n");
        let err = MonitorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "initial_warn_max_ms", .. }));
    }

    #[test]
    fn test_location_configured() {
        let mut location = LocationConfig::default();
        assert!(!location.is_configured());
        location.fixed = Some(GeoPoint { latitude: 0.0, longitude: 0.0 });
        assert!(location.is_configured());
        let location = LocationConfig {
            file: Some(PathBuf::from("/tmp/location.json")),
            fixed: None,
        };
        assert!(location.is_configured());
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.toml");
        let config = MonitorConfig::resolve(None, Some(&missing)).unwrap();
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let file = write_config("self_app_id = \"powerloop\"\n");
        let config = MonitorConfig::resolve(Some(file.path()), None).unwrap();
        assert_eq!(config.self_app_id, "powerloop");
    }

    #[test]
    fn test_transparent_includes_self() {
        let config = MonitorConfig::default();
        assert!(config.is_transparent(SELF_APP_ID));
        assert!(config.is_transparent("com.android.systemui"));
        assert!(!config.is_transparent(PACKAGE_YOUTUBE));
    }

    #[test]
    fn test_toml_round_trip_preserves_values() {
        let mut config = MonitorConfig::default();
        config.location.fixed = Some(GeoPoint { latitude: 1.5, longitude: 2.5 });
        let text = config.to_toml().unwrap();
        let parsed: MonitorConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
