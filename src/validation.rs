use crate::constants::IDLE_TARGET_LABEL;
use crate::error::AppError;

/// Validate the monitored target list.
pub fn validate_targets(targets: &[String]) -> Result<(), AppError> {
    if targets.is_empty() {
        return Err(AppError::InvalidInput {
            field: "targets",
            reason: "at least one target app required".into(),
        });
    }
    if targets.iter().any(|t| t == IDLE_TARGET_LABEL) {
        return Err(AppError::InvalidInput {
            field: "targets",
            reason: format!("'{IDLE_TARGET_LABEL}' is reserved for no foreground app"),
        });
    }
    if let Some(blank) = targets.iter().find(|t| t.trim().is_empty()) {
        return Err(AppError::InvalidInput {
            field: "targets",
            reason: format!("invalid app id: '{blank}'"),
        });
    }
    Ok(())
}

/// Validate the warning, loop and idle-reset thresholds (milliseconds).
pub fn validate_thresholds(warning_ms: i64, loop_ms: i64, idle_reset_ms: i64) -> Result<(), AppError> {
    if warning_ms <= 0 {
        return Err(AppError::InvalidInput {
            field: "warning_threshold_ms",
            reason: "must be positive".into(),
        });
    }
    if loop_ms <= 0 {
        return Err(AppError::InvalidInput {
            field: "loop_threshold_ms",
            reason: "must be positive".into(),
        });
    }
    if warning_ms >= loop_ms {
        return Err(AppError::InvalidInput {
            field: "warning_threshold_ms",
            reason: format!("must be below loop_threshold_ms ({loop_ms})"),
        });
    }
    if idle_reset_ms < 0 {
        return Err(AppError::InvalidInput {
            field: "idle_reset_window_ms",
            reason: "cannot be negative".into(),
        });
    }
    Ok(())
}

/// Validate the initial nudge random range. The window must end before the
/// warning threshold so the bands never overlap.
pub fn validate_initial_warn_range(min_ms: i64, max_ms: i64, warning_ms: i64) -> Result<(), AppError> {
    if min_ms < 0 {
        return Err(AppError::InvalidInput {
            field: "initial_warn_min_ms",
            reason: "cannot be negative".into(),
        });
    }
    if min_ms > max_ms {
        return Err(AppError::InvalidInput {
            field: "initial_warn_max_ms",
            reason: format!("must be at least initial_warn_min_ms ({min_ms})"),
        });
    }
    if max_ms >= warning_ms {
        return Err(AppError::InvalidInput {
            field: "initial_warn_max_ms",
            reason: format!("must be below warning_threshold_ms ({warning_ms})"),
        });
    }
    Ok(())
}

pub fn validate_interval(field: &'static str, interval_ms: u64) -> Result<(), AppError> {
    if interval_ms == 0 {
        return Err(AppError::InvalidInput {
            field,
            reason: "must be positive".into(),
        });
    }
    Ok(())
}

/// Validate latitude (-90..=90) and longitude (-180..=180).
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::InvalidInput {
            field: "latitude",
            reason: format!("{latitude} is outside -90..=90"),
        });
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::InvalidInput {
            field: "longitude",
            reason: format!("{longitude} is outside -180..=180"),
        });
    }
    Ok(())
}

pub fn validate_home(latitude: f64, longitude: f64, radius_m: f64) -> Result<(), AppError> {
    validate_coordinates(latitude, longitude)?;
    if radius_m.is_nan() || radius_m <= 0.0 {
        return Err(AppError::InvalidInput {
            field: "radius_m",
            reason: "must be positive".into(),
        });
    }
    Ok(())
}
