use crate::config::MonitorConfig;

/// What a foreground-app change means for the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Lock band is latched and the user is still on (or over) the target.
    RefirePowerAction,
    /// The monitor's own overlay or a system surface over the target app.
    IgnoreTransparent,
    /// Navigation inside the app already being monitored.
    IgnoreSameTarget,
    /// End the current session (if any), then start one when the app is a target.
    Switch { stop_current: bool, start: bool },
}

/// Classify a foreground change. Checks run in a fixed order: the loop
/// rule and transparent surfaces come before anything that could stop the
/// session.
pub fn route(app_id: &str, config: &MonitorConfig, current: Option<&str>, is_looping: bool) -> Route {
    let is_current = current == Some(app_id);
    let is_transparent = config.is_transparent(app_id);

    if is_looping && (is_current || is_transparent) {
        return Route::RefirePowerAction;
    }
    if is_transparent {
        return Route::IgnoreTransparent;
    }
    if is_current {
        return Route::IgnoreSameTarget;
    }

    Route::Switch {
        stop_current: current.is_some(),
        start: config.is_target(app_id),
    }
}
