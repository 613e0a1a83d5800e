//! The usage session and threshold state machine.
//!
//! `UsageMonitor` turns foreground-app changes and periodic ticks into
//! accumulated-usage bookkeeping and intervention callbacks. It is driven
//! from a single context (see `service`), so it holds no locks itself.

pub mod router;
pub mod scheduler;
pub mod thresholds;

use crate::actions::{PowerAction, StatusObserver, WarningOverlay};
use crate::clock::{Clock, RandomSource};
use crate::config::MonitorConfig;
use crate::constants::IDLE_TARGET_LABEL;
use crate::ledger::{LedgerStore, UsageLedger};
use crate::proximity::ProximityCheck;
use log::{debug, info, warn};
use router::Route;
use scheduler::{TickScheduler, TickToken};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thresholds::{Band, Intervention, ThresholdState};

/// Everything the monitor calls out to.
pub struct Collaborators {
    pub overlay: Box<dyn WarningOverlay>,
    pub power: Box<dyn PowerAction>,
    pub status: Box<dyn StatusObserver>,
    pub proximity: Arc<dyn ProximityCheck>,
    pub clock: Box<dyn Clock>,
    pub random: Box<dyn RandomSource>,
}

#[derive(Debug, Clone)]
struct Session {
    target: String,
    started_at_ms: i64,
}

pub struct UsageMonitor {
    config: MonitorConfig,
    store: Box<dyn LedgerStore>,
    ledger: UsageLedger,
    session: Option<Session>,
    thresholds: ThresholdState,
    scheduler: TickScheduler,
    deps: Collaborators,
}

impl UsageMonitor {
    /// Build a monitor, loading persisted usage from `store`.
    ///
    /// An unreadable store starts from zero; later saves still go to it.
    pub fn new(config: MonitorConfig, mut store: Box<dyn LedgerStore>, deps: Collaborators) -> Self {
        let ledger = store.load().unwrap_or_else(|e| {
            warn!("Failed to load usage ledger, starting from zero: {e}");
            UsageLedger::default()
        });
        info!("Loaded accumulated usage: {}s", ledger.accumulated_usage_ms / 1000);

        let scheduler = TickScheduler::new(Duration::from_millis(config.tick_interval_ms));
        Self {
            config,
            store,
            ledger,
            session: None,
            thresholds: ThresholdState::default(),
            scheduler,
            deps,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn ledger(&self) -> UsageLedger {
        self.ledger
    }

    pub fn monitored_target(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.target.as_str())
    }

    pub fn is_looping(&self) -> bool {
        self.thresholds.is_looping
    }

    pub fn thresholds(&self) -> &ThresholdState {
        &self.thresholds
    }

    /// Accumulated usage plus the running session, recomputed from the clock.
    pub fn total_elapsed_ms(&self) -> i64 {
        let current = self.session.as_ref().map_or(0, |s| {
            self.deps.clock.now_ms().saturating_sub(s.started_at_ms).max(0)
        });
        self.ledger.accumulated_usage_ms.saturating_add(current)
    }

    pub fn remaining_ms(&self) -> i64 {
        self.config
            .loop_threshold_ms
            .saturating_sub(self.total_elapsed_ms())
            .max(0)
    }

    pub fn band(&self) -> Band {
        self.thresholds.band(
            self.total_elapsed_ms(),
            self.config.warning_threshold_ms,
            self.config.loop_threshold_ms,
        )
    }

    /// Host notification for every foreground window/app transition.
    pub fn on_foreground_app_changed(&mut self, app_id: &str) {
        debug!("Foreground app changed: {app_id}");
        let route = router::route(app_id, &self.config, self.monitored_target(), self.thresholds.is_looping);

        match route {
            Route::RefirePowerAction => {
                info!("Loop triggered by {app_id}: requesting power action again");
                self.deps.power.trigger_power_action();
            }
            Route::IgnoreTransparent | Route::IgnoreSameTarget => {}
            Route::Switch { stop_current, start } => {
                if stop_current {
                    if let Some(session) = &self.session {
                        let duration = self.deps.clock.now_ms().saturating_sub(session.started_at_ms);
                        info!(
                            "Stopped monitoring {}. Session duration: {}s",
                            session.target,
                            duration / 1000
                        );
                    }
                    self.stop_monitoring();
                }
                if start {
                    self.start_monitoring(app_id);
                }
            }
        }
    }

    /// Start a session for `target`, resuming accumulated usage unless the
    /// idle-reset window has passed since the last session ended.
    pub fn start_monitoring(&mut self, target: &str) {
        if self.session.is_some() {
            self.stop_monitoring();
        }

        let now = self.deps.clock.now_ms();
        let window = self
            .deps
            .random
            .pick_ms(self.config.initial_warn_min_ms, self.config.initial_warn_max_ms);
        self.thresholds = ThresholdState::new(window);

        if self.ledger.is_idle_expired(now, self.config.idle_reset_window_ms) {
            self.ledger.accumulated_usage_ms = 0;
            self.persist();
            info!(
                "Timer reset due to inactivity (> {}s)",
                self.config.idle_reset_window_ms / 1000
            );
        } else if self.ledger.accumulated_usage_ms > 0 {
            info!("Resuming timer. Accumulated: {}s", self.ledger.accumulated_usage_ms / 1000);
        }

        self.session = Some(Session {
            target: target.to_string(),
            started_at_ms: now,
        });
        self.scheduler.start(Instant::now());

        info!("Started monitoring {target} (initial nudge after {}s)", window / 1000);
        self.broadcast_current_status();
    }

    /// Fold the running session into the ledger and persist it. Safe to call
    /// when idle.
    pub fn stop_monitoring(&mut self) {
        let stopped = self.session.take();
        if let Some(session) = &stopped {
            let now = self.deps.clock.now_ms();
            let elapsed = now.saturating_sub(session.started_at_ms).max(0);
            self.ledger.accumulated_usage_ms = self.ledger.accumulated_usage_ms.saturating_add(elapsed);
            self.ledger.last_session_end_ms = now;
            self.persist();
            info!(
                "Monitoring of {} stopped (saved: {}s)",
                session.target,
                self.ledger.accumulated_usage_ms / 1000
            );
        }

        self.thresholds.is_looping = false;
        self.scheduler.cancel();

        if stopped.is_some() {
            self.broadcast_current_status();
        }
    }

    /// Report the current target (or "none") and time left before the lock.
    pub fn broadcast_current_status(&self) {
        let target = self.monitored_target().unwrap_or(IDLE_TARGET_LABEL);
        self.deps.status.on_status_changed(target, self.remaining_ms());
    }

    /// Token for the active tick run, if a session is being monitored.
    pub fn pending_tick(&self) -> Option<TickToken> {
        self.scheduler.pending()
    }

    pub fn due_tick(&self, now: Instant) -> Option<TickToken> {
        self.scheduler.due(now)
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }

    /// Evaluate thresholds once. Returns false (and does nothing) for a tick
    /// that belongs to a stopped or superseded session.
    pub fn on_tick(&mut self, token: TickToken) -> bool {
        if !self.scheduler.is_current(token) {
            debug!("Discarding stale tick");
            return false;
        }
        let Some(target) = self.session.as_ref().map(|s| s.target.clone()) else {
            return false;
        };

        let total = self.total_elapsed_ms();
        let remaining = self.remaining_ms();
        debug!(
            "Monitoring {target}: total {}s (remaining {}s)",
            total / 1000,
            remaining / 1000
        );
        self.deps.status.on_status_changed(&target, remaining);

        let proximity = &self.deps.proximity;
        let fired = self.thresholds.evaluate(
            total,
            self.config.warning_threshold_ms,
            self.config.loop_threshold_ms,
            || proximity.is_near_home(),
        );

        match fired {
            Some(Intervention::InitialNudge) => {
                info!(
                    "Initial nudge for {target} at {}s (window {}s)",
                    total / 1000,
                    self.thresholds.initial_warn_window_ms / 1000
                );
                self.deps.overlay.show_warning(&self.config.messages.initial_nudge);
            }
            Some(Intervention::LongUsageWarning) => {
                info!("Warning threshold reached for {target}");
                self.deps.overlay.show_warning(&self.config.messages.long_usage);
            }
            Some(Intervention::PowerThreshold) => {
                info!("Loop threshold reached for {target}");
                self.deps.power.trigger_power_action();
            }
            None => {}
        }

        self.scheduler.reschedule(token, Instant::now());
        true
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.ledger) {
            warn!("Failed to persist usage ledger (kept in memory): {e}");
        }
    }
}
