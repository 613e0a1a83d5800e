//! Band classification over total elapsed usage, with the one-shot latches
//! that keep each intervention from repeating every tick.

/// Mutually exclusive ranges of total elapsed usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// `[0, initial_warn_window)`
    Quiet,
    /// `[initial_warn_window, warning_threshold)`
    InitialWarn,
    /// `[warning_threshold, loop_threshold)`
    RecurringWarn,
    /// `[loop_threshold, ..)`
    Lock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intervention {
    InitialNudge,
    LongUsageWarning,
    PowerThreshold,
}

/// Per-session flags; rebuilt on every session start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdState {
    pub initial_warn_window_ms: i64,
    pub has_shown_initial_warn: bool,
    pub has_shown_long_usage_warn: bool,
    pub is_looping: bool,
}

impl ThresholdState {
    pub fn new(initial_warn_window_ms: i64) -> Self {
        Self {
            initial_warn_window_ms,
            ..Self::default()
        }
    }

    pub fn band(&self, total_ms: i64, warning_ms: i64, loop_ms: i64) -> Band {
        if total_ms >= loop_ms {
            Band::Lock
        } else if total_ms >= warning_ms {
            Band::RecurringWarn
        } else if total_ms >= self.initial_warn_window_ms {
            Band::InitialWarn
        } else {
            Band::Quiet
        }
    }

    /// Decide which intervention, if any, fires for this tick.
    ///
    /// `near_home` is only consulted inside the initial-warn band.
    pub fn evaluate(
        &mut self,
        total_ms: i64,
        warning_ms: i64,
        loop_ms: i64,
        near_home: impl FnOnce() -> bool,
    ) -> Option<Intervention> {
        match self.band(total_ms, warning_ms, loop_ms) {
            Band::Quiet => None,
            Band::InitialWarn => {
                if !self.has_shown_initial_warn && self.initial_warn_window_ms != 0 && near_home() {
                    self.has_shown_initial_warn = true;
                    Some(Intervention::InitialNudge)
                } else {
                    None
                }
            }
            Band::RecurringWarn => {
                if self.has_shown_long_usage_warn {
                    None
                } else {
                    self.has_shown_long_usage_warn = true;
                    Some(Intervention::LongUsageWarning)
                }
            }
            Band::Lock => {
                if self.is_looping {
                    None
                } else {
                    self.is_looping = true;
                    Some(Intervention::PowerThreshold)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WARN: i64 = 5000;
    const LOOP: i64 = 10_000;

    #[test]
    fn test_band_edges() {
        let state = ThresholdState::new(2000);
        assert_eq!(state.band(0, WARN, LOOP), Band::Quiet);
        assert_eq!(state.band(1999, WARN, LOOP), Band::Quiet);
        assert_eq!(state.band(2000, WARN, LOOP), Band::InitialWarn);
        assert_eq!(state.band(4999, WARN, LOOP), Band::InitialWarn);
        assert_eq!(state.band(5000, WARN, LOOP), Band::RecurringWarn);
        assert_eq!(state.band(9999, WARN, LOOP), Band::RecurringWarn);
        assert_eq!(state.band(10_000, WARN, LOOP), Band::Lock);
        assert_eq!(state.band(i64::MAX, WARN, LOOP), Band::Lock);
    }

    #[test]
    fn test_window_past_warning_skips_initial_band() {
        let state = ThresholdState::new(7000);
        assert_eq!(state.band(6000, WARN, LOOP), Band::RecurringWarn);
        assert_eq!(state.band(4000, WARN, LOOP), Band::Quiet);
    }

    #[test]
    fn test_initial_nudge_fires_once_near_home() {
        let mut state = ThresholdState::new(2000);
        assert_eq!(state.evaluate(1000, WARN, LOOP, || true), None);
        assert_eq!(state.evaluate(2000, WARN, LOOP, || true), Some(Intervention::InitialNudge));
        assert_eq!(state.evaluate(3000, WARN, LOOP, || true), None);
        assert!(state.has_shown_initial_warn);
    }

    #[test]
    fn test_initial_nudge_waits_for_home() {
        let mut state = ThresholdState::new(2000);
        assert_eq!(state.evaluate(2500, WARN, LOOP, || false), None);
        assert!(!state.has_shown_initial_warn);
        assert_eq!(state.evaluate(3000, WARN, LOOP, || true), Some(Intervention::InitialNudge));
    }

    #[test]
    fn test_zero_window_never_nudges() {
        let mut state = ThresholdState::new(0);
        let mut asked = false;
        assert_eq!(
            state.evaluate(100, WARN, LOOP, || {
                asked = true;
                true
            }),
            None
        );
        assert!(!asked, "proximity should not be queried for a zero window");
    }

    #[test]
    fn test_long_usage_warning_fires_once() {
        let mut state = ThresholdState::new(2000);
        assert_eq!(state.evaluate(5000, WARN, LOOP, || false), Some(Intervention::LongUsageWarning));
        assert_eq!(state.evaluate(6000, WARN, LOOP, || false), None);
        assert_eq!(state.evaluate(9999, WARN, LOOP, || false), None);
    }

    #[test]
    fn test_lock_latches() {
        let mut state = ThresholdState::new(2000);
        assert_eq!(state.evaluate(10_000, WARN, LOOP, || false), Some(Intervention::PowerThreshold));
        assert!(state.is_looping);
        for total in 10_001..10_010 {
            assert_eq!(state.evaluate(total, WARN, LOOP, || false), None);
        }
    }

    #[test]
    fn test_jump_straight_to_lock() {
        let mut state = ThresholdState::new(2000);
        assert_eq!(state.evaluate(60_000, WARN, LOOP, || true), Some(Intervention::PowerThreshold));
        assert!(!state.has_shown_initial_warn);
        assert!(!state.has_shown_long_usage_warn);
    }
}
