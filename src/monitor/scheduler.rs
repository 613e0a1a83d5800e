use std::time::{Duration, Instant};

/// Identifies the scheduling run a tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    generation: u64,
}

/// Cancellable repeating timer for threshold evaluation.
///
/// Every `start` and `cancel` bumps the generation, so a tick issued for an
/// earlier run is recognised as stale and dropped.
#[derive(Debug)]
pub struct TickScheduler {
    interval: Duration,
    generation: u64,
    next_due: Option<Instant>,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            next_due: None,
        }
    }

    /// Begin a new run; the first tick is due immediately.
    pub fn start(&mut self, now: Instant) -> TickToken {
        self.generation = self.generation.wrapping_add(1);
        self.next_due = Some(now);
        self.token()
    }

    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn is_current(&self, token: TickToken) -> bool {
        self.is_active() && token.generation == self.generation
    }

    /// Token of the active run, whether or not its tick is due yet.
    pub fn pending(&self) -> Option<TickToken> {
        self.next_due.map(|_| self.token())
    }

    pub fn due(&self, now: Instant) -> Option<TickToken> {
        self.next_due
            .filter(|due| *due <= now)
            .map(|_| self.token())
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Schedule the next tick one interval after `now`.
    pub fn reschedule(&mut self, token: TickToken, now: Instant) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.next_due = Some(now + self.interval);
        true
    }

    fn token(&self) -> TickToken {
        TickToken {
            generation: self.generation,
        }
    }
}
