use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock source in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        i64::try_from(millis).unwrap_or(i64::MAX)
    }
}

/// Source for the per-session randomized nudge window.
pub trait RandomSource: Send {
    /// Uniform draw from the inclusive range `[min, max]`.
    fn pick_ms(&mut self, min: i64, max: i64) -> i64;
}

pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_ms(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}
