//! Shared test utilities for Powerloop.
//!
//! Fakes for every collaborator the monitor talks to, so tests can drive
//! time and observe callbacks deterministically.

#![cfg(test)]

use crate::actions::{PowerAction, StatusObserver, WarningOverlay};
use crate::clock::{Clock, RandomSource};
use crate::db::Database;
use crate::error::AppError;
use crate::ledger::{LedgerStore, UsageLedger};
use crate::proximity::ProximityCheck;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open_migrated(&db_path).expect("Failed to open test database");
    (db, dir)
}

/// Clock whose time only moves when a test says so.
#[derive(Clone)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self(Arc::new(AtomicI64::new(start_ms)))
    }

    pub fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: i64) {
        self.0.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Always draws the same nudge window.
pub struct FixedRandom(pub i64);

impl RandomSource for FixedRandom {
    fn pick_ms(&mut self, _min: i64, _max: i64) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Warning(String),
    Power,
    Status(String, i64),
}

/// Records every overlay, power and status call in order.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Call>>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Warning(message) => Some(message),
                Call::Power | Call::Status(..) => None,
            })
            .collect()
    }

    pub fn power_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Power).count()
    }

    pub fn statuses(&self) -> Vec<(String, i64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Status(target, remaining) => Some((target, remaining)),
                Call::Warning(_) | Call::Power => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<(String, i64)> {
        self.statuses().pop()
    }
}

impl WarningOverlay for Recorder {
    fn show_warning(&self, message: &str) {
        self.0.lock().unwrap().push(Call::Warning(message.to_string()));
    }
}

impl PowerAction for Recorder {
    fn trigger_power_action(&self) {
        self.0.lock().unwrap().push(Call::Power);
    }
}

impl StatusObserver for Recorder {
    fn on_status_changed(&self, target: &str, remaining_ms: i64) {
        self.0
            .lock()
            .unwrap()
            .push(Call::Status(target.to_string(), remaining_ms));
    }
}

/// Proximity answer that tests can flip at any time.
pub struct StaticProximity(AtomicBool);

impl StaticProximity {
    pub fn new(near: bool) -> Self {
        Self(AtomicBool::new(near))
    }

    pub fn set(&self, near: bool) {
        self.0.store(near, Ordering::SeqCst);
    }
}

impl ProximityCheck for StaticProximity {
    fn is_near_home(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-memory ledger store whose contents stay visible to the test.
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    ledger: Arc<Mutex<UsageLedger>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryLedgerStore {
    pub fn with_ledger(ledger: UsageLedger) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn stored(&self) -> UsageLedger {
        *self.ledger.lock().unwrap()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&mut self) -> Result<UsageLedger, AppError> {
        Ok(*self.ledger.lock().unwrap())
    }

    fn save(&mut self, ledger: &UsageLedger) -> Result<(), AppError> {
        *self.ledger.lock().unwrap() = *ledger;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store that fails every read and write.
pub struct FailingLedgerStore;

impl LedgerStore for FailingLedgerStore {
    fn load(&mut self) -> Result<UsageLedger, AppError> {
        Err(AppError::Io(std::io::Error::other("storage offline")))
    }

    fn save(&mut self, _ledger: &UsageLedger) -> Result<(), AppError> {
        Err(AppError::Io(std::io::Error::other("storage offline")))
    }
}
