//! Usage ledger: the two values that survive process restarts.

use crate::constants::{KEY_ACCUMULATED_USAGE, KEY_LAST_SESSION_END, LEDGER_NAMESPACE};
use crate::db::Database;
use crate::error::{is_busy, AppError};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

/// Persisted usage totals.
///
/// `last_session_end_ms` is epoch milliseconds, 0 when no session has ended yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageLedger {
    pub accumulated_usage_ms: i64,
    pub last_session_end_ms: i64,
}

impl UsageLedger {
    /// Whether a new session starting at `now_ms` should forget prior usage.
    pub fn is_idle_expired(&self, now_ms: i64, idle_reset_window_ms: i64) -> bool {
        self.last_session_end_ms > 0
            && now_ms.saturating_sub(self.last_session_end_ms) > idle_reset_window_ms
    }
}

pub trait LedgerStore: Send {
    fn load(&mut self) -> Result<UsageLedger, AppError>;
    fn save(&mut self, ledger: &UsageLedger) -> Result<(), AppError>;
}

/// SQLite-backed ledger keyed by a fixed namespace.
pub struct SqliteLedgerStore {
    db: Database,
    namespace: String,
}

impl SqliteLedgerStore {
    pub fn new(db: Database) -> Self {
        Self::with_namespace(db, LEDGER_NAMESPACE)
    }

    pub fn with_namespace(db: Database, namespace: &str) -> Self {
        Self {
            db,
            namespace: namespace.to_string(),
        }
    }

    fn read_value(conn: &Connection, namespace: &str, key: &str) -> rusqlite::Result<i64> {
        let value = conn
            .query_row(
                "SELECT value FROM usage_ledger WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or(0))
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn load(&mut self) -> Result<UsageLedger, AppError> {
        let conn = self.db.connection();
        Ok(UsageLedger {
            accumulated_usage_ms: Self::read_value(conn, &self.namespace, KEY_ACCUMULATED_USAGE)?
                .max(0),
            last_session_end_ms: Self::read_value(conn, &self.namespace, KEY_LAST_SESSION_END)?,
        })
    }

    fn save(&mut self, ledger: &UsageLedger) -> Result<(), AppError> {
        let result = write_ledger(self.db.connection_mut(), &self.namespace, ledger);
        if let Err(e) = &result {
            if is_busy(e) {
                warn!("Usage ledger database is busy; save skipped");
            }
        }
        Ok(result?)
    }
}

/// Upsert both ledger keys in one transaction.
fn write_ledger(conn: &mut Connection, namespace: &str, ledger: &UsageLedger) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    for (key, value) in [
        (KEY_ACCUMULATED_USAGE, ledger.accumulated_usage_ms),
        (KEY_LAST_SESSION_END, ledger.last_session_end_ms),
    ] {
        tx.execute(
            "INSERT INTO usage_ledger (namespace, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value",
            params![namespace, key, value],
        )?;
    }
    tx.commit()
}
