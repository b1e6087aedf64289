//! A connected pair of databases and the operations on them.
//!
//! A [`Session`] owns one MySQL pool and one SQLite connection plus a task
//! gate per operation kind. Listing, previewing, and transferring all go
//! through the gates, so repeated requests of the same kind are rejected
//! while one is in flight instead of queueing up.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, ConnectionProfile, Direction, TransferOptions};
use crate::convert::{self, ConverterFactory, TransferPlan, TransferReport};
use crate::error::{BridgeError, Result};
use crate::mysql::MysqlDb;
use crate::preview::TablePreview;
use crate::selection::TableSelection;
use crate::sqlite::{is_sqlite_database, SqliteDb};
use crate::task::{self, TaskGate, TaskHandle, TaskOutcome};

/// Result of probing both sides of a session's connection pair.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub mysql_connected: bool,
    pub mysql_latency_ms: Option<f64>,
    pub mysql_error: Option<String>,
    pub sqlite_valid: bool,
    pub sqlite_file: String,
}

impl HealthCheckResult {
    pub fn is_healthy(&self) -> bool {
        self.mysql_connected && self.sqlite_valid
    }
}

/// Both sides connected and ready for listing, previews, and transfers.
#[derive(Debug)]
pub struct Session {
    direction: Direction,
    profile: ConnectionProfile,
    mysql: Arc<MysqlDb>,
    sqlite: Arc<SqliteDb>,
    list_gate: TaskGate,
    preview_gate: TaskGate,
    transfer_gate: TaskGate,
}

impl Session {
    /// Connect both sides. The SQLite file header is validated before any
    /// network attempt; the MySQL connect runs as a one-shot task bounded
    /// by the profile's timeout.
    pub async fn connect(config: &Config) -> Result<Self> {
        let profile = config.connection.clone();

        // Cheap local check first. A bad file path should not cost a
        // network round trip.
        if !is_sqlite_database(&profile.sqlite_file) {
            return Err(BridgeError::InvalidSqliteFile(profile.sqlite_file));
        }

        let connect_gate = TaskGate::new();
        let task_profile = profile.clone();
        let handle = task::spawn("connect", &connect_gate, async move {
            MysqlDb::connect(&task_profile).await
        })?;
        let mysql = handle.outcome().await.into_result()?;

        let sqlite = SqliteDb::open(&profile.sqlite_file)?;

        info!(
            "Session ready: {} ({} -> {})",
            config.direction,
            config.direction.source_label(),
            match config.direction {
                Direction::SqliteToMysql => "MySQL",
                Direction::MysqlToSqlite => "SQLite",
            }
        );

        Ok(Self {
            direction: config.direction,
            profile,
            mysql: Arc::new(mysql),
            sqlite: Arc::new(sqlite),
            list_gate: TaskGate::new(),
            preview_gate: TaskGate::new(),
            transfer_gate: TaskGate::new(),
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// List the source side's tables. The outer `Err` means a listing is
    /// already in flight; the outcome carries the result of this one.
    pub async fn list_tables(&self) -> Result<TaskOutcome<Vec<String>>> {
        if self.direction.sqlite_is_source() {
            // Local file access is fast enough to run inline, but it still
            // respects the gate so both sources behave the same.
            let _permit = self
                .list_gate
                .try_acquire()
                .ok_or(BridgeError::TaskInFlight("list"))?;
            Ok(self.sqlite.list_tables().into())
        } else {
            let mysql = Arc::clone(&self.mysql);
            let handle = task::spawn("list", &self.list_gate, async move {
                mysql.list_tables().await
            })?;
            Ok(handle.outcome().await)
        }
    }

    /// Build a fresh all-unchecked selection from the source side's tables.
    pub async fn load_selection(&self) -> Result<TaskOutcome<TableSelection>> {
        Ok(match self.list_tables().await? {
            TaskOutcome::Succeeded(tables) => {
                TaskOutcome::Succeeded(TableSelection::from_tables(tables))
            }
            TaskOutcome::Failed(message) => TaskOutcome::Failed(message),
        })
    }

    /// Preview one source-side table: column headers plus every row.
    pub async fn preview(&self, table: &str) -> Result<TaskOutcome<TablePreview>> {
        if self.direction.sqlite_is_source() {
            let _permit = self
                .preview_gate
                .try_acquire()
                .ok_or(BridgeError::TaskInFlight("preview"))?;
            Ok(self.sqlite.preview(table).into())
        } else {
            let mysql = Arc::clone(&self.mysql);
            let table = table.to_string();
            let handle = task::spawn("preview", &self.preview_gate, async move {
                mysql.preview(&table).await
            })?;
            Ok(handle.outcome().await)
        }
    }

    /// Start a transfer of the selection's checked tables. Fails up front
    /// with the warning-class empty-selection error, or when a transfer is
    /// already in flight; otherwise the handle reports the single outcome.
    pub fn transfer(
        &self,
        options: &TransferOptions,
        selection: &TableSelection,
        factory: Arc<dyn ConverterFactory>,
    ) -> Result<TaskHandle<TransferReport>> {
        let plan = TransferPlan::new(self.direction, self.profile.clone(), options, selection)?;
        convert::run_transfer(factory, plan, &self.transfer_gate)
    }

    /// Probe both sides and report their state without failing.
    pub async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let (mysql_connected, mysql_latency_ms, mysql_error) = match self.mysql.ping().await {
            Ok(()) => (true, Some(start.elapsed().as_secs_f64() * 1000.0), None),
            Err(e) => {
                warn!("MySQL health check failed: {}", e);
                (false, None, Some(e.to_string()))
            }
        };

        HealthCheckResult {
            mysql_connected,
            mysql_latency_ms,
            mysql_error,
            sqlite_valid: is_sqlite_database(self.sqlite.path()),
            sqlite_file: self.sqlite.path().display().to_string(),
        }
    }

    /// Close the MySQL pool. The SQLite connection closes on drop.
    pub async fn close(&self) {
        self.mysql.close().await;
    }
}
