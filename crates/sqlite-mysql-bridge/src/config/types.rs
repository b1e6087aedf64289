//! Configuration type definitions with auto-tuning based on system resources.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::info;

/// Fallback MySQL column type for SQLite INTEGER columns.
pub const DEFAULT_INTEGER_TYPE: &str = "INT(11)";

/// Fallback MySQL column type for SQLite TEXT columns.
pub const DEFAULT_STRING_TYPE: &str = "VARCHAR(255)";

/// System resource information for auto-tuning.
#[derive(Debug, Clone)]
pub struct SystemResources {
    /// Total RAM in GB.
    pub total_memory_gb: f64,
}

impl SystemResources {
    /// Detect system resources.
    pub fn detect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        let total_memory_gb = sys.total_memory() as f64 / (1024.0 * 1024.0 * 1024.0);

        Self { total_memory_gb }
    }

    /// Log detected system resources.
    pub fn log(&self) {
        info!("System resources: {:.1} GB RAM", self.total_memory_gb);
    }
}

/// Which way table data flows. Determines the converter variant and which
/// option fields are relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Copy tables from the SQLite file into the MySQL database.
    #[default]
    SqliteToMysql,

    /// Copy tables from the MySQL database into the SQLite file.
    MysqlToSqlite,
}

impl Direction {
    /// Human-readable label of the side tables are read from.
    pub fn source_label(&self) -> &'static str {
        match self {
            Direction::SqliteToMysql => "SQLite",
            Direction::MysqlToSqlite => "MySQL",
        }
    }

    /// Whether the SQLite file is the source side.
    pub fn sqlite_is_source(&self) -> bool {
        matches!(self, Direction::SqliteToMysql)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::SqliteToMysql => write!(f, "sqlite_to_mysql"),
            Direction::MysqlToSqlite => write!(f, "mysql_to_sqlite"),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Transfer direction.
    #[serde(default)]
    pub direction: Direction,

    /// MySQL credentials plus the SQLite file path.
    pub connection: ConnectionProfile,

    /// Converter options.
    #[serde(default)]
    pub transfer: TransferOptions,

    /// Preselected table names for non-interactive use. Empty means the
    /// selection is built from the table lister.
    #[serde(default)]
    pub tables: Vec<String>,
}

impl Config {
    /// Apply auto-tuned defaults based on system resources.
    /// Only fills in values that weren't explicitly set in the config file.
    pub fn with_auto_tuning(mut self) -> Self {
        let resources = SystemResources::detect();
        resources.log();
        self.transfer = self.transfer.with_auto_tuning(&resources);
        self
    }
}

/// MySQL connection parameters and the SQLite database file.
///
/// Immutable once a transfer starts; rebuilt from user input when a new
/// connection is attempted.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// MySQL host.
    pub host: String,

    /// MySQL port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Database name.
    pub database: String,

    /// Path to the SQLite database file.
    pub sqlite_file: PathBuf,

    /// Connection attempt timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("sqlite_file", &self.sqlite_file)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Converter options. Some fields only apply to one direction; the
/// irrelevant ones are cleared by [`TransferOptions::normalized`] before a
/// plan is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOptions {
    /// Rows per chunk. Auto-tuned based on RAM if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,

    /// Skip foreign key creation on the target.
    #[serde(default)]
    pub without_foreign_keys: bool,

    /// Transfer SQLite rowid columns (SQLite→MySQL only).
    #[serde(default)]
    pub with_rowid: bool,

    /// Create FULLTEXT indexes on the target (SQLite→MySQL only).
    #[serde(default)]
    pub use_fulltext: bool,

    /// VACUUM the SQLite file after the transfer (MySQL→SQLite only).
    #[serde(default)]
    pub vacuum: bool,

    /// Use a buffered MySQL cursor while reading (MySQL→SQLite only).
    #[serde(default)]
    pub buffered: bool,

    /// Target MySQL type for integer columns. The literal "Default"
    /// resolves to INT(11).
    #[serde(default = "default_type")]
    pub mysql_integer_type: String,

    /// Target MySQL type for string columns. The literal "Default"
    /// resolves to VARCHAR(255).
    #[serde(default = "default_type")]
    pub mysql_string_type: String,

    /// Converter log file destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            chunk_size: None,
            without_foreign_keys: false,
            with_rowid: false,
            use_fulltext: false,
            vacuum: false,
            buffered: false,
            mysql_integer_type: default_type(),
            mysql_string_type: default_type(),
            log_file: None,
        }
    }
}

impl TransferOptions {
    /// Apply auto-tuned defaults based on system resources.
    /// Only fills in values that are None (not explicitly set).
    pub fn with_auto_tuning(mut self, resources: &SystemResources) -> Self {
        // Chunk size: scale with RAM. Base 10K rows, +10K per 8GB, cap 100K.
        if self.chunk_size.is_none() {
            let chunk = 10_000 + (resources.total_memory_gb / 8.0) as usize * 10_000;
            self.chunk_size = Some(chunk.clamp(10_000, 100_000));
        }

        info!("Auto-tuned config: chunk_size={}", self.chunk_size.unwrap_or_default());

        self
    }

    /// Effective chunk size (with fallback default).
    pub fn get_chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(10_000)
    }

    /// The integer type passed to the converter, with the "Default"
    /// selection resolved to its literal fallback.
    pub fn resolved_integer_type(&self) -> &str {
        resolve_type(&self.mysql_integer_type, DEFAULT_INTEGER_TYPE)
    }

    /// The string type passed to the converter, with the "Default"
    /// selection resolved to its literal fallback.
    pub fn resolved_string_type(&self) -> &str {
        resolve_type(&self.mysql_string_type, DEFAULT_STRING_TYPE)
    }

    /// Copy of the options with the fields the given direction hides reset
    /// to their defaults.
    pub fn normalized(&self, direction: Direction) -> Self {
        let mut options = self.clone();
        match direction {
            Direction::SqliteToMysql => {
                options.vacuum = false;
                options.buffered = false;
            }
            Direction::MysqlToSqlite => {
                options.with_rowid = false;
                options.use_fulltext = false;
                options.mysql_integer_type = default_type();
                options.mysql_string_type = default_type();
            }
        }
        options
    }
}

fn resolve_type<'a>(selected: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = selected.trim();
    if trimmed == "Default" || trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

// Default value functions for serde

fn default_mysql_port() -> u16 {
    3306
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_type() -> String {
    "Default".to_string()
}
