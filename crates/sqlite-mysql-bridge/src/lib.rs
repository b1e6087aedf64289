//! # sqlite-mysql-bridge
//!
//! Library for copying table data between a SQLite file and a MySQL
//! database, in either direction. The conversion engines themselves are
//! external: this crate owns everything around them —
//!
//! - **Connection plumbing** with a bounded MySQL connect timeout and a
//!   header-validated SQLite file
//! - **Table listing and previews** on both sides
//! - **Option assembly** for the converters (chunk size, type fallbacks,
//!   direction-dependent flags)
//! - **One-shot background tasks** so a foreground event loop never blocks
//!   on network or file I/O
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlite_mysql_bridge::{Config, Session};
//!
//! #[tokio::main]
//! async fn main() -> sqlite_mysql_bridge::Result<()> {
//!     let config = Config::load("config.yaml")?.with_auto_tuning();
//!     let session = Session::connect(&config).await?;
//!     let tables = session.list_tables().await?.into_result()?;
//!     println!("{} tables on the source side", tables.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod mysql;
pub mod preview;
pub mod selection;
pub mod session;
pub mod sqlite;
pub mod task;

// Re-exports for convenient access
pub use config::{Config, ConnectionProfile, Direction, TransferOptions};
pub use convert::{Converter, ConverterFactory, TransferPlan, TransferReport};
pub use error::{BridgeError, Result};
pub use preview::TablePreview;
pub use selection::TableSelection;
pub use session::{HealthCheckResult, Session};
pub use sqlite::is_sqlite_database;
pub use task::{TaskGate, TaskHandle, TaskOutcome};
