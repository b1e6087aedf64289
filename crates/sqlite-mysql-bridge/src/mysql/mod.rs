//! MySQL side of the bridge.
//!
//! Uses an SQLx pool capped at a single connection: only one logical
//! operation is expected to use the cursor at a time, and the task gates
//! in [`crate::session`] serialize callers.

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Row, ValueRef};
use tracing::{debug, info};

use crate::config::ConnectionProfile;
use crate::error::{BridgeError, Result};
use crate::preview::TablePreview;

/// A connected MySQL database.
#[derive(Debug)]
pub struct MysqlDb {
    pool: MySqlPool,
    database: String,
}

impl MysqlDb {
    /// Open a connection and probe it with `SELECT 1`. The whole attempt is
    /// bounded by the profile's connect timeout (default 5 seconds); a
    /// connection that opens but cannot answer the probe counts as a
    /// failure.
    pub async fn connect(profile: &ConnectionProfile) -> Result<Self> {
        let timeout = Duration::from_secs(profile.connect_timeout_secs);

        let options = MySqlConnectOptions::new()
            .host(&profile.host)
            .port(profile.port)
            .database(&profile.database)
            .username(&profile.user)
            .password(&profile.password);

        let attempt = async {
            let pool = MySqlPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(timeout)
                .connect_with(options)
                .await
                .map_err(|e| BridgeError::connect(e, "opening MySQL connection"))?;

            // "Connected but not usable" is a failure too.
            sqlx::query("SELECT 1")
                .fetch_one(&pool)
                .await
                .map_err(|e| BridgeError::connect(e, "testing MySQL connection"))?;

            Ok::<MySqlPool, BridgeError>(pool)
        };

        let pool = tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| BridgeError::ConnectTimeout(profile.connect_timeout_secs))??;

        info!(
            "Connected to MySQL: {}:{}/{}",
            profile.host, profile.port, profile.database
        );

        Ok(Self {
            pool,
            database: profile.database.clone(),
        })
    }

    /// The connected database's name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Probe the connection.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BridgeError::connect(e, "pinging MySQL connection"))?;
        Ok(())
    }

    /// List table names via `SHOW TABLES`.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let rows: Vec<MySqlRow> = sqlx::query("SHOW TABLES")
            .fetch_all(&self.pool)
            .await?;

        let tables = rows
            .iter()
            .map(|row| string_column(row, 0))
            .collect::<Result<Vec<String>>>()?;

        debug!("Listed {} MySQL tables", tables.len());
        Ok(tables)
    }

    /// Column names and declared types via `SHOW COLUMNS FROM`.
    async fn columns(&self, table: &str) -> Result<Vec<(String, String)>> {
        let query = format!("SHOW COLUMNS FROM {}", quote_ident(table));
        let rows: Vec<MySqlRow> = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Ok((string_column(row, 0)?, string_column(row, 1)?)))
            .collect()
    }

    /// Fetch column names and every row of one table for display. The whole
    /// table is fetched; there is deliberately no row limit.
    pub async fn preview(&self, table: &str) -> Result<TablePreview> {
        let columns = self.columns(table).await?;

        let query = format!("SELECT * FROM {}", quote_ident(table));
        let rows: Vec<MySqlRow> = sqlx::query(&query).fetch_all(&self.pool).await?;

        let data = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(idx, (_, declared))| display_value(row, idx, declared))
                    .collect()
            })
            .collect();

        Ok(TablePreview {
            table: table.to_string(),
            columns: columns.into_iter().map(|(name, _)| name).collect(),
            rows: data,
        })
    }

    /// Close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Quote a MySQL identifier.
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Read a column as text, falling back to lossy bytes for collations where
/// the server hands back VARBINARY.
fn string_column(row: &MySqlRow, idx: usize) -> Result<String> {
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return Ok(s);
    }
    let bytes: Vec<u8> = row.try_get(idx)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Base type of a declared column type: `varchar(255)` → `varchar`,
/// `int(11) unsigned` → `int`.
fn base_type(declared: &str) -> String {
    declared
        .split(|c| c == '(' || c == ' ')
        .next()
        .unwrap_or(declared)
        .to_lowercase()
}

/// Render one MySQL value for the preview grid, decoding by the column's
/// declared type. Undecodable or NULL values render as "NULL".
fn display_value(row: &MySqlRow, idx: usize, declared: &str) -> String {
    const NULL: &str = "NULL";

    let is_null = row.try_get_raw(idx).map(|r| r.is_null()).unwrap_or(true);
    if is_null {
        return NULL.to_string();
    }

    match base_type(declared).as_str() {
        "tinyint" => row
            .try_get::<i8, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),
        "smallint" => row
            .try_get::<i16, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),
        "mediumint" | "int" | "integer" => row
            .try_get::<i32, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),
        "bigint" => row
            .try_get::<i64, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),
        "year" => row
            .try_get::<u16, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),

        "float" => row
            .try_get::<f32, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),
        "double" | "real" => row
            .try_get::<f64, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),

        "decimal" | "numeric" => row
            .try_get::<rust_decimal::Decimal, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),

        "bit" | "boolean" | "bool" => row
            .try_get::<bool, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),

        "date" => row
            .try_get::<chrono::NaiveDate, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),
        "time" => row
            .try_get::<chrono::NaiveTime, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),
        "datetime" | "timestamp" => row
            .try_get::<chrono::NaiveDateTime, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| NULL.to_string()),

        "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => row
            .try_get::<Vec<u8>, _>(idx)
            .map(|bytes| bytes.iter().map(|b| format!("{:02x}", b)).collect())
            .unwrap_or_else(|_| NULL.to_string()),

        // char/varchar/text/enum/set/json and everything else
        _ => string_column(row, idx).unwrap_or_else(|_| NULL.to_string()),
    }
}
