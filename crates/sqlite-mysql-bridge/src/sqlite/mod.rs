//! SQLite side of the bridge.
//!
//! All SQLite access is synchronous: the file is local and assumed fast.
//! The connection sits behind a mutex so that only one logical operation
//! uses it at a time.

mod validate;

pub use validate::is_sqlite_database;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::info;

use crate::error::{BridgeError, Result};
use crate::preview::TablePreview;

/// An open, header-validated SQLite database.
#[derive(Debug)]
pub struct SqliteDb {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteDb {
    /// Validate the file header and open the database.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !is_sqlite_database(&path) {
            return Err(BridgeError::InvalidSqliteFile(path));
        }

        let conn = Connection::open(&path)?;
        info!("Opened SQLite database: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// The file this database was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| BridgeError::Internal("SQLite connection poisoned by a panic".into()))
    }

    /// List user tables in `sqlite_master` order, excluding the internal
    /// `sqlite_sequence` bookkeeping table.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        drop(stmt);

        Ok(names
            .into_iter()
            .filter(|name| name != "sqlite_sequence")
            .collect())
    }

    /// Fetch column names and every row of one table for display. The whole
    /// table is fetched; there is deliberately no row limit.
    pub fn preview(&self, table: &str) -> Result<TablePreview> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        drop(stmt);

        let query = format!("SELECT * FROM {}", quote_ident(table));
        let mut stmt = conn.prepare(&query)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;

        let mut data = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(display_value(row.get_ref(idx)?));
            }
            data.push(values);
        }

        Ok(TablePreview {
            table: table.to_string(),
            columns,
            rows: data,
        })
    }
}

/// Quote a SQLite identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render a SQLite value for the preview grid.
fn display_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => b.iter().map(|byte| format!("{:02x}", byte)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_db() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE b (id INTEGER PRIMARY KEY, note TEXT);
            -- AUTOINCREMENT forces SQLite to create sqlite_sequence
            CREATE TABLE a (id INTEGER PRIMARY KEY AUTOINCREMENT, amount REAL, data BLOB);
            INSERT INTO a (amount, data) VALUES (1.5, x'cafe');
            INSERT INTO a (amount, data) VALUES (NULL, NULL);
            INSERT INTO b (id, note) VALUES (7, 'hello');
            "#,
        )
        .unwrap();
        drop(conn);
        (dir, path)
    }

    #[test]
    fn test_open_rejects_non_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.db");
        std::fs::write(&path, vec![0u8; 200]).unwrap();

        let err = SqliteDb::open(&path).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidSqliteFile(_)));
    }

    #[test]
    fn test_list_tables_excludes_sqlite_sequence() {
        let (_dir, path) = fixture_db();
        let db = SqliteDb::open(path).unwrap();

        // sqlite_sequence exists in sqlite_master thanks to AUTOINCREMENT,
        // but must not be listed. Order is sqlite_master (creation) order,
        // not alphabetical: b was created before a.
        assert_eq!(db.list_tables().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_preview_returns_headers_and_all_rows() {
        let (_dir, path) = fixture_db();
        let db = SqliteDb::open(path).unwrap();

        let preview = db.preview("a").unwrap();
        assert_eq!(preview.columns, vec!["id", "amount", "data"]);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[0], vec!["1", "1.5", "cafe"]);
        assert_eq!(preview.rows[1], vec!["2", "NULL", "NULL"]);
    }

    #[test]
    fn test_preview_unknown_table_fails() {
        let (_dir, path) = fixture_db();
        let db = SqliteDb::open(path).unwrap();
        assert!(db.preview("missing").is_err());
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("name"), "\"name\"");
        assert_eq!(quote_ident("ta\"ble"), "\"ta\"\"ble\"");
    }
}
