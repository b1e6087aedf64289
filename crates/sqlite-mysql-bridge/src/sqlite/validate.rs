//! SQLite file validation.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Magic string at offset 0 of every SQLite 3 database file.
const SQLITE_MAGIC: &[u8] = b"SQLite format 3";

/// The documented SQLite header region is 100 bytes; anything shorter
/// cannot be a database.
const HEADER_LEN: usize = 100;

/// Check whether `path` points at a valid SQLite database: the file exists,
/// is larger than the 100-byte header, and its header starts with the
/// `SQLite format 3` magic. Never fails — any IO problem counts as "not a
/// database".
pub fn is_sqlite_database(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() || meta.len() <= HEADER_LEN as u64 {
        return false;
    }

    let Ok(mut file) = File::open(path) else {
        return false;
    };
    let mut header = [0u8; HEADER_LEN];
    if file.read_exact(&mut header).is_err() {
        return false;
    }

    header.starts_with(SQLITE_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with_contents(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_invalid() {
        assert!(!is_sqlite_database(Path::new("/no/such/file.db")));
    }

    #[test]
    fn test_file_at_most_100_bytes_is_invalid() {
        // Even a correct magic is rejected when the file is too short.
        let mut contents = b"SQLite format 3\0".to_vec();
        contents.resize(100, 0);
        let file = file_with_contents(&contents);
        assert!(!is_sqlite_database(file.path()));
    }

    #[test]
    fn test_wrong_header_is_invalid() {
        let mut contents = b"definitely not a database".to_vec();
        contents.resize(200, 0);
        let file = file_with_contents(&contents);
        assert!(!is_sqlite_database(file.path()));
    }

    #[test]
    fn test_valid_header_and_size_is_valid() {
        let mut contents = b"SQLite format 3\0".to_vec();
        contents.resize(200, 0);
        let file = file_with_contents(&contents);
        assert!(is_sqlite_database(file.path()));
    }

    #[test]
    fn test_real_database_file_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", [])
            .unwrap();
        drop(conn);
        assert!(is_sqlite_database(&path));
    }
}
