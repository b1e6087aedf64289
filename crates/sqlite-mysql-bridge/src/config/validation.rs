//! Configuration validation.

use super::Config;
use crate::error::{BridgeError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.connection.host.is_empty() {
        return Err(BridgeError::Config("connection.host is required".into()));
    }
    if config.connection.port == 0 {
        return Err(BridgeError::Config(
            "connection.port must be between 1 and 65535".into(),
        ));
    }
    if config.connection.user.is_empty() {
        return Err(BridgeError::Config("connection.user is required".into()));
    }
    if config.connection.database.is_empty() {
        return Err(BridgeError::Config(
            "connection.database is required".into(),
        ));
    }
    if config.connection.sqlite_file.as_os_str().is_empty() {
        return Err(BridgeError::Config(
            "connection.sqlite_file is required".into(),
        ));
    }
    if config.connection.connect_timeout_secs == 0 {
        return Err(BridgeError::Config(
            "connection.connect_timeout_secs must be at least 1".into(),
        ));
    }

    // Transfer option validation - only check if explicitly set
    if let Some(0) = config.transfer.chunk_size {
        return Err(BridgeError::Config(
            "transfer.chunk_size must be at least 1".into(),
        ));
    }
    if config.transfer.mysql_integer_type.trim().is_empty() {
        return Err(BridgeError::Config(
            "transfer.mysql_integer_type must not be blank".into(),
        ));
    }
    if config.transfer.mysql_string_type.trim().is_empty() {
        return Err(BridgeError::Config(
            "transfer.mysql_string_type must not be blank".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionProfile, Direction, TransferOptions};
    use std::path::PathBuf;

    fn valid_config() -> Config {
        Config {
            direction: Direction::SqliteToMysql,
            connection: ConnectionProfile {
                host: "localhost".to_string(),
                port: 3306,
                user: "root".to_string(),
                password: "password".to_string(),
                database: "shop".to_string(),
                sqlite_file: PathBuf::from("shop.db"),
                connect_timeout_secs: 5,
            },
            transfer: TransferOptions::default(),
            tables: Vec::new(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_host() {
        let mut config = valid_config();
        config.connection.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_port() {
        let mut config = valid_config();
        config.connection.port = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_sqlite_file() {
        let mut config = valid_config();
        config.connection.sqlite_file = PathBuf::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = valid_config();
        config.transfer.chunk_size = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unset_chunk_size_accepted() {
        let mut config = valid_config();
        config.transfer.chunk_size = None;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
direction: mysql_to_sqlite
connection:
  host: db.example.com
  user: alice
  password: s3cret
  database: shop
  sqlite_file: /tmp/shop.db
transfer:
  vacuum: true
  buffered: true
tables:
  - orders
  - customers
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.direction, Direction::MysqlToSqlite);
        assert_eq!(config.connection.port, 3306);
        assert_eq!(config.connection.connect_timeout_secs, 5);
        assert!(config.transfer.vacuum);
        assert_eq!(config.tables, vec!["orders", "customers"]);
    }
}
