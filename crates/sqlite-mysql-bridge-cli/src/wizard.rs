//! Interactive configuration wizard for creating/editing config files.

use dialoguer::{Confirm, Input, Password, Select};
use sqlite_mysql_bridge::{
    is_sqlite_database, Config, ConnectionProfile, Direction, Session, TransferOptions,
};
use std::path::{Path, PathBuf};

/// Result type for wizard operations.
pub type WizardResult<T> = Result<T, WizardError>;

/// Errors that can occur during wizard execution.
#[derive(Debug)]
pub enum WizardError {
    /// User cancelled the wizard.
    Cancelled,
    /// IO error (file read/write).
    Io(std::io::Error),
    /// Config parsing error.
    Config(String),
    /// Validation error.
    Validation(String),
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "Configuration cancelled"),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for WizardError {}

impl From<std::io::Error> for WizardError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<dialoguer::Error> for WizardError {
    fn from(e: dialoguer::Error) -> Self {
        Self::Io(std::io::Error::other(e.to_string()))
    }
}

/// Action to take when config file already exists.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ExistingFileAction {
    Edit,
    Overwrite,
    Abort,
}

/// Run the configuration wizard.
pub async fn run_wizard(output: &Path, force: bool) -> WizardResult<()> {
    println!();
    println!("SQLite / MySQL Bridge - Configuration Wizard");
    println!("============================================");
    println!();

    // Check if file exists and determine action
    let existing_config = if output.exists() && !force {
        let action = prompt_existing_file_action(output)?;
        match action {
            ExistingFileAction::Edit => {
                println!("Loading existing configuration...");
                match Config::load(output) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        println!("Warning: Could not parse existing file: {}", e);
                        println!("Starting with fresh configuration.\n");
                        None
                    }
                }
            }
            ExistingFileAction::Overwrite => {
                println!("Starting with fresh configuration.\n");
                None
            }
            ExistingFileAction::Abort => {
                return Err(WizardError::Cancelled);
            }
        }
    } else {
        None
    };

    let direction = prompt_direction(existing_config.as_ref().map(|c| c.direction))?;
    let connection = prompt_connection(existing_config.as_ref().map(|c| &c.connection))?;
    let transfer = prompt_transfer_options(
        direction,
        existing_config.as_ref().map(|c| &c.transfer),
    )?;

    let config = Config {
        direction,
        connection,
        transfer,
        tables: existing_config.map(|c| c.tables).unwrap_or_default(),
    };

    if let Err(e) = config.validate() {
        return Err(WizardError::Validation(e.to_string()));
    }

    print_summary(&config);

    if prompt_connection_test()? {
        test_connections(&config).await?;
    }

    if !prompt_save_confirm(output)? {
        return Err(WizardError::Cancelled);
    }

    write_config(&config, output)?;

    println!("\nConfiguration saved to {}", output.display());
    println!("Run 'sqlite-mysql-bridge tables' to list the source tables.");

    Ok(())
}

fn prompt_existing_file_action(path: &Path) -> WizardResult<ExistingFileAction> {
    println!("File already exists: {}\n", path.display());

    let options = &["Edit existing configuration", "Overwrite with new", "Abort"];
    let selection = Select::new()
        .with_prompt("What would you like to do?")
        .items(options)
        .default(0)
        .interact()?;

    Ok(match selection {
        0 => ExistingFileAction::Edit,
        1 => ExistingFileAction::Overwrite,
        _ => ExistingFileAction::Abort,
    })
}

fn prompt_direction(existing: Option<Direction>) -> WizardResult<Direction> {
    let directions = &["SQLite to MySQL", "MySQL to SQLite"];
    let default_idx = match existing {
        Some(Direction::MysqlToSqlite) => 1,
        _ => 0,
    };

    let idx = Select::new()
        .with_prompt("Transfer direction")
        .items(directions)
        .default(default_idx)
        .interact()?;

    println!();

    Ok(match idx {
        0 => Direction::SqliteToMysql,
        _ => Direction::MysqlToSqlite,
    })
}

fn prompt_connection(existing: Option<&ConnectionProfile>) -> WizardResult<ConnectionProfile> {
    println!("SQLite Database");
    println!("---------------");

    let sqlite_file: String = Input::new()
        .with_prompt("  File")
        .default(
            existing
                .map(|c| c.sqlite_file.display().to_string())
                .unwrap_or_default(),
        )
        .interact_text()?;
    let sqlite_file = PathBuf::from(sqlite_file);

    if !is_sqlite_database(&sqlite_file) {
        println!("  Warning: file is missing or not a SQLite database");
    }

    println!();
    println!("MySQL Database");
    println!("--------------");

    let host: String = Input::new()
        .with_prompt("  Host")
        .default(existing.map(|c| c.host.clone()).unwrap_or_default())
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("  Port")
        .default(existing.map(|c| c.port).unwrap_or(3306))
        .interact_text()?;

    let database: String = Input::new()
        .with_prompt("  Database")
        .default(existing.map(|c| c.database.clone()).unwrap_or_default())
        .interact_text()?;

    let user: String = Input::new()
        .with_prompt("  User")
        .default(existing.map(|c| c.user.clone()).unwrap_or_default())
        .interact_text()?;

    let password = prompt_password("  Password", existing.is_some())?;
    let password = if password.is_empty() {
        existing.map(|e| e.password.clone()).unwrap_or(password)
    } else {
        password
    };

    let connect_timeout_secs: u64 = Input::new()
        .with_prompt("  Connect timeout (seconds)")
        .default(existing.map(|c| c.connect_timeout_secs).unwrap_or(5))
        .interact_text()?;
    if connect_timeout_secs == 0 {
        return Err(WizardError::Validation(
            "Connect timeout must be at least 1 second.".to_string(),
        ));
    }

    println!();

    Ok(ConnectionProfile {
        host,
        port,
        user,
        password,
        database,
        sqlite_file,
        connect_timeout_secs,
    })
}

fn prompt_transfer_options(
    direction: Direction,
    existing: Option<&TransferOptions>,
) -> WizardResult<TransferOptions> {
    println!("Transfer Settings");
    println!("-----------------");

    let mut options = existing.cloned().unwrap_or_default();

    options.chunk_size =
        prompt_optional_usize("  Chunk size", existing.and_then(|c| c.chunk_size))?;

    options.without_foreign_keys = Confirm::new()
        .with_prompt("  Skip foreign keys")
        .default(existing.map(|c| c.without_foreign_keys).unwrap_or(false))
        .interact()?;

    match direction {
        Direction::SqliteToMysql => {
            options.with_rowid = Confirm::new()
                .with_prompt("  Transfer rowid columns")
                .default(existing.map(|c| c.with_rowid).unwrap_or(false))
                .interact()?;

            options.use_fulltext = Confirm::new()
                .with_prompt("  Create FULLTEXT indexes")
                .default(existing.map(|c| c.use_fulltext).unwrap_or(false))
                .interact()?;

            options.mysql_integer_type =
                prompt_mysql_type("  Integer column type", &options.mysql_integer_type)?;
            options.mysql_string_type =
                prompt_mysql_type("  String column type", &options.mysql_string_type)?;
        }
        Direction::MysqlToSqlite => {
            options.vacuum = Confirm::new()
                .with_prompt("  VACUUM the SQLite file afterwards")
                .default(existing.map(|c| c.vacuum).unwrap_or(false))
                .interact()?;

            options.buffered = Confirm::new()
                .with_prompt("  Use a buffered MySQL cursor")
                .default(existing.map(|c| c.buffered).unwrap_or(false))
                .interact()?;
        }
    }

    options.log_file = prompt_optional_path(
        "  Converter log file (blank for none)",
        existing.and_then(|c| c.log_file.as_deref()),
    )?;

    println!();

    // Hidden fields for this direction stay at their defaults.
    Ok(options.normalized(direction))
}

fn prompt_optional_path(prompt: &str, existing: Option<&Path>) -> WizardResult<Option<PathBuf>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(
            existing
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
        .allow_empty(true)
        .interact_text()?;

    let trimmed = input.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(PathBuf::from(trimmed)))
    }
}

fn prompt_mysql_type(prompt: &str, existing: &str) -> WizardResult<String> {
    let input: String = Input::new()
        .with_prompt(format!("{} ('Default' for the fallback)", prompt))
        .default(existing.to_string())
        .interact_text()?;
    Ok(input)
}

fn prompt_password(prompt: &str, has_existing: bool) -> WizardResult<String> {
    if has_existing {
        let input: String = Password::new()
            .with_prompt(format!("{} (blank to keep existing)", prompt))
            .allow_empty_password(true)
            .interact()?;
        Ok(input)
    } else {
        let input: String = Password::new().with_prompt(prompt).interact()?;
        Ok(input)
    }
}

fn prompt_optional_usize(prompt: &str, existing: Option<usize>) -> WizardResult<Option<usize>> {
    let default_str = existing
        .map(|v| v.to_string())
        .unwrap_or_else(|| "auto".to_string());

    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default_str)
        .allow_empty(true)
        .interact_text()?;

    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        Ok(None)
    } else {
        match trimmed.parse::<usize>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => {
                println!("    Invalid number, using auto-tuned value");
                Ok(None)
            }
        }
    }
}

fn print_summary(config: &Config) {
    println!("Configuration Summary");
    println!("---------------------");
    println!("  Direction: {}", config.direction);
    println!(
        "  MySQL: {}@{}:{}/{}",
        config.connection.user,
        config.connection.host,
        config.connection.port,
        config.connection.database
    );
    println!("  SQLite: {}", config.connection.sqlite_file.display());
    println!("  Chunk size: {}", config.transfer.get_chunk_size());

    let mut features = Vec::new();
    if config.transfer.without_foreign_keys {
        features.push("without foreign keys");
    }
    if config.transfer.with_rowid {
        features.push("with rowid");
    }
    if config.transfer.use_fulltext {
        features.push("fulltext indexes");
    }
    if config.transfer.vacuum {
        features.push("vacuum after");
    }
    if config.transfer.buffered {
        features.push("buffered cursor");
    }
    if !features.is_empty() {
        println!("  Options: {}", features.join(", "));
    }
    if let Some(ref log_file) = config.transfer.log_file {
        println!("  Log file: {}", log_file.display());
    }

    println!();
}

fn prompt_connection_test() -> WizardResult<bool> {
    Ok(Confirm::new()
        .with_prompt("Test database connections?")
        .default(false)
        .interact()?)
}

async fn test_connections(config: &Config) -> WizardResult<()> {
    use std::time::Duration;
    use tokio::time::timeout;

    println!("\nTesting connections...");

    // The session's own connect timeout applies per side; this outer bound
    // keeps the wizard from hanging on anything else.
    let timeout_duration = Duration::from_secs(30);

    let session = match timeout(timeout_duration, Session::connect(config)).await {
        Ok(Ok(session)) => session,
        Ok(Err(e)) => {
            println!("  Failed to connect: {}", e);
            println!();
            return Ok(());
        }
        Err(_) => {
            println!("  Connection timed out after 30 seconds");
            println!();
            return Ok(());
        }
    };

    let health = session.health_check().await;
    match health.mysql_latency_ms {
        Some(ms) => println!("  MySQL: OK ({:.1}ms)", ms),
        None => println!("  MySQL: FAILED"),
    }
    if let Some(ref err) = health.mysql_error {
        println!("    Error: {}", err);
    }
    println!(
        "  SQLite: {} ({})",
        if health.sqlite_valid { "OK" } else { "FAILED" },
        health.sqlite_file
    );

    if !health.is_healthy() {
        println!("\n  Warning: One or more connections failed.");
    }

    session.close().await;
    println!();
    Ok(())
}

fn prompt_save_confirm(path: &Path) -> WizardResult<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("Save to {}?", path.display()))
        .default(true)
        .interact()?)
}

fn write_config(config: &Config, path: &Path) -> WizardResult<()> {
    let header = r#"# SQLite / MySQL Bridge Configuration
# Generated by sqlite-mysql-bridge init

"#;

    let yaml = serde_yaml::to_string(config).map_err(|e| WizardError::Config(e.to_string()))?;

    std::fs::write(path, format!("{}{}", header, yaml))?;

    Ok(())
}
