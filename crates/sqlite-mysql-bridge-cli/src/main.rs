//! sqlite-mysql-bridge CLI - Copy tables between SQLite files and MySQL.

mod wizard;

use clap::{Parser, Subcommand};
use serde_json::json;
use sqlite_mysql_bridge::{BridgeError, Config, Session, TransferPlan};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "sqlite-mysql-bridge")]
#[command(about = "Copy table data between a SQLite file and a MySQL database")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or edit a configuration file interactively
    Init {
        /// Output path for configuration file [default: config.yaml]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite existing file without confirmation
        #[arg(long, short)]
        force: bool,
    },

    /// Test both database connections
    Check,

    /// List the source side's tables
    Tables,

    /// Show column headers and every row of one source table
    Preview {
        /// Table name
        table: String,
    },

    /// Assemble and show the transfer plan without running it
    Plan {
        /// Comma-separated table names to transfer
        #[arg(long)]
        tables: Option<String>,

        /// Transfer every table on the source side
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_warning() {
                eprintln!("Warning: {}", e);
            } else {
                eprintln!("{}", e.format_detailed());
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), BridgeError> {
    let cli = Cli::parse();

    // Handle init command separately (doesn't need existing config)
    if let Commands::Init { output, force } = cli.command {
        // No logging setup for wizard - keeps terminal clean for interactive prompts
        let output_path = output.unwrap_or_else(|| PathBuf::from("config.yaml"));
        wizard::run_wizard(&output_path, force)
            .await
            .map_err(|e| BridgeError::Config(e.to_string()))?;
        return Ok(());
    }

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(BridgeError::Config)?;

    let config = Config::load(&cli.config)?.with_auto_tuning();
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Init { .. } => unreachable!(), // Handled above
        Commands::Check => {
            let session = Session::connect(&config).await?;
            let result = session.health_check().await;
            session.close().await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                match result.mysql_latency_ms {
                    Some(ms) => println!("  MySQL: OK ({:.1}ms)", ms),
                    None => println!("  MySQL: FAILED"),
                }
                if let Some(ref err) = result.mysql_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "  SQLite: {} ({})",
                    if result.sqlite_valid { "OK" } else { "FAILED" },
                    result.sqlite_file
                );
                println!(
                    "\n  Overall: {}",
                    if result.is_healthy() { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !result.is_healthy() {
                return Err(BridgeError::Config("Health check failed".to_string()));
            }
        }

        Commands::Tables => {
            let session = Session::connect(&config).await?;
            let tables = session.list_tables().await?.into_result()?;
            session.close().await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                println!(
                    "{} tables on the {} side:",
                    tables.len(),
                    config.direction.source_label()
                );
                for table in &tables {
                    println!("  {}", table);
                }
            }
        }

        Commands::Preview { table } => {
            let session = Session::connect(&config).await?;
            let preview = session.preview(&table).await?.into_result()?;
            session.close().await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                println!(
                    "{} ({} columns, {} rows)",
                    preview.table,
                    preview.column_count(),
                    preview.row_count()
                );
                println!("  {}", preview.columns.join(" | "));
                for row in &preview.rows {
                    println!("  {}", row.join(" | "));
                }
            }
        }

        Commands::Plan { tables, all } => {
            let tables = resolve_plan_tables(&config, tables, all).await?;
            let plan = TransferPlan::from_tables(
                config.direction,
                config.connection.clone(),
                &config.transfer,
                tables,
            )?;

            if cli.output_json {
                let out = json!({
                    "direction": plan.direction,
                    "tables": plan.tables,
                    "chunk_size": plan.options.get_chunk_size(),
                    "options": plan.options,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Transfer Plan:");
                println!("  Direction: {}", plan.direction);
                println!(
                    "  MySQL: {}@{}:{}/{}",
                    plan.profile.user, plan.profile.host, plan.profile.port, plan.profile.database
                );
                println!("  SQLite: {}", plan.profile.sqlite_file.display());
                println!("  Tables: {}", plan.tables.join(", "));
                println!("  Chunk size: {}", plan.options.get_chunk_size());
                if plan.direction.sqlite_is_source() {
                    println!("  Integer type: {}", plan.options.mysql_integer_type);
                    println!("  String type: {}", plan.options.mysql_string_type);
                }
                let mut flags = Vec::new();
                if plan.options.without_foreign_keys {
                    flags.push("without foreign keys");
                }
                if plan.options.with_rowid {
                    flags.push("with rowid");
                }
                if plan.options.use_fulltext {
                    flags.push("fulltext indexes");
                }
                if plan.options.vacuum {
                    flags.push("vacuum after");
                }
                if plan.options.buffered {
                    flags.push("buffered cursor");
                }
                if !flags.is_empty() {
                    println!("  Flags: {}", flags.join(", "));
                }
                if let Some(ref log_file) = plan.options.log_file {
                    println!("  Log file: {}", log_file.display());
                }
            }
        }
    }

    Ok(())
}

/// Table list for the plan command: explicit --tables, then --all (listed
/// from the source side), then the config file's preselected tables.
async fn resolve_plan_tables(
    config: &Config,
    tables: Option<String>,
    all: bool,
) -> Result<Vec<String>, BridgeError> {
    if let Some(csv) = tables {
        return Ok(csv
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect());
    }

    if all {
        let session = Session::connect(config).await?;
        let tables = session.list_tables().await?.into_result()?;
        session.close().await;
        return Ok(tables);
    }

    Ok(config.tables.clone())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
