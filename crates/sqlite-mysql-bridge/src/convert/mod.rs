//! Transfer delegation to external converters.
//!
//! The bridge does not implement schema translation, type mapping, or row
//! copying itself; both directions are owned by an external [`Converter`]
//! supplied through a [`ConverterFactory`]. This module assembles the flat
//! option set a converter is constructed from and runs its single blocking
//! transfer call as a one-shot task.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::{ConnectionProfile, Direction, TransferOptions};
use crate::error::{BridgeError, Result};
use crate::selection::TableSelection;
use crate::task::{self, TaskGate, TaskHandle};

/// One-directional table copier. Implementations wrap the external transfer
/// engines; `transfer` blocks until every planned table has been copied, or
/// fails with a descriptive error. No progress reporting, no partial
/// completion, no cancellation.
pub trait Converter: Send {
    fn transfer(&mut self) -> Result<()>;
}

/// Builds the converter variant matching a plan's direction.
pub trait ConverterFactory: Send + Sync {
    fn create(&self, plan: &TransferPlan) -> Result<Box<dyn Converter>>;
}

/// Everything a converter is constructed from: direction, credentials, the
/// resolved option set, and a non-empty table list. Immutable once built.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    pub direction: Direction,
    pub profile: ConnectionProfile,
    pub options: TransferOptions,
    pub tables: Vec<String>,
}

impl TransferPlan {
    /// Build a plan from the checked entries of a selection. Fails with the
    /// warning-class [`BridgeError::EmptySelection`] when nothing is
    /// checked; the converter is never constructed in that case.
    pub fn new(
        direction: Direction,
        profile: ConnectionProfile,
        options: &TransferOptions,
        selection: &TableSelection,
    ) -> Result<Self> {
        Self::from_tables(direction, profile, options, selection.checked_tables())
    }

    /// Build a plan from an explicit table list (non-interactive use).
    pub fn from_tables(
        direction: Direction,
        profile: ConnectionProfile,
        options: &TransferOptions,
        tables: Vec<String>,
    ) -> Result<Self> {
        if tables.is_empty() {
            return Err(BridgeError::EmptySelection);
        }

        // Resolve "Default" type selections to their literal fallbacks and
        // clear the fields this direction hides, so converters only ever
        // see concrete values.
        let mut options = options.normalized(direction);
        options.mysql_integer_type = options.resolved_integer_type().to_string();
        options.mysql_string_type = options.resolved_string_type().to_string();

        Ok(Self {
            direction,
            profile,
            options,
            tables,
        })
    }
}

/// Result payload of a completed transfer task.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    pub direction: Direction,
    pub tables: Vec<String>,
    pub duration_seconds: f64,
}

/// Run a plan's transfer on the blocking pool as a one-shot task. The
/// outcome is exactly one of the success report or a non-empty failure
/// message.
pub fn run_transfer(
    factory: Arc<dyn ConverterFactory>,
    plan: TransferPlan,
    gate: &TaskGate,
) -> Result<TaskHandle<TransferReport>> {
    task::spawn_blocking("transfer", gate, move || {
        let start = Instant::now();
        let mut converter = factory.create(&plan)?;
        converter.transfer()?;

        let report = TransferReport {
            direction: plan.direction,
            tables: plan.tables,
            duration_seconds: start.elapsed().as_secs_f64(),
        };
        info!(
            "Transferred {} tables ({}) in {:.2}s",
            report.tables.len(),
            report.direction,
            report.duration_seconds
        );
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskOutcome;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn profile() -> ConnectionProfile {
        ConnectionProfile {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: "password".to_string(),
            database: "shop".to_string(),
            sqlite_file: PathBuf::from("shop.db"),
            connect_timeout_secs: 5,
        }
    }

    struct StubConverter {
        fail_with: Option<String>,
    }

    impl Converter for StubConverter {
        fn transfer(&mut self) -> Result<()> {
            match self.fail_with.take() {
                Some(message) => Err(BridgeError::transfer(message)),
                None => Ok(()),
            }
        }
    }

    /// Counts constructions so tests can assert the converter is never
    /// built for an empty selection.
    struct CountingFactory {
        created: AtomicUsize,
        fail_with: Option<String>,
    }

    impl CountingFactory {
        fn new(fail_with: Option<String>) -> Self {
            Self {
                created: AtomicUsize::new(0),
                fail_with,
            }
        }
    }

    impl ConverterFactory for CountingFactory {
        fn create(&self, _plan: &TransferPlan) -> Result<Box<dyn Converter>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubConverter {
                fail_with: self.fail_with.clone(),
            }))
        }
    }

    #[test]
    fn test_empty_selection_is_a_warning_and_builds_no_plan() {
        let selection = TableSelection::from_tables(["a".to_string(), "b".to_string()]);
        let err = TransferPlan::new(
            Direction::SqliteToMysql,
            profile(),
            &TransferOptions::default(),
            &selection,
        )
        .unwrap_err();

        assert!(matches!(err, BridgeError::EmptySelection));
        assert!(err.is_warning());
    }

    #[test]
    fn test_plan_resolves_default_types() {
        let mut selection = TableSelection::from_tables(["a".to_string()]);
        selection.set_all(true);

        let plan = TransferPlan::new(
            Direction::SqliteToMysql,
            profile(),
            &TransferOptions::default(),
            &selection,
        )
        .unwrap();

        assert_eq!(plan.options.mysql_integer_type, "INT(11)");
        assert_eq!(plan.options.mysql_string_type, "VARCHAR(255)");
        assert_eq!(plan.tables, vec!["a"]);
    }

    #[test]
    fn test_plan_normalizes_for_direction() {
        let options = TransferOptions {
            vacuum: true,
            buffered: true,
            with_rowid: true,
            ..Default::default()
        };
        let plan = TransferPlan::from_tables(
            Direction::SqliteToMysql,
            profile(),
            &options,
            vec!["a".to_string()],
        )
        .unwrap();

        assert!(plan.options.with_rowid);
        assert!(!plan.options.vacuum);
        assert!(!plan.options.buffered);
    }

    #[tokio::test]
    async fn test_transfer_success_outcome() {
        let factory = Arc::new(CountingFactory::new(None));
        let plan = TransferPlan::from_tables(
            Direction::MysqlToSqlite,
            profile(),
            &TransferOptions::default(),
            vec!["orders".to_string()],
        )
        .unwrap();

        let gate = TaskGate::new();
        let handle = run_transfer(factory.clone(), plan, &gate).unwrap();

        match handle.outcome().await {
            TaskOutcome::Succeeded(report) => {
                assert_eq!(report.tables, vec!["orders"]);
                assert_eq!(report.direction, Direction::MysqlToSqlite);
            }
            TaskOutcome::Failed(message) => panic!("unexpected failure: {}", message),
        }
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transfer_failure_outcome_is_nonempty_message() {
        let factory = Arc::new(CountingFactory::new(Some("disk full".to_string())));
        let plan = TransferPlan::from_tables(
            Direction::SqliteToMysql,
            profile(),
            &TransferOptions::default(),
            vec!["orders".to_string()],
        )
        .unwrap();

        let gate = TaskGate::new();
        let handle = run_transfer(factory, plan, &gate).unwrap();

        match handle.outcome().await {
            TaskOutcome::Failed(message) => {
                assert!(!message.is_empty());
                assert!(message.contains("disk full"));
            }
            TaskOutcome::Succeeded(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_transfer_is_rejected_while_running() {
        struct SlowFactory;
        struct SlowConverter;

        impl Converter for SlowConverter {
            fn transfer(&mut self) -> Result<()> {
                std::thread::sleep(std::time::Duration::from_millis(100));
                Ok(())
            }
        }

        impl ConverterFactory for SlowFactory {
            fn create(&self, _plan: &TransferPlan) -> Result<Box<dyn Converter>> {
                Ok(Box::new(SlowConverter))
            }
        }

        let factory: Arc<dyn ConverterFactory> = Arc::new(SlowFactory);
        let plan = TransferPlan::from_tables(
            Direction::SqliteToMysql,
            profile(),
            &TransferOptions::default(),
            vec!["orders".to_string()],
        )
        .unwrap();

        let gate = TaskGate::new();
        let first = run_transfer(factory.clone(), plan.clone(), &gate).unwrap();
        let second = run_transfer(factory, plan, &gate);
        assert!(matches!(second, Err(BridgeError::TaskInFlight("transfer"))));

        assert!(first.outcome().await.is_success());
    }
}
