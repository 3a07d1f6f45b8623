//! Schema bootstrap.

use tracing::{debug, info};

use super::executor::Executor;
use super::statement::Statements;
use crate::error::ExecutionError;

/// Create both telemetry tables if they are absent.
///
/// Runs synchronously so nothing that writes to the tables starts before
/// they exist. Safe to call on every startup.
pub fn ensure_tables(executor: &Executor, statements: &Statements) -> Result<(), ExecutionError> {
    let tables = statements.tables();

    executor.build(statements.create_counter_table()).execute_sync()?;
    debug!(table = %tables.server_counter, "Counter table ready");

    executor.build(statements.create_identity_table()).execute_sync()?;
    debug!(table = %tables.player_identity, "Identity table ready");

    info!(
        server_table = %tables.server_counter,
        player_table = %tables.player_identity,
        "Schema verified"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapter::sql::SqlSupervisor;
    use crate::domain::{Driver, TableNames};
    use crate::port::Database;
    use crate::testkit;

    fn setup() -> (tokio::runtime::Runtime, Executor) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let db = Arc::new(SqlSupervisor::new());
        rt.block_on(db.open(&testkit::config::sqlite_memory())).unwrap();
        let exec = Executor::new(db, rt.handle().clone());
        (rt, exec)
    }

    #[test]
    fn ensure_tables_is_idempotent() {
        let (_rt, exec) = setup();
        let statements = Statements::new(Driver::Sqlite, TableNames::default());

        ensure_tables(&exec, &statements).unwrap();
        ensure_tables(&exec, &statements).unwrap();

        let rows = exec
            .build(
                "SELECT name FROM sqlite_master WHERE type = 'table' \
                 AND name IN ('data_tool_server', 'data_tool_players') ORDER BY name",
            )
            .fetch_sync()
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn counter_table_rejects_negative_counts() {
        let (_rt, exec) = setup();
        let statements = Statements::new(Driver::Sqlite, TableNames::default());
        ensure_tables(&exec, &statements).unwrap();

        let result = exec
            .build(statements.upsert_counter())
            .bind(1)
            .bind(-1)
            .bind(-1)
            .execute_sync();
        assert!(result.is_err());
    }

    #[test]
    fn stops_at_first_failure() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let db = Arc::new(testkit::database::RecordingDatabase::open().failing_execute());
        let exec = Executor::new(db.clone(), rt.handle().clone());
        let statements = Statements::new(Driver::MySql, TableNames::default());

        assert!(ensure_tables(&exec, &statements).is_err());
        assert_eq!(db.commands().len(), 1);
    }
}
