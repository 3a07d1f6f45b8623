//! Join-event upserter.

use tracing::debug;

use super::executor::Executor;
use super::statement::Statements;
use crate::domain::Value;
use crate::port::{JoinListener, PlayerJoin};

/// Records each connecting player's uuid and current name.
///
/// The handler only builds and submits an async upsert, so it never blocks
/// the host's event dispatch.
pub struct IdentityUpserter {
    executor: Executor,
    sql: String,
}

impl IdentityUpserter {
    #[must_use]
    pub fn new(executor: Executor, statements: &Statements) -> Self {
        Self {
            executor,
            sql: statements.upsert_identity(),
        }
    }
}

impl JoinListener for IdentityUpserter {
    fn name(&self) -> &'static str {
        "identity-upserter"
    }

    fn on_join(&self, event: &PlayerJoin) {
        let uuid = event.id.to_string();
        let name = event.name.as_str();
        debug!(uuid = %uuid, name = %name, "Recording player identity");

        self.executor
            .build(self.sql.as_str())
            .with_parameters([Value::from(uuid), Value::from(name), Value::from(name)])
            .execute_async();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use uuid::Uuid;

    use super::*;
    use crate::domain::{Driver, TableNames};
    use crate::testkit::database::RecordingDatabase;

    #[test]
    fn submits_uuid_and_name() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let db = Arc::new(RecordingDatabase::open());
        let exec = Executor::new(db.clone(), rt.handle().clone());
        let upserter = IdentityUpserter::new(
            exec.clone(),
            &Statements::new(Driver::MySql, TableNames::default()),
        );

        let uuid = Uuid::new_v4();
        upserter.on_join(&PlayerJoin::new(uuid, "Alice"));
        assert!(exec.wait_idle(Duration::from_secs(5)));

        let commands = db.commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].sql().starts_with("INSERT INTO data_tool_players"));
        assert_eq!(
            commands[0].params(),
            &[
                Value::Text(uuid.to_string()),
                Value::from("Alice"),
                Value::from("Alice")
            ]
        );
    }
}
