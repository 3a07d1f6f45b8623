//! Dialect-specific statement text for the two telemetry tables.
//!
//! Table names are interpolated, never bound, so they must already have
//! passed [`is_identifier`](crate::domain::is_identifier) during config
//! resolution.

use crate::domain::{
    CounterRecord, Driver, IdentityRecord, Row, TableNames, Value, COUNTER_ROW_ID,
};
use crate::error::ExecutionError;

/// Statement templates bound to one dialect and one pair of table names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statements {
    driver: Driver,
    tables: TableNames,
}

impl Statements {
    #[must_use]
    pub fn new(driver: Driver, tables: TableNames) -> Self {
        Self { driver, tables }
    }

    #[must_use]
    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    /// Single-row counter table keyed by a fixed id.
    #[must_use]
    pub fn create_counter_table(&self) -> String {
        let table = &self.tables.server_counter;
        match self.driver {
            Driver::MySql => format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 ID INT NOT NULL PRIMARY KEY, \
                 player_count INT NOT NULL CHECK (player_count >= 0)\
                 ) ENGINE = InnoDB"
            ),
            Driver::Sqlite => format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 ID INTEGER NOT NULL PRIMARY KEY, \
                 player_count INTEGER NOT NULL CHECK (player_count >= 0)\
                 )"
            ),
        }
    }

    /// Identity table with a surrogate key and a unique uuid.
    #[must_use]
    pub fn create_identity_table(&self) -> String {
        let table = &self.tables.player_identity;
        match self.driver {
            // MySQL cannot index an unbounded TEXT column; a hyphenated uuid is 36 chars.
            Driver::MySql => format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 ID INT NOT NULL PRIMARY KEY AUTO_INCREMENT, \
                 uuid VARCHAR(36) NOT NULL UNIQUE, \
                 name VARCHAR(16) NOT NULL\
                 ) ENGINE = InnoDB"
            ),
            Driver::Sqlite => format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 ID INTEGER PRIMARY KEY AUTOINCREMENT, \
                 uuid TEXT NOT NULL UNIQUE, \
                 name VARCHAR(16) NOT NULL\
                 )"
            ),
        }
    }

    /// Parameters: `(id, count, count)`.
    #[must_use]
    pub fn upsert_counter(&self) -> String {
        let table = &self.tables.server_counter;
        match self.driver {
            Driver::MySql => format!(
                "INSERT INTO {table} (ID, player_count) VALUES (?, ?) \
                 ON DUPLICATE KEY UPDATE player_count = ?"
            ),
            Driver::Sqlite => format!(
                "INSERT INTO {table} (ID, player_count) VALUES (?, ?) \
                 ON CONFLICT (ID) DO UPDATE SET player_count = ?"
            ),
        }
    }

    /// Parameters bound to [`upsert_counter`](Self::upsert_counter).
    #[must_use]
    pub fn counter_params(record: CounterRecord) -> [Value; 3] {
        [
            Value::from(record.id),
            Value::from(record.player_count),
            Value::from(record.player_count),
        ]
    }

    /// Parameters: `(uuid, name, name)`.
    #[must_use]
    pub fn upsert_identity(&self) -> String {
        let table = &self.tables.player_identity;
        match self.driver {
            Driver::MySql => format!(
                "INSERT INTO {table} (uuid, name) VALUES (?, ?) \
                 ON DUPLICATE KEY UPDATE name = ?"
            ),
            Driver::Sqlite => format!(
                "INSERT INTO {table} (uuid, name) VALUES (?, ?) \
                 ON CONFLICT (uuid) DO UPDATE SET name = ?"
            ),
        }
    }

    #[must_use]
    pub fn select_counter(&self) -> String {
        format!(
            "SELECT ID, player_count FROM {} WHERE ID = {COUNTER_ROW_ID}",
            self.tables.server_counter
        )
    }

    #[must_use]
    pub fn select_identities(&self) -> String {
        format!(
            "SELECT ID, uuid, name FROM {} ORDER BY ID",
            self.tables.player_identity
        )
    }
}

fn column_int(row: &Row, index: usize) -> Result<i64, ExecutionError> {
    row.get(index)
        .and_then(Value::as_int)
        .ok_or_else(|| ExecutionError::Other(format!("column {index} is not an integer")))
}

fn column_text(row: &Row, index: usize) -> Result<String, ExecutionError> {
    row.get(index)
        .and_then(Value::as_text)
        .map(str::to_string)
        .ok_or_else(|| ExecutionError::Other(format!("column {index} is not text")))
}

/// Decode a row selected by [`Statements::select_counter`].
pub fn counter_from_row(row: &Row) -> Result<CounterRecord, ExecutionError> {
    let id = column_int(row, 0)?;
    let count = column_int(row, 1)?;
    Ok(CounterRecord {
        id: i32::try_from(id).map_err(|e| ExecutionError::Other(e.to_string()))?,
        player_count: u32::try_from(count).map_err(|e| ExecutionError::Other(e.to_string()))?,
    })
}

/// Decode a row selected by [`Statements::select_identities`].
pub fn identity_from_row(row: &Row) -> Result<IdentityRecord, ExecutionError> {
    Ok(IdentityRecord {
        id: column_int(row, 0)?,
        uuid: column_text(row, 1)?,
        name: column_text(row, 2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Command;

    fn statements(driver: Driver) -> Statements {
        Statements::new(driver, TableNames::default())
    }

    #[test]
    fn mysql_upserts_use_duplicate_key_update() {
        let s = statements(Driver::MySql);
        assert_eq!(
            s.upsert_counter(),
            "INSERT INTO data_tool_server (ID, player_count) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE player_count = ?"
        );
        assert!(s.upsert_identity().contains("ON DUPLICATE KEY UPDATE name = ?"));
    }

    #[test]
    fn sqlite_upserts_use_on_conflict() {
        let s = statements(Driver::Sqlite);
        assert!(s.upsert_counter().contains("ON CONFLICT (ID) DO UPDATE"));
        assert!(s.upsert_identity().contains("ON CONFLICT (uuid) DO UPDATE"));
    }

    #[test]
    fn schema_is_create_if_not_exists_for_both_dialects() {
        for driver in [Driver::MySql, Driver::Sqlite] {
            let s = statements(driver);
            assert!(s.create_counter_table().starts_with("CREATE TABLE IF NOT EXISTS data_tool_server"));
            assert!(s.create_identity_table().starts_with("CREATE TABLE IF NOT EXISTS data_tool_players"));
        }
        assert!(statements(Driver::MySql).create_identity_table().contains("AUTO_INCREMENT"));
        assert!(statements(Driver::Sqlite).create_identity_table().contains("AUTOINCREMENT"));
    }

    #[test]
    fn upsert_templates_take_three_parameters() {
        for driver in [Driver::MySql, Driver::Sqlite] {
            let s = statements(driver);
            assert_eq!(Command::new(s.upsert_counter()).placeholder_count(), 3);
            assert_eq!(Command::new(s.upsert_identity()).placeholder_count(), 3);
        }
    }

    #[test]
    fn custom_table_names_are_used() {
        let s = Statements::new(
            Driver::Sqlite,
            TableNames {
                server_counter: "srv".into(),
                player_identity: "ppl".into(),
            },
        );
        assert!(s.select_counter().contains("FROM srv"));
        assert!(s.select_identities().contains("FROM ppl"));
    }

    #[test]
    fn decodes_rows_into_records() {
        let counter = counter_from_row(&vec![Value::Int(1), Value::Int(7)]).unwrap();
        assert_eq!(counter, CounterRecord::new(7));

        let identity =
            identity_from_row(&vec![Value::Int(3), Value::from("abc-123"), Value::from("Alice")])
                .unwrap();
        assert_eq!(identity.uuid, "abc-123");
        assert_eq!(identity.name, "Alice");
        assert!(identity_from_row(&vec![Value::Int(3)]).is_err());
    }
}
