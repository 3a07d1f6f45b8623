//! Backend-agnostic domain types: connection parameters, table names,
//! statements, persisted records and player identity values.

mod command;
mod connection;
mod player;
mod record;
mod table;

pub use command::{Command, Row, Value};
pub use connection::{ConnectionConfig, Driver};
pub use player::{PlayerId, PlayerName, MAX_NAME_LEN};
pub use record::{CounterRecord, IdentityRecord, COUNTER_ROW_ID};
pub use table::{is_identifier, TableNames, DEFAULT_PLAYER_TABLE, DEFAULT_SERVER_TABLE};
