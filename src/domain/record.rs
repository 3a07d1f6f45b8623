//! Persisted row shapes.

/// Primary key of the only row in the counter table.
pub const COUNTER_ROW_ID: i32 = 1;

/// The single population counter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRecord {
    pub id: i32,
    pub player_count: u32,
}

impl CounterRecord {
    #[must_use]
    pub const fn new(player_count: u32) -> Self {
        Self {
            id: COUNTER_ROW_ID,
            player_count,
        }
    }
}

/// One row per distinct player.
///
/// `uuid` is the natural key and never changes; `name` is overwritten on
/// every join. `id` is the surrogate key assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub id: i64,
    pub uuid: String,
    pub name: String,
}
