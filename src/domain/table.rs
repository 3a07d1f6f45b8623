//! Names of the two persisted tables.

/// Default name of the single-row population counter table.
pub const DEFAULT_SERVER_TABLE: &str = "data_tool_server";

/// Default name of the player identity table.
pub const DEFAULT_PLAYER_TABLE: &str = "data_tool_players";

const MAX_IDENTIFIER_LEN: usize = 64;

/// Resolved table names, shared read-only by the bootstrapper, the sampler
/// and the join-event upserter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub server_counter: String,
    pub player_identity: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            server_counter: DEFAULT_SERVER_TABLE.to_string(),
            player_identity: DEFAULT_PLAYER_TABLE.to_string(),
        }
    }
}

/// Whether `name` can be interpolated into a statement as a bare identifier.
///
/// Table names are not bindable parameters, so anything that reaches SQL
/// text must pass this check first.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_names() {
        let names = TableNames::default();
        assert_eq!(names.server_counter, "data_tool_server");
        assert_eq!(names.player_identity, "data_tool_players");
    }

    #[test]
    fn identifier_accepts_plain_names() {
        assert!(is_identifier("data_tool_players"));
        assert!(is_identifier("_stats2"));
    }

    #[test]
    fn identifier_rejects_injection_and_empty() {
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("players; DROP TABLE x"));
        assert!(!is_identifier("data-tool"));
        assert!(!is_identifier(&"a".repeat(65)));
    }
}
