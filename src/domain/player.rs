//! Player identity values delivered by the host.

use std::fmt;

use uuid::Uuid;

/// Width of the `name` column.
pub const MAX_NAME_LEN: usize = 16;

/// Stable unique player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(Uuid);

impl PlayerId {
    #[must_use]
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// Hyphenated lowercase form, as stored in the identity table.
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl From<Uuid> for PlayerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Display name bounded to [`MAX_NAME_LEN`] characters.
///
/// Longer input is truncated on a character boundary so the write is never
/// rejected by the column width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.char_indices().nth(MAX_NAME_LEN) {
            Some((cut, _)) => Self(name[..cut].to_string()),
            None => Self(name),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
