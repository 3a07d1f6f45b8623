//! Connection parameters for the supervised database.

use std::fmt;
use std::str::FromStr;

/// Supported database backends.
///
/// The driver also selects the SQL dialect used by the statement builders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Driver {
    #[default]
    MySql,
    Sqlite,
}

impl Driver {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown driver '{other}'")),
        }
    }
}

/// Resolved connection parameters. Immutable once resolved.
///
/// For [`Driver::Sqlite`] only `database` is meaningful: it is the database
/// file path, or `:memory:`.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub driver: Driver,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Require TLS to the server.
    pub use_encryption: bool,
    /// Number of connections the supervisor keeps open (1 = single handle).
    pub pool_size: u32,
}

impl ConnectionConfig {
    /// Human-readable target for log lines. Never includes the password.
    #[must_use]
    pub fn target(&self) -> String {
        match self.driver {
            Driver::MySql => format!(
                "{}@{}:{}/{}",
                self.username, self.host, self.port, self.database
            ),
            Driver::Sqlite => self.database.clone(),
        }
    }
}

// Manual impl keeps the password out of logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("use_encryption", &self.use_encryption)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mysql() -> ConnectionConfig {
        ConnectionConfig {
            driver: Driver::MySql,
            host: "db.internal".into(),
            port: 3307,
            database: "stats".into(),
            username: "collector".into(),
            password: "hunter2".into(),
            use_encryption: false,
            pool_size: 1,
        }
    }

    #[test]
    fn driver_parses_case_insensitively() {
        assert_eq!("MySQL".parse::<Driver>(), Ok(Driver::MySql));
        assert_eq!(" sqlite ".parse::<Driver>(), Ok(Driver::Sqlite));
        assert_eq!("mariadb".parse::<Driver>(), Ok(Driver::MySql));
        assert!("postgres".parse::<Driver>().is_err());
    }

    #[test]
    fn target_omits_password() {
        let config = mysql();
        assert_eq!(config.target(), "collector@db.internal:3307/stats");
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn sqlite_target_is_the_path() {
        let config = ConnectionConfig {
            driver: Driver::Sqlite,
            database: ":memory:".into(),
            ..mysql()
        };
        assert_eq!(config.target(), ":memory:");
    }
}
