use thiserror::Error;

/// Configuration-related errors.
///
/// These never abort startup: the resolver logs them and falls back to the
/// documented default for the affected key.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to write default config file: {0}")]
    WriteFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures while establishing or probing the supervised connection.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("failed to open {driver} connection to {target}: {source}")]
    Open {
        driver: &'static str,
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("connection is not open")]
    NotOpen,

    #[error("connection failed after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: Box<ConnectionError> },

    #[error("{0}")]
    Other(String),
}

/// Failures of a single command.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("statement expects {expected} parameter(s), got {actual}")]
    ParameterMismatch { expected: usize, actual: usize },

    #[error("no open connection")]
    NotConnected,

    #[error("statement failed: {0}")]
    Statement(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

/// Invalid state transitions of long-lived components.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("sampler cannot start from state {0}")]
    SamplerNotIdle(&'static str),

    #[error("background runtime unavailable: {0}")]
    Runtime(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
