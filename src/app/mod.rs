//! Application layer - configuration, logging, and the plugin lifecycle.

pub mod config;
mod logging;
mod plugin;

pub use config::{
    write_default, ConfigMap, ExecutorConfig, RetryConfig, SamplerConfig, Settings,
    DEFAULT_CONFIG, DEFAULT_CONFIG_PATH,
};
pub use logging::LoggingConfig;
pub use plugin::DataTool;
