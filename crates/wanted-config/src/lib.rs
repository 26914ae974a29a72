pub mod config;
pub mod paths;

pub use config::{Config, LoggingConfig, PollerConfig, ServerConfig, ServiceDefaults, UiConfig};
pub use paths::{PathManager, container_base_path};
