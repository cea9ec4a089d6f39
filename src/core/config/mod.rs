//! Persistent client settings stored as TOML in the platform config directory.

pub mod data;
pub mod io;
pub mod printing;

pub use data::{Config, ConfigKey, DEFAULT_SERVER_URL};
pub use io::{ConfigError, ConfigStore};
