//! Reading and writing `config.toml`.
//!
//! [`ConfigStore`] owns the file location so tests can point it at a temp
//! directory; [`Config::load`] and [`Config::save`] use the platform one.

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::Builder;

use crate::core::config::data::{path_display, Config};

#[derive(Debug)]
pub enum ConfigError {
    /// The platform reported no configuration directory.
    NoConfigDir,
    Unreadable { path: PathBuf, source: io::Error },
    Malformed { path: PathBuf, source: toml::de::Error },
    Unwritable { path: PathBuf, source: io::Error },
    Encode(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoConfigDir => f.write_str("no configuration directory on this system"),
            ConfigError::Unreadable { path, source } => {
                write!(f, "cannot read {}: {source}", path_display(path))
            }
            ConfigError::Malformed { path, source } => {
                write!(f, "{} is not valid config TOML: {source}", path_display(path))
            }
            ConfigError::Unwritable { path, source } => {
                write!(f, "cannot write {}: {source}", path_display(path))
            }
            ConfigError::Encode(source) => write!(f, "cannot encode config: {source}"),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::NoConfigDir => None,
            ConfigError::Unreadable { source, .. } | ConfigError::Unwritable { source, .. } => {
                Some(source)
            }
            ConfigError::Malformed { source, .. } => Some(source),
            ConfigError::Encode(source) => Some(source),
        }
    }
}

/// A config file at a fixed location.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform config dir>/companion-chat/config.toml`
    pub fn platform() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("org", "companion", "companion-chat")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::at(dirs.config_dir().join("config.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty config.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Unreadable {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Write to a sibling temp file, then rename over the old config.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let encoded = toml::to_string_pretty(config).map_err(ConfigError::Encode)?;
        let unwritable = |source: io::Error| ConfigError::Unwritable {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(unwritable)?;

        let mut staged = Builder::new()
            .prefix(".config-")
            .suffix(".toml")
            .tempfile_in(dir)
            .map_err(unwritable)?;
        staged.write_all(encoded.as_bytes()).map_err(unwritable)?;
        staged.as_file().sync_all().map_err(unwritable)?;
        staged
            .persist(&self.path)
            .map_err(|err| unwritable(err.error))?;
        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        ConfigStore::platform()?.load()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        ConfigStore::platform()?.save(self)
    }
}
