//! Config file loading
//!
//! The file is a TOML document. `defaults` holds per-directive default
//! tables; every other top-level key is a directive, run in file order.

use crate::types::SyncError;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level key reserved for per-directive defaults
pub const DEFAULTS_KEY: &str = "defaults";

/// A loaded config file
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    /// `defaults.<directive>` tables
    pub defaults: toml::Table,

    /// Directives in file order
    pub tasks: Vec<(String, toml::Value)>,
}

impl ConfigFile {
    /// Read and parse a config file from disk
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse config file contents
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        let table: toml::Table = toml::from_str(text)?;
        let mut config = ConfigFile::default();

        for (key, value) in table {
            if key == DEFAULTS_KEY {
                config.defaults = match value {
                    toml::Value::Table(defaults) => defaults,
                    other => {
                        return Err(SyncError::Config(format!(
                            "`{DEFAULTS_KEY}` must be a table, found {}",
                            other.type_str()
                        )))
                    }
                };
            } else {
                config.tasks.push((key, value));
            }
        }

        Ok(config)
    }
}

/// What a plugin gets to see of the invocation
#[derive(Debug, Clone)]
pub struct Context {
    base_directory: PathBuf,
    defaults: toml::Table,
    dry_run: bool,
}

impl Context {
    pub fn new(base_directory: impl Into<PathBuf>, defaults: toml::Table) -> Self {
        Self {
            base_directory: base_directory.into(),
            defaults,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Directory relative source paths are resolved against
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Defaults table for one directive, if the config file has one
    pub fn defaults_for(&self, directive: &str) -> Option<&toml::Value> {
        self.defaults.get(directive)
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
