//! Configuration management

mod cli;
mod file;
mod merge;

pub use cli::Cli;
pub use file::{ConfigFile, Context, DEFAULTS_KEY};
pub use merge::{EffectiveConfig, DEFAULT_OPTIONS, DEFAULT_TOOL};

use crate::types::SyncError;
use std::path::{Path, PathBuf};

/// Global configuration for one dotsync invocation
#[derive(Debug, Clone)]
pub struct Config {
    /// Config file to run
    pub config_file: PathBuf,

    /// Base directory for relative source paths
    pub base_directory: PathBuf,

    /// Dry run (log, don't execute)
    pub dry_run: bool,

    /// Directives to run exclusively (empty = all)
    pub only: Vec<String>,

    /// Directives to skip
    pub except: Vec<String>,

    /// 0 = info, 1 = debug, 2+ = trace
    pub verbosity: u8,

    /// Warnings and errors only
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("dotsync.toml"),
            base_directory: PathBuf::from("."),
            dry_run: false,
            only: Vec::new(),
            except: Vec::new(),
            verbosity: 0,
            quiet: false,
        }
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), SyncError> {
        if !self.config_file.is_file() {
            return Err(SyncError::Config(format!(
                "Config file does not exist: {:?}",
                self.config_file
            )));
        }

        if !self.base_directory.is_dir() {
            return Err(SyncError::Config(format!(
                "Base directory is not a directory: {:?}",
                self.base_directory
            )));
        }

        Ok(())
    }

    /// Whether a directive survives `--only` / `--except`
    pub fn wants(&self, directive: &str) -> bool {
        if !self.only.is_empty() {
            return self.only.iter().any(|d| d == directive);
        }
        !self.except.iter().any(|d| d == directive)
    }
}

impl TryFrom<Cli> for Config {
    type Error = SyncError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let config_file = absolutize(&cli.config_file)?;
        let base_directory = match cli.base_directory {
            Some(dir) => absolutize(&dir)?,
            None => config_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/")),
        };

        let config = Config {
            config_file,
            base_directory,
            dry_run: cli.dry_run,
            only: cli.only,
            except: cli.except,
            verbosity: cli.verbose,
            quiet: cli.quiet,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Make `path` absolute and drop `.` components (`-d .` is the cwd itself)
fn absolutize(path: &Path) -> Result<PathBuf, SyncError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(absolute.components().collect())
}
