//! Command-line interface

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Synchronize dotfiles into place with rsync
#[derive(Debug, Clone, Parser)]
#[command(name = "dotsync", version, about, long_about = None)]
pub struct Cli {
    /// Config file to run
    #[arg(short = 'c', long = "config-file", default_value = "dotsync.toml")]
    pub config_file: PathBuf,

    /// Base directory for relative source paths (defaults to the config file's directory)
    #[arg(short = 'd', long = "base-directory")]
    pub base_directory: Option<PathBuf>,

    /// Log what would be done without touching the filesystem
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Only run these directives
    #[arg(long, value_delimiter = ',', conflicts_with = "except")]
    pub only: Vec<String>,

    /// Skip these directives
    #[arg(long, value_delimiter = ',')]
    pub except: Vec<String>,

    /// More output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["dotsync"]);
        assert_eq!(cli.config_file, PathBuf::from("dotsync.toml"));
        assert!(cli.base_directory.is_none());
        assert!(!cli.dry_run);
        assert!(cli.only.is_empty());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_directive_filters_split_on_commas() {
        let cli = Cli::parse_from(["dotsync", "--except", "link,shell", "-vv"]);
        assert_eq!(cli.except, vec!["link", "shell"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_only_conflicts_with_except() {
        let result = Cli::try_parse_from(["dotsync", "--only", "sync", "--except", "link"]);
        assert!(result.is_err());
    }
}
