//! Error types for dotsync

use std::fmt;
use thiserror::Error;

/// Which identity database an owner lookup went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    User,
    Group,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKind::User => f.write_str("user"),
            IdentityKind::Group => f.write_str("group"),
        }
    }
}

/// Error types for dotsync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file is not valid TOML or does not match the expected shape
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Extended record without a required field
    #[error("Missing field `{field}` in record for {destination}")]
    MissingField {
        destination: String,
        field: &'static str,
    },

    /// Owner or group name unknown to the system
    #[error("No such {kind}: {name}")]
    IdentityNotFound { kind: IdentityKind, name: String },

    /// The identity database itself could not be queried
    #[error("Failed to look up {name}: {source}")]
    IdentityLookup {
        name: String,
        #[source]
        source: nix::Error,
    },

    /// Mode that is not a sequence of octal digits
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    /// Directive handed to a plugin that does not handle it
    #[error("Unsupported directive: {0}")]
    UnsupportedDirective(String),
}

impl SyncError {
    /// Check if this error must abort the whole run
    ///
    /// A directive a plugin turns down only fails that directive; per-path
    /// failures never surface as errors at all.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SyncError::UnsupportedDirective(_))
    }

    /// Check if this error comes from the user's configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::Config(_)
                | SyncError::Parse(_)
                | SyncError::MissingField { .. }
                | SyncError::InvalidMode(_)
        )
    }

    /// Check if this error is related to owner/group resolution
    pub fn is_identity_error(&self) -> bool {
        matches!(
            self,
            SyncError::IdentityNotFound { .. } | SyncError::IdentityLookup { .. }
        )
    }
}
