//! # dotsync - Declarative dotfile synchronization
//!
//! Keeps destination paths in step with a dotfiles checkout by running
//! `rsync` for every declared record, with ownership and permissions set
//! per record and partial failures reported instead of aborting.

// Module declarations
pub mod commands;
pub mod config;
pub mod executor;
pub mod identity;
pub mod logging;
pub mod paths;
pub mod types;

// Re-export commonly used types
pub use commands::Reconciler;
pub use config::{Config, EffectiveConfig};
pub use identity::{FixedIdentities, IdentityResolver, SystemIdentities};
pub use types::{Mode, SourceSpec, SyncError, SyncRecord, SyncSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
