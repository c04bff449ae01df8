//! Effective per-record configuration

use crate::identity::IdentityResolver;
use crate::types::{Mode, SourceSpec, SyncError, SyncRecord, SyncSettings};
use nix::unistd::{Gid, Uid};

/// Sync tool used when nothing else is configured
pub const DEFAULT_TOOL: &str = "rsync";

/// Extra options used when nothing else is configured
pub const DEFAULT_OPTIONS: [&str; 2] = ["--delete", "--safe-links"];

/// Fully resolved configuration for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    /// Source path expression (may be a glob)
    pub path: String,
    pub create: bool,
    pub tool: String,
    pub options: Vec<String>,
    pub file_mode: Mode,
    pub dir_mode: Mode,
    pub owner: String,
    pub group: String,
    pub uid: Uid,
    pub gid: Gid,
}

impl EffectiveConfig {
    /// Merge built-ins, then `defaults`, then the record's own overrides,
    /// and resolve owner/group to numeric ids.
    ///
    /// Fails with [`SyncError::MissingField`] when an extended record has
    /// no `path`, and with [`SyncError::IdentityNotFound`] when the owner
    /// or group does not exist.
    pub fn resolve(
        defaults: &SyncSettings,
        record: &SyncRecord,
        identities: &dyn IdentityResolver,
    ) -> Result<Self, SyncError> {
        let (path, settings) = match &record.source {
            SourceSpec::Bare(path) => (path.clone(), defaults.clone()),
            SourceSpec::Extended(spec) => {
                let path = spec.path.clone().ok_or_else(|| SyncError::MissingField {
                    destination: record.destination.clone(),
                    field: "path",
                })?;
                (path, defaults.overlay(&spec.settings))
            }
        };

        let owner = match settings.owner {
            Some(owner) => owner,
            None => identities.default_user()?,
        };
        let group = match settings.group {
            Some(group) => group,
            None => identities.default_group()?,
        };
        let uid = identities.resolve_user(&owner)?;
        let gid = identities.resolve_group(&group)?;

        Ok(Self {
            path,
            create: settings.create.unwrap_or(false),
            tool: settings.tool.unwrap_or_else(|| DEFAULT_TOOL.to_string()),
            options: settings
                .options
                .unwrap_or_else(|| DEFAULT_OPTIONS.iter().map(|s| s.to_string()).collect()),
            file_mode: settings.file_mode.unwrap_or(Mode::FILE),
            dir_mode: settings.dir_mode.unwrap_or(Mode::DIR),
            owner,
            group,
            uid,
            gid,
        })
    }
}
