//! Owner and group name resolution
//!
//! The engine never reads the process identity directly: it asks an
//! [`IdentityResolver`], so tests can swap the system database for a
//! fixed table.

use crate::types::{IdentityKind, SyncError};
use nix::unistd::{Gid, Group, Uid, User};
use std::collections::HashMap;

/// Maps owner/group names to numeric ids and supplies the fallback names.
pub trait IdentityResolver {
    /// Resolve a user name to its uid
    fn resolve_user(&self, name: &str) -> Result<Uid, SyncError>;

    /// Resolve a group name to its gid
    fn resolve_group(&self, name: &str) -> Result<Gid, SyncError>;

    /// Owner used when neither the record nor the defaults name one
    fn default_user(&self) -> Result<String, SyncError>;

    /// Group used when neither the record nor the defaults name one
    fn default_group(&self) -> Result<String, SyncError>;
}

/// The host's passwd/group databases; defaults to the running process's identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentities;

impl IdentityResolver for SystemIdentities {
    fn resolve_user(&self, name: &str) -> Result<Uid, SyncError> {
        User::from_name(name)
            .map_err(|source| SyncError::IdentityLookup {
                name: name.to_string(),
                source,
            })?
            .map(|user| user.uid)
            .ok_or_else(|| not_found(IdentityKind::User, name))
    }

    fn resolve_group(&self, name: &str) -> Result<Gid, SyncError> {
        Group::from_name(name)
            .map_err(|source| SyncError::IdentityLookup {
                name: name.to_string(),
                source,
            })?
            .map(|group| group.gid)
            .ok_or_else(|| not_found(IdentityKind::Group, name))
    }

    fn default_user(&self) -> Result<String, SyncError> {
        let uid = Uid::current();
        User::from_uid(uid)
            .map_err(|source| SyncError::IdentityLookup {
                name: uid.to_string(),
                source,
            })?
            .map(|user| user.name)
            .ok_or_else(|| not_found(IdentityKind::User, &uid.to_string()))
    }

    fn default_group(&self) -> Result<String, SyncError> {
        let gid = Gid::current();
        Group::from_gid(gid)
            .map_err(|source| SyncError::IdentityLookup {
                name: gid.to_string(),
                source,
            })?
            .map(|group| group.name)
            .ok_or_else(|| not_found(IdentityKind::Group, &gid.to_string()))
    }
}

/// In-memory identity table.
///
/// The first user/group registered becomes the default one.
#[derive(Debug, Clone, Default)]
pub struct FixedIdentities {
    users: HashMap<String, Uid>,
    groups: HashMap<String, Gid>,
    default_user: Option<String>,
    default_group: Option<String>,
}

impl FixedIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table whose defaults are `user`/`group` mapped to the current process ids.
    ///
    /// Ownership changes to these ids succeed without privileges.
    pub fn current_as(user: &str, group: &str) -> Self {
        Self::new()
            .with_user(user, Uid::current())
            .with_group(group, Gid::current())
    }

    pub fn with_user(mut self, name: &str, uid: Uid) -> Self {
        self.default_user.get_or_insert_with(|| name.to_string());
        self.users.insert(name.to_string(), uid);
        self
    }

    pub fn with_group(mut self, name: &str, gid: Gid) -> Self {
        self.default_group.get_or_insert_with(|| name.to_string());
        self.groups.insert(name.to_string(), gid);
        self
    }
}

impl IdentityResolver for FixedIdentities {
    fn resolve_user(&self, name: &str) -> Result<Uid, SyncError> {
        self.users
            .get(name)
            .copied()
            .ok_or_else(|| not_found(IdentityKind::User, name))
    }

    fn resolve_group(&self, name: &str) -> Result<Gid, SyncError> {
        self.groups
            .get(name)
            .copied()
            .ok_or_else(|| not_found(IdentityKind::Group, name))
    }

    fn default_user(&self) -> Result<String, SyncError> {
        self.default_user
            .clone()
            .ok_or_else(|| not_found(IdentityKind::User, "<default>"))
    }

    fn default_group(&self) -> Result<String, SyncError> {
        self.default_group
            .clone()
            .ok_or_else(|| not_found(IdentityKind::Group, "<default>"))
    }
}

fn not_found(kind: IdentityKind, name: &str) -> SyncError {
    SyncError::IdentityNotFound {
        kind,
        name: name.to_string(),
    }
}
