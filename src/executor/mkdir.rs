//! Destination parent directory creation

use crate::paths::absolute_parent;
use crate::types::{Mode, SyncError};
use nix::unistd::{chown, Gid, Uid};
use std::fs::{self, DirBuilder};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};

/// Outcome of [`ensure_parent`] when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentStatus {
    /// Parent was already there
    Existing,
    /// Parent was created
    Created(PathBuf),
}

/// Make sure the parent directory of `destination` exists.
///
/// Only the immediate parent is created, never a chain of missing
/// ancestors. A freshly created parent gets `dir_mode` exactly (the umask
/// is overridden) and is chowned to `uid:gid`. Relative destinations are
/// taken relative to `base`.
///
/// Failures are logged as warnings and reported as `false`.
pub fn ensure_parent(
    destination: &Path,
    base: &Path,
    dir_mode: Mode,
    uid: Uid,
    gid: Gid,
) -> bool {
    let parent = absolute_parent(destination, base);
    match create_parent(&parent, dir_mode, uid, gid) {
        Ok(ParentStatus::Existing) => true,
        Ok(ParentStatus::Created(path)) => {
            tracing::debug!(path = %path.display(), "Creating directory");
            true
        }
        Err(err) => {
            tracing::warn!(
                path = %parent.display(),
                "Failed to create directory {}. {}",
                parent.display(),
                err
            );
            false
        }
    }
}

/// Create `parent` if missing; errors are returned, not logged.
pub fn create_parent(
    parent: &Path,
    dir_mode: Mode,
    uid: Uid,
    gid: Gid,
) -> Result<ParentStatus, SyncError> {
    if parent.exists() {
        return Ok(ParentStatus::Existing);
    }

    DirBuilder::new().mode(dir_mode.bits()).create(parent)?;
    fs::set_permissions(parent, fs::Permissions::from_mode(dir_mode.bits()))?;
    chown(parent, Some(uid), Some(gid)).map_err(std::io::Error::from)?;

    Ok(ParentStatus::Created(parent.to_path_buf()))
}
