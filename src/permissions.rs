//! Owner execute bit helpers.

use crate::error::AppError;
use std::fs;
use std::path::Path;

/// Owner execute permission (`u+x`).
pub const OWNER_EXECUTE: u32 = 0o100;

/// Check whether the file's owner execute bit is set.
///
/// Returns `false` when the file does not exist or cannot be stat'ed.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => mode_is_executable(&metadata),
        Err(_) => false,
    }
}

/// Set the owner execute bit, leaving every other permission bit untouched.
///
/// # Errors
///
/// Returns `AppError::Io` if the file cannot be stat'ed or chmod'ed.
pub fn set_executable(path: &Path) -> Result<(), AppError> {
    let metadata = fs::metadata(path)
        .map_err(|e| AppError::io(format!("failed to stat {}", path.display()), e))?;
    let permissions = with_owner_execute(metadata.permissions());
    log::debug!("chmod u+x {}", path.display());
    fs::set_permissions(path, permissions)
        .map_err(|e| AppError::io(format!("failed to make {} executable", path.display()), e))
}

#[cfg(unix)]
fn mode_is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & OWNER_EXECUTE != 0
}

#[cfg(not(unix))]
fn mode_is_executable(metadata: &fs::Metadata) -> bool {
    metadata.is_file()
}

#[cfg(unix)]
fn with_owner_execute(mut permissions: fs::Permissions) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    permissions.set_mode(permissions.mode() | OWNER_EXECUTE);
    permissions
}

#[cfg(not(unix))]
fn with_owner_execute(permissions: fs::Permissions) -> fs::Permissions {
    permissions
}
