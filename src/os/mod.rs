//! Platform-specific checks.

/// Check if the current process has administrator privileges.
#[cfg(unix)]
pub fn has_admin_privileges() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
pub fn has_admin_privileges() -> bool {
    false
}
