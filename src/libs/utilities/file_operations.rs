// Small filesystem helpers shared by the installer and the version store.

use crate::log_debug;
use colored::Colorize;
use std::fs;
use std::io;
use std::path::Path;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Permission mask given to installed executables (`rwxr-xr-x`).
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Makes a file executable, the equivalent of `chmod 755`.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(EXECUTABLE_MODE);
    fs::set_permissions(path, perms)?;
    log_debug!("[TFVM::Fs] {} is now executable", path.display().to_string().green());
    Ok(())
}

// Windows decides executability by extension, there are no mode bits to set.
#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Removes a file, treating "already gone" as success.
/// Returns whether a file was actually removed.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Creates a symlink pointing at a file.
#[cfg(unix)]
pub fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
