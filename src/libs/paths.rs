// Resolves the install root: an explicit override (the `--root` flag or `TFVM_ROOT`,
// both delivered through clap) wins over the default `~/.tfvm`. The result is always
// absolute, so every path derived from it means the same thing wherever it is used.

use crate::error::{Result, TfvmError};
use crate::log_debug;
use colored::Colorize;
use std::path::PathBuf;

/// Directory name of the default install root inside the home directory.
pub const DEFAULT_ROOT_DIR: &str = ".tfvm";

/// Determines the install root.
///
/// # Arguments
/// * `root_override`: user supplied root; `~` and `~/...` are expanded and relative
///   paths are taken from the current directory.
///
/// # Returns
/// * An absolute path to the install root (which may not exist yet).
///
/// # Errors
/// * `Config` when no override is given and the home directory cannot be determined,
///   or when the override is empty.
/// * `Io` if the current directory is needed and cannot be read.
pub fn resolve_root(root_override: Option<&str>) -> Result<PathBuf> {
    let root = match root_override {
        Some(raw) if raw.trim().is_empty() => {
            return Err(TfvmError::Config("install root must not be empty".to_string()));
        }
        Some(raw) => std::path::absolute(&*shellexpand::tilde(raw))?,
        None => dirs::home_dir()
            .ok_or_else(|| {
                TfvmError::Config("could not determine the home directory; pass --root".to_string())
            })?
            .join(DEFAULT_ROOT_DIR),
    };

    log_debug!("[TFVM::Paths] Install root resolved to {}", root.display().to_string().cyan());
    Ok(root)
}
