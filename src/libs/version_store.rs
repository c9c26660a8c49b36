//! Installed versions and the current pointer.
//!
//! The filesystem is the database: a version is installed iff
//! `versions/<tool>_<version><suffix>` exists, and the current version is whatever
//! the `<root>/<tool><suffix>` symlink points at.

// Our own error type and result alias.
use crate::error::{Result, TfvmError};
// Link management that tolerates an already missing link.
use crate::libs::utilities::file_operations::{remove_file_if_exists, symlink_file};
// Where versions and the current link live.
use crate::schemas::vm_config::VmConfig;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::fs;
use std::io;

/// Rejects version tokens that are empty or could escape the versions directory
/// once spliced into a filename or URL.
///
/// # Arguments
/// * `version`: the token as typed by the user.
///
/// # Returns
/// * `Ok(())` for a usable token, `InvalidVersion` otherwise.
pub fn validate_version(version: &str) -> Result<()> {
    let invalid = version.is_empty()
        || version.contains("..")
        || version
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
    if invalid {
        return Err(TfvmError::InvalidVersion(version.to_string()));
    }
    Ok(())
}

/// Read and write access to the installed versions of one install root.
pub struct VersionStore<'a> {
    config: &'a VmConfig,
}

impl<'a> VersionStore<'a> {
    pub fn new(config: &'a VmConfig) -> Self {
        Self { config }
    }

    /// Whether `version` has an installed record.
    ///
    /// # Arguments
    /// * `version`: the version token to look up.
    ///
    /// # Returns
    /// * `true` if `versions/<tool>_<version><suffix>` exists.
    ///
    /// # Errors
    /// Any I/O error other than "not found".
    pub fn is_installed(&self, version: &str) -> Result<bool> {
        validate_version(version)?;
        match fs::symlink_metadata(self.config.version_path(version)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Installed versions in lexicographic order. A missing versions directory is an
    /// empty store, not an error.
    ///
    /// # Returns
    /// * Every version token with an installed record. Files that are not version
    ///   records (staged downloads, stray files) are skipped.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.config.versions_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            match self.config.version_from_file_name(name) {
                Some(version) => versions.push(version.to_string()),
                None => log_debug!("[TFVM::Store] Ignoring foreign entry {}", name.dimmed()),
            }
        }
        versions.sort();
        Ok(versions)
    }

    /// The version the current link points at, without checking that the target
    /// still exists.
    fn linked_version(&self) -> Result<Option<String>> {
        match fs::read_link(self.config.current_link()) {
            Ok(target) => Ok(self.config.version_from_path(&target).map(str::to_string)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The active version, or `None` when no current link exists.
    ///
    /// # Returns
    /// * `Some(version)` for the version the current link resolves to.
    ///
    /// # Errors
    /// * `Io` if the link exists but its target is gone (dangling link), or the link
    ///   cannot be read.
    pub fn current(&self) -> Result<Option<String>> {
        let Some(version) = self.linked_version()? else {
            return Ok(None);
        };

        match fs::metadata(self.config.current_link()) {
            Ok(_) => Ok(Some(version)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TfvmError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "current link {} points at missing version {version}",
                    self.config.current_link().display()
                ),
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Points the current link at `version`, or removes it when `version` is `None`.
    ///
    /// # Arguments
    /// * `version`: an installed version, or `None` to leave no version active.
    ///
    /// # Errors
    /// * `NotInstalled` if `version` has no record.
    /// * `Permission` if the OS refuses to create the link.
    pub fn set_current(&self, version: Option<&str>) -> Result<()> {
        let link = self.config.current_link();

        if let Some(version) = version {
            if !self.is_installed(version)? {
                return Err(TfvmError::NotInstalled(version.to_string()));
            }
        }

        if remove_file_if_exists(&link)? {
            log_debug!("[TFVM::Store] Removed previous link {}", link.display());
        }

        let Some(version) = version else {
            return Ok(());
        };

        let target = self.config.current_link_target(version);
        match symlink_file(&target, &link) {
            Ok(()) => {
                log_debug!(
                    "[TFVM::Store] Linked {} -> {}",
                    link.display().to_string().cyan(),
                    target.display()
                );
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(TfvmError::Permission { path: link })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removes an installed version, clearing the current link first if it points there.
    ///
    /// # Arguments
    /// * `version`: an installed version.
    ///
    /// # Errors
    /// * `NotInstalled` if `version` has no record.
    pub fn uninstall(&self, version: &str) -> Result<()> {
        if !self.is_installed(version)? {
            return Err(TfvmError::NotInstalled(version.to_string()));
        }

        if self.linked_version()?.as_deref() == Some(version) {
            log_info!("[TFVM::Store] {} is the current version, unsetting it", version.bold());
            self.set_current(None)?;
        }

        fs::remove_file(self.config.version_path(version))?;
        Ok(())
    }
}
