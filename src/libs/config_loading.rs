// Builds the `VmConfig` for a run: resolved root + detected platform + the optional
// settings file found in the root.

use crate::error::{Result, TfvmError};
use crate::libs::paths::resolve_root;
use crate::libs::utilities::platform::Platform;
use crate::schemas::settings::Settings;
use crate::schemas::vm_config::{DEFAULT_RELEASES_URL, DEFAULT_TOOL, VmConfig};
use crate::{log_debug, log_warn};
use colored::Colorize;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Filename of the settings file inside the install root.
pub const SETTINGS_FILE: &str = "config.yaml";

/// Reads `<root>/config.yaml`. A missing or empty file yields default settings.
///
/// # Errors
/// * `Config` if the file exists but is not valid settings YAML.
/// * `Io` for any read failure other than "not found".
pub fn load_settings(root: &Path) -> Result<Settings> {
    let path = root.join(SETTINGS_FILE);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log_debug!("[TFVM::Config] No settings file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(e) => return Err(e.into()),
    };

    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }

    let settings: Settings = serde_yaml::from_str(&contents)
        .map_err(|e| TfvmError::Config(format!("{}: {e}", path.display())))?;
    log_debug!(
        "[TFVM::Config] Loaded settings from {}: {:?}",
        path.display().to_string().green(),
        settings
    );
    Ok(settings)
}

/// Assembles the configuration for this process.
///
/// # Arguments
/// * `root_override`: value of `--root` / `TFVM_ROOT`, if any.
pub fn load_config(root_override: Option<&str>) -> Result<VmConfig> {
    let root = resolve_root(root_override)?;
    let platform = Platform::detect()?;
    let settings = load_settings(&root)?;
    Ok(apply_settings(VmConfig::new(root, DEFAULT_TOOL, platform, DEFAULT_RELEASES_URL), settings))
}

/// Overlays user settings on top of a base configuration.
pub fn apply_settings(mut config: VmConfig, settings: Settings) -> VmConfig {
    if let Some(url) = settings.releases_url {
        if !url.starts_with("https://") {
            log_warn!(
                "[TFVM::Config] releases_url {} is not HTTPS; downloads are still signature-checked",
                url.yellow()
            );
        }
        config.releases_url = url;
    }
    if let Some(url) = settings.signing_key_url {
        log_debug!("[TFVM::Config] Fetching the release key from {}", url.cyan());
        config.signing_key_url = url;
    }
    if let Some(secs) = settings.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    config
}
