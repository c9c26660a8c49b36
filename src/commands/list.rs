// `tfvm list`: prints installed versions to stdout, marking the current one.

use anyhow::{Context, Result};
use colored::Colorize;
use tfvm::libs::version_store::VersionStore;
use tfvm::{log_info, log_warn};
use tfvm::schemas::vm_config::VmConfig;

pub fn run(config: &VmConfig) -> Result<()> {
    let store = VersionStore::new(config);
    let versions = store.list().context("failed to list installed versions")?;

    if versions.is_empty() {
        log_info!("[TFVM::List] No {} versions installed yet", config.tool);
        return Ok(());
    }

    // A dangling current link should not hide the list; report it and carry on.
    let current = match store.current() {
        Ok(current) => current,
        Err(e) => {
            log_warn!("[TFVM::List] Could not read the current version: {}", e);
            None
        }
    };

    for version in &versions {
        if current.as_deref() == Some(version.as_str()) {
            println!("* {}", version.green().bold());
        } else {
            println!("  {version}");
        }
    }
    Ok(())
}
