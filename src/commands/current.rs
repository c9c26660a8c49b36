// `tfvm current`: prints the active version.

use anyhow::{Context, Result};
use tfvm::libs::version_store::VersionStore;
use tfvm::log_info;
use tfvm::schemas::vm_config::VmConfig;

pub fn run(config: &VmConfig) -> Result<()> {
    match VersionStore::new(config)
        .current()
        .context("failed to read the current version")?
    {
        Some(version) => println!("{version}"),
        None => log_info!("[TFVM::Current] No current {} version set; run `tfvm use <version>`", config.tool),
    }
    Ok(())
}
