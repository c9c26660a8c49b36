// `tfvm uninstall <version>`.

use anyhow::{Context, Result};
use colored::Colorize;
use tfvm::libs::version_store::VersionStore;
use tfvm::schemas::vm_config::VmConfig;

pub fn run(config: &VmConfig, version: &str) -> Result<()> {
    VersionStore::new(config)
        .uninstall(version)
        .with_context(|| format!("failed to uninstall {} {version}", config.tool))?;
    println!("Uninstalled {} {}", config.tool, version.bold());
    Ok(())
}
