// `tfvm use <version>`: repoints the current link.

use anyhow::{Context, Result};
use colored::Colorize;
use tfvm::libs::version_store::VersionStore;
use tfvm::schemas::vm_config::VmConfig;

pub fn run(config: &VmConfig, version: &str) -> Result<()> {
    VersionStore::new(config)
        .set_current(Some(version))
        .with_context(|| format!("failed to switch to {} {version}", config.tool))?;
    println!(
        "Now using {} {} ({})",
        config.tool,
        version.green().bold(),
        config.current_link().display()
    );
    Ok(())
}
