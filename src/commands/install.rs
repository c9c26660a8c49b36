// `tfvm install <version> [--use]`: runs the verified install pipeline.

use anyhow::{Context, Result};
use colored::Colorize;
use tfvm::libs::installer::{InstallOutcome, Installer};
use tfvm::libs::utilities::assets::ReleaseClient;
use tfvm::libs::version_store::VersionStore;
use tfvm::log_info;
use tfvm::schemas::vm_config::VmConfig;

pub fn run(config: &VmConfig, client: &dyn ReleaseClient, version: &str, use_after: bool) -> Result<()> {
    let installer = Installer::new(config, client);
    let outcome = installer
        .install(version)
        .with_context(|| format!("failed to install {} {version}", config.tool))?;

    match outcome {
        InstallOutcome::Installed { digest, .. } => {
            println!("Installed {} {} (sha256 {})", config.tool, version.green().bold(), digest);
        }
        InstallOutcome::AlreadyInstalled { .. } => {
            println!("{} {} is already installed", config.tool, version.bold());
        }
    }

    if use_after {
        VersionStore::new(config)
            .set_current(Some(version))
            .with_context(|| format!("failed to switch to {version}"))?;
        log_info!("[TFVM::Install] Now using {} {}", config.tool, version.bold());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use tfvm::TfvmError;
    use tfvm::libs::utilities::platform::Platform;

    struct Unreachable;

    impl ReleaseClient for Unreachable {
        fn open(&self, url: &str) -> tfvm::Result<Box<dyn Read + Send>> {
            Err(TfvmError::Download {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    #[test]
    fn failure_renders_as_one_line_with_its_cause() {
        let root = TempDir::new().unwrap();
        let config = VmConfig::new(
            root.path(),
            "terraform",
            Platform::from_parts("linux", "x86_64").unwrap(),
            "https://releases.test/terraform",
        );

        let err = run(&config, &Unreachable, "1.5.0", false).unwrap_err();
        let rendered = format!("{err:#}");

        assert!(!rendered.contains('\n'), "{rendered}");
        assert!(rendered.starts_with("failed to install terraform 1.5.0: "), "{rendered}");
        assert!(rendered.contains("HTTP status 404"), "{rendered}");
        assert!(!config.version_path("1.5.0").exists());
    }
}
