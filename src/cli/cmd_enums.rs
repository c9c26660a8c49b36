use clap::{Parser, Subcommand};

/// Defines the command-line interface for `tfvm`.
/// `#[derive(Parser)]` generates the argument parsing code via `clap`.
#[derive(Debug, Parser)]
#[command(name = "tfvm", version)]
#[command(about = "Download, verify and switch between Terraform versions", long_about = None)]
pub struct Cli {
    /// Enables detailed debug output for troubleshooting.
    #[arg(short, long, global = true, env = "TFVM_DEBUG")]
    pub(crate) debug: bool,

    /// Install root holding `versions/` and the active `terraform` link (default: ~/.tfvm).
    #[arg(long, global = true, env = "TFVM_ROOT", value_name = "DIR")]
    pub(crate) root: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List installed versions, marking the current one.
    List,
    /// Download, verify and install a version.
    Install {
        /// Version to install (e.g. 1.5.0).
        version: String,
        /// Make the version current once it is installed.
        #[arg(long = "use")]
        use_after: bool,
    },
    /// Remove an installed version. Unsets it first if it is current.
    Uninstall {
        /// Version to remove.
        version: String,
    },
    /// Make an installed version the current one.
    Use {
        /// Version to activate.
        version: String,
    },
    /// Print the current version.
    Current,
}
