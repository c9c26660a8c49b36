//! `tfvm` manages installed versions of the Terraform binary: it downloads release
//! archives, authenticates them against a signed checksum manifest, installs them into
//! a per-user version store and switches the active version through a symlink.

// Logging macros (`log_info!`, `log_debug!`, ...).
pub mod logger;

pub mod error;
pub mod libs;
pub mod schemas;

pub use error::{Result, TfvmError};
