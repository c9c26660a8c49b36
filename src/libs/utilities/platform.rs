// Maps the host operating system and CPU architecture onto the naming scheme used
// by the releases host (e.g. `terraform_1.5.0_darwin_arm64.zip`).
// Resolution is pure: it only looks at the strings it is given, never at the filesystem
// or the network, so the same inputs always produce the same `Platform`.

use crate::error::{Result, TfvmError};
use crate::log_debug;
use colored::Colorize;

/// The host platform expressed in release naming terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system component of release filenames (`linux`, `darwin`, `windows`, ...).
    pub os: String,
    /// Architecture component of release filenames (`amd64`, `arm64`, `386`, `arm`).
    pub arch: String,
    /// Suffix of the installed executable (`.exe` on Windows, empty elsewhere).
    pub exe_suffix: &'static str,
}

impl Platform {
    /// Resolves the platform the running binary was compiled for.
    /// Called once per process; the result is stored in `VmConfig`.
    pub fn detect() -> Result<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Resolves an explicit `(os, arch)` pair as reported by `std::env::consts`.
    ///
    /// # Errors
    /// * `UnsupportedPlatform` when the OS has no release builds.
    /// * `UnsupportedArch` when the CPU architecture has no release builds.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        let os_name = normalize_os(os)?;
        let arch_name = normalize_arch(arch)?;
        let exe_suffix = if os_name == "windows" { ".exe" } else { "" };

        log_debug!(
            "[TFVM::Platform] Resolved host {}/{} -> {}_{}",
            os,
            arch,
            os_name.cyan(),
            arch_name.magenta()
        );

        Ok(Self {
            os: os_name.to_string(),
            arch: arch_name.to_string(),
            exe_suffix,
        })
    }
}

/// Normalizes an OS name into the releases host vocabulary.
/// Accepts both Rust's `std::env::consts::OS` spelling and the release spelling.
fn normalize_os(os: &str) -> Result<&'static str> {
    match os.to_lowercase().as_str() {
        "macos" | "darwin" => Ok("darwin"),
        "linux" => Ok("linux"),
        "windows" => Ok("windows"),
        "freebsd" => Ok("freebsd"),
        "openbsd" => Ok("openbsd"),
        "solaris" => Ok("solaris"),
        _ => Err(TfvmError::UnsupportedPlatform(os.to_string())),
    }
}

/// Normalizes a CPU architecture into the releases host vocabulary.
fn normalize_arch(arch: &str) -> Result<&'static str> {
    match arch.to_lowercase().as_str() {
        "x86_64" | "amd64" => Ok("amd64"),
        "aarch64" | "arm64" => Ok("arm64"),
        "x86" | "i386" | "i686" | "386" => Ok("386"),
        "arm" => Ok("arm"),
        _ => Err(TfvmError::UnsupportedArch(arch.to_string())),
    }
}
