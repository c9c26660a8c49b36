//! # Install pipeline
//!
//! Installs one version of the managed tool:
//!
//! 1. **Idempotence check** - an installed version is left untouched, with no network I/O.
//! 2. **Checksum authentication** - the signed `SHA256SUMS` manifest yields the expected
//!    digest of the archive (see `checksum_verifier`).
//! 3. **Download** - the archive is opened; nothing is written for a non-success status.
//! 4. **Extract & hash** - response bytes flow through a SHA-256 hasher, then the zip
//!    extractor, then into a staged file next to the final path. The digest covers the
//!    compressed archive, matching what the publisher checksums.
//! 5. **Verify** - the archive digest must equal the manifest digest.
//! 6. **Publish** - the staged file is made executable and renamed onto
//!    `versions/<tool>_<version><suffix>`.
//!
//! The staged file is a `tempfile::NamedTempFile`: every early return drops it, which
//! deletes it, so a failed install never leaves a partial or unverified executable
//! where the version store looks.

// Our own error type and result alias.
use crate::error::{Result, TfvmError};
// Authenticates the checksum manifest and yields the expected archive digest.
use crate::libs::checksum_verifier::{ChecksumVerifier, TrustAnchor};
// Release URLs and the transport that streams them.
use crate::libs::utilities::assets::{ReleaseArtifacts, ReleaseClient};
// Streaming zip extraction of the single executable.
use crate::libs::utilities::compression::extract_single_entry;
use crate::libs::utilities::file_operations::make_executable;
// Pass-through SHA-256 over the archive bytes as they stream past.
use crate::libs::utilities::hashing::{HashingReader, Sha256Digest};
use crate::libs::version_store::{VersionStore, validate_version};
use crate::schemas::vm_config::VmConfig;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Stages of a single install, logged as the pipeline advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    NotInstalled,
    Downloading,
    ExtractingAndHashing,
    WrittenUnverified,
    Verified,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStage::NotInstalled => "not-installed",
            InstallStage::Downloading => "downloading",
            InstallStage::ExtractingAndHashing => "extracting+hashing",
            InstallStage::WrittenUnverified => "written-unverified",
            InstallStage::Verified => "verified",
        };
        f.write_str(name)
    }
}

/// What `install` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The version was downloaded, verified and published.
    Installed { path: PathBuf, digest: Sha256Digest },
    /// The version was already present; nothing was touched.
    AlreadyInstalled { path: PathBuf },
}

/// Runs the install pipeline for one configuration against one releases host.
pub struct Installer<'a> {
    config: &'a VmConfig,
    client: &'a dyn ReleaseClient,
    trust_anchor: TrustAnchor,
}

impl<'a> Installer<'a> {
    /// Installer trusting the publisher's pinned OpenPGP release key.
    ///
    /// # Arguments
    /// * `config`: install root, platform and releases host.
    /// * `client`: transport used for every download.
    pub fn new(config: &'a VmConfig, client: &'a dyn ReleaseClient) -> Self {
        Self::with_trust_anchor(config, client, TrustAnchor::pinned(config))
    }

    /// Installer trusting an explicit anchor. Used by tests and by mirrors signed
    /// with their own key.
    ///
    /// # Arguments
    /// * `config`: install root, platform and releases host.
    /// * `client`: transport used for every download.
    /// * `trust_anchor`: the key release manifests must be signed with.
    pub fn with_trust_anchor(
        config: &'a VmConfig,
        client: &'a dyn ReleaseClient,
        trust_anchor: TrustAnchor,
    ) -> Self {
        Self {
            config,
            client,
            trust_anchor,
        }
    }

    /// Installs `version`, or does nothing if it is already installed.
    ///
    /// # Arguments
    /// * `version`: release token, used verbatim in URLs and filenames.
    ///
    /// # Returns
    /// * `InstallOutcome::Installed` with the verified archive digest, or
    ///   `InstallOutcome::AlreadyInstalled` without any network I/O.
    ///
    /// # Errors
    /// * `InvalidVersion` for unusable version tokens.
    /// * `Download` / `Transport` for network failures.
    /// * `SignatureVerification` / `ChecksumNotFound` when the checksums cannot be authenticated.
    /// * `ArchiveFormat` when the archive is not a single-entry zip.
    /// * `HashMismatch` when the archive does not match its authenticated digest.
    /// * `Io` for local filesystem failures.
    pub fn install(&self, version: &str) -> Result<InstallOutcome> {
        validate_version(version)?;
        let store = VersionStore::new(self.config);
        let final_path = self.config.version_path(version);

        if store.is_installed(version)? {
            log_debug!("[TFVM::Install] {} is already installed, skipping", version);
            return Ok(InstallOutcome::AlreadyInstalled { path: final_path });
        }

        let result = self.run_pipeline(version, final_path);
        // Reported once, by the caller.
        if let Err(e) = &result {
            log_debug!("[TFVM::Install] Pipeline for {} aborted: {:?}", version, e);
        }
        result
    }

    fn run_pipeline(&self, version: &str, final_path: PathBuf) -> Result<InstallOutcome> {
        let mut stage = InstallStage::NotInstalled;
        let versions_dir = self.config.versions_dir();
        fs::create_dir_all(&versions_dir)?;

        let artifacts = ReleaseArtifacts::for_version(self.config, version);
        let expected = ChecksumVerifier::new(self.client, &self.trust_anchor).fetch_sum(&artifacts)?;
        log_debug!("[TFVM::Install] Expected digest {}", expected.dimmed());

        advance(&mut stage, InstallStage::Downloading);
        log_info!("[TFVM::Install] Downloading {}", artifacts.archive_url.blue());
        let response = self.client.open(&artifacts.archive_url)?;

        // Created only once the server has answered with a success status.
        let mut staged = tempfile::Builder::new()
            .prefix(".tfvm-")
            .suffix(".partial")
            .tempfile_in(&versions_dir)?;

        advance(&mut stage, InstallStage::ExtractingAndHashing);
        let mut archive = HashingReader::new(response);
        let entry = extract_single_entry(&mut archive, staged.as_file_mut())?;
        staged.as_file().sync_all()?;

        advance(&mut stage, InstallStage::WrittenUnverified);
        let digest = archive.digest();
        log_debug!(
            "[TFVM::Install] Archive {} ({} bytes) hashed to {}; entry {} is {} bytes",
            artifacts.archive_name,
            archive.bytes_read(),
            digest,
            entry.name,
            entry.size
        );
        if !digest.matches_hex(&expected) {
            return Err(TfvmError::HashMismatch {
                file: artifacts.archive_name,
                expected,
                actual: digest.to_hex(),
            });
        }

        advance(&mut stage, InstallStage::Verified);
        make_executable(staged.path())?;
        staged.persist(&final_path).map_err(|e| TfvmError::Io(e.error))?;

        log_info!(
            "[TFVM::Install] Installed {} {} at {}",
            self.config.tool,
            version.bold(),
            final_path.display().to_string().green()
        );
        Ok(InstallOutcome::Installed {
            path: final_path,
            digest,
        })
    }
}

fn advance(stage: &mut InstallStage, next: InstallStage) {
    log_debug!("[TFVM::Install] {} -> {}", stage, next);
    *stage = next;
}
