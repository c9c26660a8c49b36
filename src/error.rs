//! Error taxonomy shared by every `tfvm` component.
//!
//! Install pipeline failures abort the pipeline and are surfaced through these
//! variants after the staged artifact has been removed. Optional reads (missing
//! current link, missing versions directory) never produce an error.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, TfvmError>;

#[derive(Debug, Error)]
pub enum TfvmError {
    /// The host operating system has no published release builds.
    #[error("unsupported platform '{0}'")]
    UnsupportedPlatform(String),

    /// The host CPU architecture has no published release builds.
    #[error("unsupported architecture '{0}'")]
    UnsupportedArch(String),

    /// The releases host answered with a non-success HTTP status.
    #[error("download of {url} failed with HTTP status {status}")]
    Download { url: String, status: u16 },

    /// The request never produced an HTTP status (DNS, TLS, connection reset...).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("invalid release archive: {0}")]
    ArchiveFormat(String),

    #[error("signature verification failed for {0}")]
    SignatureVerification(String),

    #[error("no checksum for {0} in the checksums manifest")]
    ChecksumNotFound(String),

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("version {0} is not installed")]
    NotInstalled(String),

    /// Creating the current link was refused by the OS.
    #[error("permission denied while linking {}; retry with elevated privileges", path.display())]
    Permission { path: PathBuf },

    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<zip::result::ZipError> for TfvmError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => TfvmError::Io(e),
            other => TfvmError::ArchiveFormat(other.to_string()),
        }
    }
}
