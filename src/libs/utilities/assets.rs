// Remote release assets: where they live and how we fetch them.
//
// `ReleaseArtifacts` derives every URL for a version from the configuration alone.
// `ReleaseClient` is the seam between the install pipeline and the network; the
// production implementation is `UreqClient`, tests plug in an in-memory server.

// Our own error type and result alias.
use crate::error::{Result, TfvmError};
// Releases host, tool name and platform, which together name every artifact.
use crate::schemas::vm_config::VmConfig;
use crate::{log_debug, log_error};
use colored::Colorize;
// Response bodies are handed out as plain readers so they can be streamed.
use std::io::Read;
use std::time::Duration;

/// The remote files that make up one release of the managed tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArtifacts {
    /// Filename of the platform archive, as listed in the checksums manifest.
    pub archive_name: String,
    pub archive_url: String,
    pub checksums_url: String,
    pub signature_url: String,
}

impl ReleaseArtifacts {
    /// Derives the artifact locations of `version` for the configured platform.
    ///
    /// Layout: `<releases_url>/<version>/<tool>_<version>_<os>_<arch>.zip`, with the
    /// manifest at `<tool>_<version>_SHA256SUMS` and its signature at `...SHA256SUMS.sig`.
    ///
    /// # Arguments
    /// * `config`: supplies the releases host, tool name and platform.
    /// * `version`: the (already validated) version token.
    ///
    /// # Returns
    /// * The archive filename and the three URLs of the release.
    pub fn for_version(config: &VmConfig, version: &str) -> Self {
        let base = format!("{}/{}", config.releases_url.trim_end_matches('/'), version);
        let archive_name = format!(
            "{}_{}_{}_{}.zip",
            config.tool, version, config.platform.os, config.platform.arch
        );
        let checksums_name = format!("{}_{}_SHA256SUMS", config.tool, version);

        Self {
            archive_url: format!("{base}/{archive_name}"),
            checksums_url: format!("{base}/{checksums_name}"),
            signature_url: format!("{base}/{checksums_name}.sig"),
            archive_name,
        }
    }
}

/// Read-only access to the releases host.
pub trait ReleaseClient: Send + Sync {
    /// Issues a GET and returns the body as a stream.
    ///
    /// Implementations must only return `Ok` for success statuses, so callers never
    /// start writing anything for an error response.
    ///
    /// # Arguments
    /// * `url`: absolute URL of the file.
    ///
    /// # Returns
    /// * A reader over the response body.
    ///
    /// # Errors
    /// * `Download` for a non-success status, `Transport` when no status was received.
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>>;

    /// Issues a GET and collects the whole body. Used for the small manifest files.
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.open(url)?.read_to_end(&mut body)?;
        Ok(body)
    }
}

/// `ReleaseClient` backed by a blocking `ureq` agent.
/// Redirects are followed and TLS certificates are validated with ureq's defaults.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Builds an agent identifying itself as `tfvm/<version>`.
    ///
    /// # Arguments
    /// * `timeout`: overall limit for each request, including reading the body.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("tfvm/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build();
        Self { agent }
    }
}

impl ReleaseClient for UreqClient {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        log_debug!("[TFVM::Http] GET {}", url.blue());

        match self.agent.get(url).call() {
            Ok(response) => {
                log_debug!("[TFVM::Http] {} answered {}", url, response.status());
                Ok(Box::new(response.into_reader()))
            }
            // The response is dropped here, which aborts the transfer.
            Err(ureq::Error::Status(status, _)) => {
                log_error!("[TFVM::Http] {} answered HTTP {}", url.red(), status);
                Err(TfvmError::Download {
                    url: url.to_string(),
                    status,
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(TfvmError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::utilities::platform::Platform;
    use std::path::PathBuf;

    fn config(os: &str, arch: &str, releases_url: &str) -> VmConfig {
        VmConfig::new(
            PathBuf::from("/tmp/tfvm"),
            "terraform",
            Platform::from_parts(os, arch).unwrap(),
            releases_url,
        )
    }

    #[test]
    fn derives_release_urls() {
        let cfg = config("linux", "x86_64", "https://releases.example.com/terraform");
        let artifacts = ReleaseArtifacts::for_version(&cfg, "1.5.0");

        assert_eq!(artifacts.archive_name, "terraform_1.5.0_linux_amd64.zip");
        assert_eq!(
            artifacts.archive_url,
            "https://releases.example.com/terraform/1.5.0/terraform_1.5.0_linux_amd64.zip"
        );
        assert_eq!(
            artifacts.checksums_url,
            "https://releases.example.com/terraform/1.5.0/terraform_1.5.0_SHA256SUMS"
        );
        assert_eq!(
            artifacts.signature_url,
            "https://releases.example.com/terraform/1.5.0/terraform_1.5.0_SHA256SUMS.sig"
        );
    }

    #[test]
    fn tolerates_trailing_slash_in_base_url() {
        let cfg = config("macos", "aarch64", "https://mirror.local/tf/");
        let artifacts = ReleaseArtifacts::for_version(&cfg, "1.6.2");

        assert_eq!(
            artifacts.archive_url,
            "https://mirror.local/tf/1.6.2/terraform_1.6.2_darwin_arm64.zip"
        );
    }
}
