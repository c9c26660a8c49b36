// Runtime configuration handed to every component.
// Nothing in the library reads process-wide state for paths or naming; it all
// flows from one `VmConfig` built at startup (or by a test).

use crate::libs::utilities::platform::Platform;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the managed executable.
pub const DEFAULT_TOOL: &str = "terraform";
/// Official releases host for the managed tool.
pub const DEFAULT_RELEASES_URL: &str = "https://releases.hashicorp.com/terraform";
/// Where the publisher serves its armored OpenPGP release key.
pub const DEFAULT_SIGNING_KEY_URL: &str = "https://www.hashicorp.com/.well-known/pgp-key.txt";
/// Directory under the root holding installed versions.
pub const VERSIONS_DIR: &str = "versions";
/// Timeout applied to every HTTP request unless the settings file overrides it.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything a component needs to know about where and what it manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Install root; holds `versions/` and the current link.
    pub root: PathBuf,
    /// Executable name, also the prefix of release and installed filenames.
    pub tool: String,
    pub platform: Platform,
    /// Base URL under which `<version>/` release directories live.
    pub releases_url: String,
    /// Location of the publisher key. The key found there is only trusted if its
    /// fingerprint is the pinned one.
    pub signing_key_url: String,
    pub request_timeout: Duration,
}

impl VmConfig {
    pub fn new(
        root: impl Into<PathBuf>,
        tool: impl Into<String>,
        platform: Platform,
        releases_url: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            tool: tool.into(),
            platform,
            releases_url: releases_url.into(),
            signing_key_url: DEFAULT_SIGNING_KEY_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Directory holding one executable per installed version.
    pub fn versions_dir(&self) -> PathBuf {
        self.root.join(VERSIONS_DIR)
    }

    /// Filename of an installed version: `<tool>_<version><suffix>`.
    pub fn version_file_name(&self, version: &str) -> String {
        format!("{}_{}{}", self.tool, version, self.platform.exe_suffix)
    }

    /// Deterministic path of an installed version.
    pub fn version_path(&self, version: &str) -> PathBuf {
        self.versions_dir().join(self.version_file_name(version))
    }

    /// What the current link stores for `version`: a path relative to the link's own
    /// directory (the root), so it resolves no matter how the root was spelled.
    pub fn current_link_target(&self, version: &str) -> PathBuf {
        Path::new(VERSIONS_DIR).join(self.version_file_name(version))
    }

    /// Location of the current link: `<root>/<tool><suffix>`.
    pub fn current_link(&self) -> PathBuf {
        self.root
            .join(format!("{}{}", self.tool, self.platform.exe_suffix))
    }

    /// Recovers the version token from an installed filename, or `None` for
    /// files that are not version records.
    pub fn version_from_file_name<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let version = file_name
            .strip_prefix(self.tool.as_str())?
            .strip_prefix('_')?
            .strip_suffix(self.platform.exe_suffix)?;
        (!version.is_empty()).then_some(version)
    }

    /// Same as `version_from_file_name`, for a full path.
    pub fn version_from_path<'a>(&self, path: &'a Path) -> Option<&'a str> {
        self.version_from_file_name(path.file_name()?.to_str()?)
    }
}
