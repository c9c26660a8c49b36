// Core behavior of the version manager.

// Authenticates signed checksum manifests.
pub mod checksum_verifier;
// Builds the runtime configuration.
pub mod config_loading;
// The download / verify / publish pipeline.
pub mod installer;
// Install root resolution.
pub mod paths;
// Shared building blocks (platform, hashing, extraction, HTTP, filesystem).
pub mod utilities;
// Installed versions and the current link.
pub mod version_store;
