// Shape of the optional `<root>/config.yaml` settings file.
//
// Example:
//
// ```yaml
// releases_url: https://artifacts.internal/terraform
// signing_key_url: https://artifacts.internal/keys/hashicorp.asc
// request_timeout_secs: 120
// ```

use serde::Deserialize;

/// User-tunable settings. Every field is optional; absent fields keep their defaults.
/// The pinned key fingerprint is not part of this file; only where the key is fetched from.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Alternative releases host (a mirror laid out like the official one).
    pub releases_url: Option<String>,
    /// Alternative location of the publisher's OpenPGP key.
    pub signing_key_url: Option<String>,
    /// Timeout in seconds for each HTTP request.
    pub request_timeout_secs: Option<u64>,
}
