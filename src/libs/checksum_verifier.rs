//! Authentication of release checksums.
//!
//! The publisher signs the `SHA256SUMS` manifest, not the archives. We fetch the
//! manifest and its detached signature in parallel, verify the signature over the
//! manifest bytes exactly as received, and only then read the expected digest of the
//! archive out of it. Comparing that digest with the downloaded archive is what
//! authenticates the binary.
//!
//! The official releases host signs with OpenPGP. Its public key is pinned by
//! fingerprint: the key material is fetched alongside the manifest and rejected
//! unless its primary key has exactly that fingerprint and all of its self and
//! subkey binding signatures verify. Mirrors may instead be trusted through an
//! explicit OpenPGP key or a raw Ed25519 key.

// Our own error type and result alias.
use crate::error::{Result, TfvmError};
// URLs of the manifest and signature, and the transport that fetches them.
use crate::libs::utilities::assets::{ReleaseArtifacts, ReleaseClient};
use crate::schemas::vm_config::VmConfig;
use crate::{log_debug, log_info};
use colored::Colorize;
// Raw Ed25519 signatures, for mirrors that publish 64-byte `.sig` files.
use ed25519_dalek::{Signature, VerifyingKey};
// OpenPGP keys and detached signatures, as published by the official host.
use pgp::types::PublicKeyTrait;
use pgp::{Deserializable, SignedPublicKey, StandaloneSignature};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::thread::ScopedJoinHandle;

/// Fingerprint of the publisher's release signing key
/// (`HashiCorp Security <security@hashicorp.com>`).
///
/// Rotating it requires a new tfvm release; it cannot be changed at runtime.
pub const RELEASE_KEY_FINGERPRINT: &str = "C874011F0AB405110D02105534365D9472D7468F";

/// Who release manifests must be signed by.
#[derive(Debug, Clone)]
pub enum TrustAnchor {
    /// An OpenPGP key fetched from `key_url` and accepted only if its primary key
    /// fingerprint is `fingerprint` (hex, spaces and case ignored).
    Pinned { key_url: String, fingerprint: String },
    /// An OpenPGP key supplied directly.
    OpenPgp(Box<SignedPublicKey>),
    /// A raw Ed25519 key; signatures are the 64 signature bytes.
    Ed25519(VerifyingKey),
}

impl TrustAnchor {
    /// The publisher key pinned by `RELEASE_KEY_FINGERPRINT`, fetched from the
    /// configured key URL.
    pub fn pinned(config: &VmConfig) -> Self {
        TrustAnchor::Pinned {
            key_url: config.signing_key_url.clone(),
            fingerprint: RELEASE_KEY_FINGERPRINT.to_string(),
        }
    }

    /// Trusts the armored OpenPGP public key in `armored`.
    ///
    /// # Errors
    /// * `SignatureVerification` if the key cannot be parsed or its self-signatures
    ///   do not verify.
    pub fn openpgp_from_armor(armored: &[u8]) -> Result<Self> {
        Ok(TrustAnchor::OpenPgp(Box::new(parse_openpgp_key(armored, "OpenPGP public key")?)))
    }
}

/// Parsed `SHA256SUMS` content: archive filename -> lowercase hex digest.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: BTreeMap<String, String>,
}

impl ChecksumManifest {
    /// Parses `<hex digest><two spaces><filename>` lines.
    /// Blank and malformed lines are skipped; the manifest is authenticated before
    /// parsing, so anything we skip was published that way.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let (digest, name) = line.trim_end_matches('\r').split_once("  ")?;
                let digest = digest.trim();
                let name = name.trim();
                let well_formed = digest.len() == 64
                    && digest.chars().all(|c| c.is_ascii_hexdigit())
                    && !name.is_empty();
                if !well_formed {
                    log_debug!("[TFVM::Checksums] Skipping manifest line '{}'", line);
                    return None;
                }
                Some((name.to_string(), digest.to_ascii_lowercase()))
            })
            .collect();
        Self { entries }
    }

    /// Expected digest for `file_name`, if listed.
    pub fn digest_for(&self, file_name: &str) -> Option<&str> {
        self.entries.get(file_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses an armored OpenPGP public key and checks its self and binding signatures.
///
/// # Arguments
/// * `armored`: ASCII-armored transferable public key.
/// * `subject`: what to name in error messages (usually where the key came from).
///
/// # Returns
/// * The key, with every subkey bound to the primary key.
pub fn parse_openpgp_key(armored: &[u8], subject: &str) -> Result<SignedPublicKey> {
    let (key, _headers) = SignedPublicKey::from_armor_single(Cursor::new(armored))
        .map_err(|e| TfvmError::SignatureVerification(format!("{subject} (unreadable key: {e})")))?;
    key.verify()
        .map_err(|e| TfvmError::SignatureVerification(format!("{subject} (invalid key signatures: {e})")))?;
    Ok(key)
}

/// Verifies an OpenPGP detached signature (binary or armored) over `message`.
///
/// Signatures made by the primary key or by any bound subkey are accepted; the
/// publisher signs releases with a subkey.
///
/// # Errors
/// * `SignatureVerification` for a malformed signature or one no key of `key` verifies.
pub fn verify_openpgp(key: &SignedPublicKey, message: &[u8], signature: &[u8], subject: &str) -> Result<()> {
    let parsed = if signature.trim_ascii_start().starts_with(b"-----BEGIN PGP SIGNATURE-----") {
        StandaloneSignature::from_armor_single(Cursor::new(signature)).map(|(sig, _headers)| sig)
    } else {
        StandaloneSignature::from_bytes(Cursor::new(signature))
    }
    .map_err(|e| {
        TfvmError::SignatureVerification(format!(
            "{subject} (malformed OpenPGP signature of {} bytes: {e})",
            signature.len()
        ))
    })?;

    let verified = parsed.verify(key, message).is_ok()
        || key
            .public_subkeys
            .iter()
            .any(|subkey| parsed.verify(subkey, message).is_ok());
    if !verified {
        return Err(TfvmError::SignatureVerification(subject.to_string()));
    }
    Ok(())
}

/// Verifies a raw Ed25519 signature over `message` with `key`.
///
/// # Errors
/// * `SignatureVerification` for a malformed signature or one that does not verify.
pub fn verify_ed25519(key: &VerifyingKey, message: &[u8], signature: &[u8], subject: &str) -> Result<()> {
    let signature = Signature::from_slice(signature).map_err(|_| {
        TfvmError::SignatureVerification(format!(
            "{subject} (malformed signature of {} bytes)",
            signature.len()
        ))
    })?;

    key.verify_strict(message, &signature)
        .map_err(|_| TfvmError::SignatureVerification(subject.to_string()))
}

/// Accepts the fetched key only if its primary fingerprint is the pinned one.
fn load_pinned_key(armored: &[u8], key_url: &str, fingerprint: &str) -> Result<SignedPublicKey> {
    let key = parse_openpgp_key(armored, key_url)?;
    let actual = hex::encode_upper(key.primary_key.fingerprint().as_bytes());
    let pinned: String = fingerprint.chars().filter(|c| !c.is_whitespace()).collect();
    if !actual.eq_ignore_ascii_case(&pinned) {
        return Err(TfvmError::SignatureVerification(format!(
            "{key_url} (key fingerprint {actual} is not the pinned {pinned})"
        )));
    }
    log_debug!("[TFVM::Checksums] Release key {} matches the pin", actual.green());
    Ok(key)
}

fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

/// Fetches and authenticates checksum manifests.
pub struct ChecksumVerifier<'a> {
    client: &'a dyn ReleaseClient,
    trust_anchor: &'a TrustAnchor,
}

impl<'a> ChecksumVerifier<'a> {
    pub fn new(client: &'a dyn ReleaseClient, trust_anchor: &'a TrustAnchor) -> Self {
        Self {
            client,
            trust_anchor,
        }
    }

    /// Returns the authenticated hex digest of `artifacts.archive_name`.
    ///
    /// The manifest, its signature and (for a pinned anchor) the publisher key are
    /// fetched concurrently.
    ///
    /// # Arguments
    /// * `artifacts`: the release whose manifest should be consulted.
    ///
    /// # Returns
    /// * The lowercase hex SHA-256 digest the publisher lists for the archive.
    ///
    /// # Errors
    /// * `Download` / `Transport` if any of the files cannot be fetched.
    /// * `SignatureVerification` if the key or the manifest signature is invalid.
    /// * `ChecksumNotFound` if the manifest does not list the archive.
    pub fn fetch_sum(&self, artifacts: &ReleaseArtifacts) -> Result<String> {
        log_info!(
            "[TFVM::Checksums] Fetching signed checksums for {}",
            artifacts.archive_name.bold()
        );

        let client = self.client;
        let (manifest, signature, key) = std::thread::scope(|scope| {
            let signature = scope.spawn(|| client.fetch_bytes(&artifacts.signature_url));
            let key = match self.trust_anchor {
                TrustAnchor::Pinned { key_url, .. } => Some(scope.spawn(move || client.fetch_bytes(key_url))),
                _ => None,
            };
            let manifest = client.fetch_bytes(&artifacts.checksums_url);
            (manifest, join(signature), key.map(join))
        });
        let (manifest, signature, key) = (manifest?, signature?, key.transpose()?);

        let subject = artifacts.checksums_url.as_str();
        match (self.trust_anchor, key) {
            (TrustAnchor::Pinned { key_url, fingerprint }, Some(armored)) => {
                let key = load_pinned_key(&armored, key_url, fingerprint)?;
                verify_openpgp(&key, &manifest, &signature, subject)?;
            }
            (TrustAnchor::Pinned { key_url, .. }, None) => {
                return Err(TfvmError::SignatureVerification(format!("{key_url} (key was not fetched)")));
            }
            (TrustAnchor::OpenPgp(key), _) => verify_openpgp(key, &manifest, &signature, subject)?,
            (TrustAnchor::Ed25519(key), _) => verify_ed25519(key, &manifest, &signature, subject)?,
        }
        log_debug!("[TFVM::Checksums] Signature over {} verified", subject.green());

        let text = String::from_utf8_lossy(&manifest);
        let parsed = ChecksumManifest::parse(&text);
        parsed
            .digest_for(&artifacts.archive_name)
            .map(str::to_string)
            .ok_or_else(|| TfvmError::ChecksumNotFound(artifacts.archive_name.clone()))
    }
}
