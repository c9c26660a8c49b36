// Shared fixtures: an in-memory releases host and a signed release builder.
#![allow(dead_code)]

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::sync::Mutex;
use tempfile::TempDir;
use tfvm::libs::checksum_verifier::TrustAnchor;
use tfvm::libs::installer::Installer;
use tfvm::libs::utilities::assets::{ReleaseArtifacts, ReleaseClient};
use tfvm::libs::utilities::platform::Platform;
use tfvm::schemas::vm_config::VmConfig;
use tfvm::{Result, TfvmError};
use zip::write::FileOptions;

pub const RELEASES_URL: &str = "https://releases.test/terraform";

/// A release signed the way the official host signs: gpg detached signature by a
/// signing subkey over the manifest, with the armored public key published separately.
pub mod openpgp {
    pub const KEY_URL: &str = "https://keys.test/release-key.asc";
    pub const KEY: &[u8] = include_bytes!("../fixtures/openpgp/release-key.asc");
    pub const KEY_FINGERPRINT: &str = "14D44CA4A5D489D19625C700476916DD19339512";
    pub const ARCHIVE: &[u8] = include_bytes!("../fixtures/openpgp/terraform_1.5.0_linux_amd64.zip");
    pub const ARCHIVE_DIGEST: &str = "f853d9fc2233edc153f8826f4e0212adfa3dc490262fff293085f95c4eb9899f";
    pub const BINARY: &[u8] = b"#!/bin/sh\necho 'Terraform v1.5.0'\n";
    pub const SUMS: &[u8] = include_bytes!("../fixtures/openpgp/terraform_1.5.0_SHA256SUMS");
    pub const SUMS_SIG: &[u8] = include_bytes!("../fixtures/openpgp/terraform_1.5.0_SHA256SUMS.sig");
}

/// What the fake host answers for a URL.
#[derive(Clone)]
pub enum Served {
    Body(Vec<u8>),
    Status(u16),
    /// Serves the first `n` bytes of the body, then fails with a connection reset.
    BrokenAfter(Vec<u8>, usize),
}

/// Reader that fails once its prefix is exhausted.
struct BrokenReader {
    inner: Cursor<Vec<u8>>,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
            n => Ok(n),
        }
    }
}

#[derive(Default)]
pub struct FakeReleases {
    served: Mutex<HashMap<String, Served>>,
    requests: Mutex<Vec<String>>,
}

impl FakeReleases {
    pub fn serve(&self, url: &str, served: Served) {
        self.served.lock().unwrap().insert(url.to_string(), served);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn was_requested(&self, url: &str) -> bool {
        self.requests().iter().any(|u| u == url)
    }
}

impl ReleaseClient for FakeReleases {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.served.lock().unwrap().get(url).cloned() {
            Some(Served::Body(body)) => Ok(Box::new(Cursor::new(body))),
            Some(Served::BrokenAfter(body, n)) => Ok(Box::new(BrokenReader {
                inner: Cursor::new(body[..n].to_vec()),
            })),
            Some(Served::Status(status)) => Err(TfvmError::Download {
                url: url.to_string(),
                status,
            }),
            None => Err(TfvmError::Download {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Builds an in-memory zip archive.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// An isolated install root plus a fake releases host and a signing key.
pub struct Fixture {
    pub root: TempDir,
    pub config: VmConfig,
    pub releases: FakeReleases,
    pub signing_key: SigningKey,
}

impl Fixture {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let config = VmConfig::new(
            root.path(),
            "terraform",
            Platform::from_parts("linux", "x86_64").unwrap(),
            RELEASES_URL,
        );
        Self {
            root,
            config,
            releases: FakeReleases::default(),
            signing_key: SigningKey::from_bytes(&[42u8; 32]),
        }
    }

    pub fn trust_anchor(&self) -> TrustAnchor {
        TrustAnchor::Ed25519(self.signing_key.verifying_key())
    }

    /// Trusts the OpenPGP fixture key only through its fingerprint.
    pub fn pinned_openpgp_anchor(&self) -> TrustAnchor {
        TrustAnchor::Pinned {
            key_url: openpgp::KEY_URL.to_string(),
            fingerprint: openpgp::KEY_FINGERPRINT.to_string(),
        }
    }

    /// Detached signature over `bytes` with the fixture key.
    pub fn sign(&self, bytes: &[u8]) -> Vec<u8> {
        self.signing_key.sign(bytes).to_bytes().to_vec()
    }

    pub fn installer(&self) -> Installer<'_> {
        Installer::with_trust_anchor(&self.config, &self.releases, self.trust_anchor())
    }

    pub fn artifacts(&self, version: &str) -> ReleaseArtifacts {
        ReleaseArtifacts::for_version(&self.config, version)
    }

    /// Publishes a signed manifest listing `digest` for the version's archive.
    pub fn publish_manifest(&self, version: &str, digest: &str) -> Vec<u8> {
        let artifacts = self.artifacts(version);
        let manifest = format!(
            "{}  terraform_{version}_darwin_arm64.zip\n{digest}  {}\n{}  terraform_{version}_windows_amd64.zip\n",
            "1".repeat(64),
            artifacts.archive_name,
            "2".repeat(64),
        )
        .into_bytes();
        let signature = self.sign(&manifest);
        self.releases
            .serve(&artifacts.checksums_url, Served::Body(manifest.clone()));
        self.releases
            .serve(&artifacts.signature_url, Served::Body(signature));
        manifest
    }

    /// Publishes a complete, correctly signed release whose archive holds `binary`.
    /// Returns the archive digest.
    pub fn publish(&self, version: &str, binary: &[u8]) -> String {
        let archive = zip_archive(&[("terraform", binary)]);
        let digest = sha256_hex(&archive);
        self.publish_manifest(version, &digest);
        self.releases
            .serve(&self.artifacts(version).archive_url, Served::Body(archive));
        digest
    }

    /// Publishes version 1.5.0 from the OpenPGP fixtures, plus the key at its URL.
    pub fn publish_openpgp_release(&self) {
        let artifacts = self.artifacts("1.5.0");
        self.releases
            .serve(&artifacts.checksums_url, Served::Body(openpgp::SUMS.to_vec()));
        self.releases
            .serve(&artifacts.signature_url, Served::Body(openpgp::SUMS_SIG.to_vec()));
        self.releases
            .serve(&artifacts.archive_url, Served::Body(openpgp::ARCHIVE.to_vec()));
        self.releases
            .serve(openpgp::KEY_URL, Served::Body(openpgp::KEY.to_vec()));
    }

    /// Files left in the versions directory.
    pub fn versions_dir_entries(&self) -> Vec<String> {
        match fs::read_dir(self.config.versions_dir()) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn assert_nothing_installed(&self, version: &str) {
        assert!(!self.config.version_path(version).exists());
        assert!(
            self.versions_dir_entries().is_empty(),
            "leftover files: {:?}",
            self.versions_dir_entries()
        );
    }
}
