// Pass-through SHA-256 hashing for byte streams.
// `HashingReader` sits between the HTTP response and the archive extractor: every
// chunk the extractor pulls is folded into the running digest and handed over untouched.

use sha2::{Digest, Sha256};
use std::fmt;
use std::io::{self, Read};

/// A finished SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sha256Digest([u8; 32]);

impl Sha256Digest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding, as used in checksum manifests.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Compares against a hex digest taken from a manifest. Case-insensitive.
    pub fn matches_hex(&self, expected: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(expected.trim())
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Reader adapter that hashes everything read through it.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    bytes_read: u64,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_read: 0,
        }
    }

    /// Number of bytes that have flowed through so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Digest of every byte read so far. Only meaningful once the upstream is drained.
    pub fn digest(&self) -> Sha256Digest {
        Sha256Digest(self.hasher.clone().finalize().into())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes_read += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // sha256("abc")
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn forwards_bytes_unchanged_and_hashes_them() {
        let mut reader = HashingReader::new(Cursor::new(b"abc".to_vec()));
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();

        assert_eq!(out, b"abc");
        assert_eq!(reader.bytes_read(), 3);
        assert_eq!(reader.digest().to_hex(), ABC_SHA256);
    }

    #[test]
    fn small_reads_produce_the_same_digest() {
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut reader = HashingReader::new(Cursor::new(payload.clone()));
        let mut out = Vec::new();
        let mut chunk = [0u8; 7];
        loop {
            let n = reader.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }

        assert_eq!(out, payload);
        assert_eq!(reader.digest().as_bytes(), &<[u8; 32]>::from(Sha256::digest(&payload)));
    }

    #[test]
    fn matches_hex_ignores_case_and_whitespace() {
        let mut reader = HashingReader::new(Cursor::new(b"abc".to_vec()));
        io::copy(&mut reader, &mut io::sink()).unwrap();
        let digest = reader.digest();

        assert!(digest.matches_hex(&ABC_SHA256.to_uppercase()));
        assert!(digest.matches_hex(&format!("{ABC_SHA256}\n")));
        assert!(!digest.matches_hex("00"));
        assert_eq!(digest.to_string(), ABC_SHA256);
    }
}
