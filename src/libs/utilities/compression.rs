// Streaming extraction of single-entry release archives.
// The archive is read straight off the download stream: local file headers are
// parsed as they arrive and the entry's decompressed bytes are copied into the sink.
// Nothing is buffered beyond what the decompressor needs.

use crate::error::{Result, TfvmError};
use crate::log_debug;
use colored::Colorize;
use std::io::{self, Read, Write};
use zip::read::{ZipFile, read_zipfile_from_stream};
use zip::result::ZipError;

/// zip's complaint about an entry whose sizes only follow its data.
const DATA_DESCRIPTOR_UNSUPPORTED: &str = "The file length is not available in the local header";

/// What the extractor found and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    /// Name of the entry inside the archive.
    pub name: String,
    /// Decompressed bytes written to the sink.
    pub size: u64,
}

/// Extracts the one file contained in a zip stream into `sink`.
///
/// After the entry has been copied the rest of the stream (central directory, end
/// record) is drained, so a hashing reader upstream observes the complete archive.
///
/// # Errors
/// * `ArchiveFormat` if the stream is not a zip, holds no entry, holds more than one
///   entry, or its single entry is a directory.
/// * `Io` for read/write failures, including a CRC mismatch of the entry.
pub fn extract_single_entry<R: Read, W: Write>(reader: &mut R, sink: &mut W) -> Result<ExtractedEntry> {
    let mut latch = ErrorLatch::new(reader);
    let result = extract_from_stream(&mut latch, sink);
    // An upstream failure surfaces inside zip as a truncated archive; report the cause.
    match latch.error.take() {
        Some(e) => Err(TfvmError::Io(e)),
        None => result,
    }
}

fn extract_from_stream<R: Read, W: Write>(reader: &mut R, sink: &mut W) -> Result<ExtractedEntry> {
    let extracted = {
        let mut entry = next_entry(reader)?
            .ok_or_else(|| TfvmError::ArchiveFormat("archive contains no entries".to_string()))?;

        if entry.is_dir() {
            return Err(TfvmError::ArchiveFormat(format!(
                "expected a single executable, found directory '{}'",
                entry.name()
            )));
        }

        let name = entry.name().to_string();
        log_debug!("[TFVM::Extract] Extracting entry {}", name.cyan());
        let size = io::copy(&mut entry, sink)?;
        ExtractedEntry { name, size }
    };

    if let Some(extra) = next_entry(reader)? {
        return Err(TfvmError::ArchiveFormat(format!(
            "expected a single entry, found additional entry '{}'",
            extra.name()
        )));
    }

    let trailing = io::copy(reader, &mut io::sink())?;
    sink.flush()?;
    log_debug!(
        "[TFVM::Extract] Extracted {} ({} bytes, {} trailing archive bytes)",
        extracted.name.green(),
        extracted.size,
        trailing
    );
    Ok(extracted)
}

/// Reads the next local file header off the stream.
fn next_entry<R: Read>(reader: &mut R) -> Result<Option<ZipFile<'_>>> {
    read_zipfile_from_stream(reader).map_err(|e| match e {
        ZipError::UnsupportedArchive(DATA_DESCRIPTOR_UNSUPPORTED) => TfvmError::ArchiveFormat(
            "entry sizes are stored after the data (zip data descriptor); such release archives \
             cannot be streamed and are not supported"
                .to_string(),
        ),
        other => other.into(),
    })
}

/// Reports upstream read errors to zip as end-of-stream and keeps the first one.
///
/// Streamed zip entries drain the rest of their data when dropped and panic if that
/// read fails, so zip must never see an error from the network.
struct ErrorLatch<R> {
    inner: R,
    error: Option<io::Error>,
}

impl<R: Read> ErrorLatch<R> {
    fn new(inner: R) -> Self {
        Self { inner, error: None }
    }
}

impl<R: Read> Read for ErrorLatch<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.error.is_some() {
            return Ok(0);
        }
        loop {
            match self.inner.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(e);
                    return Ok(0);
                }
            }
        }
    }
}
