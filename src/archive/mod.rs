//! Curation archive reading
//!
//! Opens a submitted `.7z`/`.zip` container, refuses `.rar` and unknown
//! extensions, checks the total uncompressed size from the container header
//! before extracting anything, and extracts into a fresh scratch directory.
//! The scratch directory's lifetime is tied to the returned
//! [`ExtractedArchive`], so it is removed on every exit path once the handle
//! drops.

mod sevenz;
mod zip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub(crate) use sevenz::SevenZipReader;
pub(crate) use zip::ZipReader;

use crate::error::Result;
use crate::types::ArchiveFormat;
use std::path::Path;
use tempfile::TempDir;
use tokio::task::spawn_blocking;
use tracing::{debug, warn};

/// Prefix for scratch extraction directories
const SCRATCH_PREFIX: &str = "curation_validator_";

/// Container metadata gathered from the header, before extraction
#[derive(Clone, Debug)]
pub struct ArchiveSummary {
    /// Total uncompressed size of all members
    pub total_uncompressed_bytes: u64,
    /// Raw member paths as stored in the container
    pub members: Vec<String>,
}

/// A curation archive extracted into its scratch directory
///
/// Dropping this removes the scratch directory and everything under it.
#[derive(Debug)]
pub struct ExtractedArchive {
    /// Detected container format
    pub format: ArchiveFormat,
    /// Raw member paths as stored in the container
    pub members: Vec<String>,
    scratch: TempDir,
}

impl ExtractedArchive {
    /// Root of the extracted tree
    pub fn root(&self) -> &Path {
        self.scratch.path()
    }
}

/// Why an archive was not extracted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveRefusal {
    /// `.rar` submissions are never accepted
    Rar,
    /// The extension is not `.7z`, `.zip` or `.rar`
    UnsupportedExtension,
    /// The container could not be read: unreadable header, truncated stream,
    /// or member paths that escape the extraction root
    Corrupt(ArchiveFormat),
    /// The uncompressed size exceeds the ceiling; validation is skipped
    Oversized {
        /// Total uncompressed size from the container header
        actual_bytes: u64,
        /// Configured ceiling
        limit_bytes: u64,
    },
}

/// Result of the archive stage
#[derive(Debug)]
pub enum ArchiveReadOutcome {
    /// The archive was extracted and its members listed
    Extracted(ExtractedArchive),
    /// The archive was refused without extraction
    Refused(ArchiveRefusal),
}

/// Read and extract a curation archive.
///
/// Format is decided by the literal file extension. The size ceiling is
/// checked against header metadata before any byte is extracted, so an
/// oversized archive never touches the scratch directory. Read and extraction
/// failures are refusals, not faults: a truncated upload is the submitter's
/// problem.
///
/// # Errors
///
/// Returns an error only for engine faults: scratch-directory creation
/// failures and panicked blocking tasks.
pub async fn read_archive(
    path: &Path,
    max_uncompressed_bytes: u64,
    scratch_parent: Option<&Path>,
) -> Result<ArchiveReadOutcome> {
    let format = match path.extension().and_then(|ext| ext.to_str()) {
        Some("7z") => ArchiveFormat::SevenZip,
        Some("zip") => ArchiveFormat::Zip,
        Some("rar") => {
            debug!(?path, "refusing rar submission");
            return Ok(ArchiveReadOutcome::Refused(ArchiveRefusal::Rar));
        }
        _ => {
            warn!(?path, "file type not supported");
            return Ok(ArchiveReadOutcome::Refused(
                ArchiveRefusal::UnsupportedExtension,
            ));
        }
    };

    debug!(?path, %format, "reading archive");
    let summary = {
        let archive_path = path.to_path_buf();
        match spawn_blocking(move || summarize(format, &archive_path)).await? {
            Ok(summary) => summary,
            Err(e) => {
                warn!(?path, %format, error = %e, "failed to read archive");
                return Ok(ArchiveReadOutcome::Refused(ArchiveRefusal::Corrupt(format)));
            }
        }
    };

    if summary.total_uncompressed_bytes > max_uncompressed_bytes {
        warn!(
            ?path,
            actual = summary.total_uncompressed_bytes,
            limit = max_uncompressed_bytes,
            "archive exceeds size ceiling, skipping validation"
        );
        return Ok(ArchiveReadOutcome::Refused(ArchiveRefusal::Oversized {
            actual_bytes: summary.total_uncompressed_bytes,
            limit_bytes: max_uncompressed_bytes,
        }));
    }

    let scratch = match scratch_parent {
        Some(parent) => tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)?,
        None => tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?,
    };

    let extract_result = {
        let archive_path = path.to_path_buf();
        let dest = scratch.path().to_path_buf();
        spawn_blocking(move || extract(format, &archive_path, &dest)).await?
    };
    if let Err(e) = extract_result {
        warn!(?path, %format, error = %e, "failed to extract archive");
        return Ok(ArchiveReadOutcome::Refused(ArchiveRefusal::Corrupt(format)));
    }

    debug!(?path, member_count = summary.members.len(), "archive extracted");
    Ok(ArchiveReadOutcome::Extracted(ExtractedArchive {
        format,
        members: summary.members,
        scratch,
    }))
}

/// Member paths that are themselves curation archives.
///
/// Batch submissions wrap several curations in one container; callers can
/// extract the listed members and validate each one on its own.
pub fn nested_archive_names(members: &[String]) -> Vec<String> {
    members
        .iter()
        .filter(|member| member.ends_with(".7z") || member.ends_with(".zip"))
        .cloned()
        .collect()
}

/// Total of header-declared member sizes, saturating at `u64::MAX`.
///
/// Declared sizes are read from untrusted container headers; a wrapping sum
/// would let a forged archive slide under the size ceiling.
pub(crate) fn sum_declared_sizes(sizes: impl IntoIterator<Item = u64>) -> u64 {
    sizes.into_iter().fold(0, u64::saturating_add)
}

fn summarize(format: ArchiveFormat, path: &Path) -> Result<ArchiveSummary> {
    match format {
        ArchiveFormat::SevenZip => SevenZipReader::summarize(path),
        ArchiveFormat::Zip => ZipReader::summarize(path),
    }
}

fn extract(format: ArchiveFormat, path: &Path, dest: &Path) -> Result<()> {
    match format {
        ArchiveFormat::SevenZip => SevenZipReader::extract(path, dest),
        ArchiveFormat::Zip => ZipReader::extract(path, dest),
    }
}
