//! Zip container backend

use crate::archive::{sum_declared_sizes, ArchiveSummary};
use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Reader for `.zip` curation archives
pub(crate) struct ZipReader;

impl ZipReader {
    /// Read member names and the total uncompressed size from the central
    /// directory.
    pub(crate) fn summarize(path: &Path) -> Result<ArchiveSummary> {
        debug!(?path, "reading zip central directory");
        let file = File::open(path)?;
        let mut archive = ::zip::ZipArchive::new(file).map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to open zip archive: {e}"
            )))
        })?;

        let mut members = Vec::with_capacity(archive.len());
        let mut declared_sizes = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive.by_index(index).map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "failed to read zip entry {index}: {e}"
                )))
            })?;
            declared_sizes.push(entry.size());
            members.push(entry.name().to_string());
        }

        Ok(ArchiveSummary {
            total_uncompressed_bytes: sum_declared_sizes(declared_sizes),
            members,
        })
    }

    /// Extract the whole archive under `dest`.
    ///
    /// Member names that resolve outside `dest` fail the extraction rather
    /// than being written.
    pub(crate) fn extract(path: &Path, dest: &Path) -> Result<()> {
        debug!(?path, ?dest, "extracting zip archive");
        let file = File::open(path)?;
        let mut archive = ::zip::ZipArchive::new(file).map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to open zip archive: {e}"
            )))
        })?;
        archive.extract(dest).map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to extract zip archive: {e}"
            )))
        })
    }
}
