//! 7z container backend

use crate::archive::{sum_declared_sizes, ArchiveSummary};
use crate::error::{Error, Result};
use sevenz_rust::{Password, SevenZReader};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Reader for `.7z` curation archives
pub(crate) struct SevenZipReader;

impl SevenZipReader {
    /// Read member names and the total uncompressed size from the header.
    pub(crate) fn summarize(path: &Path) -> Result<ArchiveSummary> {
        debug!(?path, "reading 7z header");
        let reader = SevenZReader::open(path, Password::empty()).map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to open 7z archive: {e}"
            )))
        })?;

        let mut members = Vec::new();
        let mut declared_sizes = Vec::new();
        for entry in &reader.archive().files {
            declared_sizes.push(entry.size());
            members.push(entry.name().to_string());
        }

        Ok(ArchiveSummary {
            total_uncompressed_bytes: sum_declared_sizes(declared_sizes),
            members,
        })
    }

    /// Extract the whole archive under `dest`.
    pub(crate) fn extract(path: &Path, dest: &Path) -> Result<()> {
        debug!(?path, ?dest, "extracting 7z archive");
        sevenz_rust::decompress_file(path, dest).map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "failed to extract 7z archive: {e}"
            )))
        })?;
        Self::ensure_contained(dest)
    }

    /// Reject extractions whose resolved paths escape the destination root.
    fn ensure_contained(dest: &Path) -> Result<()> {
        let root = dest.canonicalize()?;
        for entry in WalkDir::new(dest) {
            let entry = entry.map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "failed to walk extracted tree: {e}"
                )))
            })?;
            let resolved = entry.path().canonicalize()?;
            if !resolved.starts_with(&root) {
                return Err(Error::Io(std::io::Error::other(format!(
                    "extracted path {} escapes the scratch directory",
                    resolved.display()
                ))));
            }
        }
        Ok(())
    }
}
