//! # Extraction Module
//!
//! Reads a gzip-compressed tar stream entry by entry and recreates the tree under a
//! destination directory. Extraction is not transactional: an error aborts
//! immediately and whatever was already written stays on disk.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::common::{is_contained, normalize_path, ArchiveEntry, EntryKind};
use crate::{fsx as fs, TarkitError};

/// Counters describing one extraction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub directories_created: u64,
    pub files_written: u64,
    /// Entries of a kind the extractor does not handle (symlinks, devices, ...).
    pub entries_skipped: u64,
    pub bytes_written: u64,
}

/// Extracts every entry of the gzip-compressed tar `stream` into `dest_dir`.
///
/// Directories are created with a fixed `0o755` mode and left alone when they
/// already exist. Regular files are created or truncated and get the archived
/// permission bits. Other entry kinds are skipped.
pub fn extract_archive<R: Read>(stream: R, dest_dir: &Path) -> Result<ExtractSummary, TarkitError> {
    let mut archive = tar::Archive::new(MultiGzDecoder::new(stream));
    let mut summary = ExtractSummary::default();

    if !dest_dir.exists() {
        fs::create_dir_all_fixed(dest_dir).map_err(TarkitError::at(dest_dir))?;
    }

    for item in archive.entries().map_err(TarkitError::Stream)? {
        let mut tar_entry = item.map_err(TarkitError::Stream)?;
        let raw_path = tar_entry.path().map_err(TarkitError::Stream)?.into_owned();
        if !is_contained(&raw_path) {
            return Err(TarkitError::UnsafeEntryPath(raw_path));
        }
        let name = normalize_path(&raw_path.to_string_lossy());

        let entry = match ArchiveEntry::from_header(name, tar_entry.header()) {
            Some(e) => e,
            None => {
                tracing::debug!(entry = %raw_path.display(), kind = ?tar_entry.header().entry_type(), "skipping entry");
                summary.entries_skipped += 1;
                continue;
            }
        };
        // A bare "./" record maps onto the destination itself.
        let target = if entry.path.is_empty() { dest_dir.to_path_buf() } else { dest_dir.join(&entry.path) };

        match entry.kind {
            EntryKind::Directory => {
                if fs::metadata(&target).is_err() {
                    fs::create_dir_all_fixed(&target).map_err(TarkitError::at(&target))?;
                    summary.directories_created += 1;
                }
            }
            EntryKind::File => {
                let written = write_file(&mut tar_entry, &target, entry.mode)?;
                summary.files_written += 1;
                summary.bytes_written += written;
            }
        }
        tracing::debug!(entry = %entry.path, "extracted");
    }

    Ok(summary)
}

/// Opens `archive_path` and extracts it into `dest_dir`.
pub fn extract_archive_file(archive_path: &Path, dest_dir: &Path) -> Result<ExtractSummary, TarkitError> {
    let file = fs::File::open(archive_path).map_err(TarkitError::at(archive_path))?;
    let summary = extract_archive(io::BufReader::new(file), dest_dir)?;
    tracing::info!(
        archive = %archive_path.display(),
        files = summary.files_written,
        dirs = summary.directories_created,
        "archive extracted"
    );
    Ok(summary)
}

fn write_file<R: Read>(content: &mut R, target: &Path, mode: u32) -> Result<u64, TarkitError> {
    if let Some(parent) = target.parent() {
        if !parent.exists() {
            fs::create_dir_all_fixed(parent).map_err(TarkitError::at(parent))?;
        }
    }
    let mut output = fs::create_truncate(target, mode).map_err(TarkitError::at(target))?;
    let written = io::copy(content, &mut output).map_err(|e| classify_copy_error(e, target))?;
    drop(output);
    fs::set_unix_permissions(target, mode).map_err(TarkitError::at(target))?;
    Ok(written)
}

/// `io::copy` mixes read errors from the archive stream with write errors on the
/// target; a truncated or corrupt stream surfaces as one of the read-side kinds.
fn classify_copy_error(e: io::Error, target: &Path) -> TarkitError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => TarkitError::Stream(e),
        _ => TarkitError::Io { source: e, path: PathBuf::from(target) },
    }
}
