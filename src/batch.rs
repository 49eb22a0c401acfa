//! Directory batch driver: finds every `*.tar.gz` under a directory, extracts each one
//! and removes it once it has been unpacked.
//!
//! A failure on one archive never stops the batch. Every stage is reported through the
//! caller's [`Reporter`] and summarized in the returned [`BatchResult`] list.

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::extract::extract_archive;
use crate::fsx as fs;
use crate::report::Reporter;

/// Literal, case-sensitive suffix that selects a candidate.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// How far the driver looks for candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Only the immediate children of the source directory.
    Flat,
    /// The whole subtree.
    Recursive,
}

impl From<bool> for ScanMode {
    fn from(recursive: bool) -> Self {
        if recursive {
            ScanMode::Recursive
        } else {
            ScanMode::Flat
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Extracted and the source archive removed.
    Extracted,
    OpenFailed,
    ExtractFailed,
    /// Extracted, but the source archive could not be removed.
    RemoveFailed,
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchOutcome::Extracted => "extracted",
            BatchOutcome::OpenFailed => "open failed",
            BatchOutcome::ExtractFailed => "extract failed",
            BatchOutcome::RemoveFailed => "remove failed",
        };
        f.write_str(s)
    }
}

/// What happened to one candidate archive.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub path: PathBuf,
    pub outcome: BatchOutcome,
    pub error: Option<String>,
}

impl BatchResult {
    pub fn is_failure(&self) -> bool {
        self.outcome != BatchOutcome::Extracted
    }
}

/// True when `name` ends with the exact `.tar.gz` suffix.
pub fn is_archive_name(name: &str) -> bool {
    name.ends_with(ARCHIVE_SUFFIX)
}

/// Extracts every `*.tar.gz` found in `source_dir` into `dest_dir`, deleting each
/// archive after a successful extraction. Never fails as a whole.
pub fn process_archives_in_directory(
    source_dir: &Path,
    dest_dir: &Path,
    mode: ScanMode,
    reporter: &dyn Reporter,
) -> Vec<BatchResult> {
    let candidates = find_candidates(source_dir, mode, reporter);
    candidates.iter().map(|path| process_one(path, dest_dir, reporter)).collect()
}

/// Collects candidates up front so extracting into a directory under `source_dir`
/// cannot feed new files into the scan.
fn find_candidates(source_dir: &Path, mode: ScanMode, reporter: &dyn Reporter) -> Vec<PathBuf> {
    let mut out = Vec::new();
    match mode {
        ScanMode::Flat => {
            let rd = match fs::read_dir(source_dir) {
                Ok(rd) => rd,
                Err(e) => {
                    reporter.error(format_args!("Failed to read directory {}: {}", source_dir.display(), e));
                    return out;
                }
            };
            for item in rd {
                match item {
                    Ok(dent) => {
                        let path = dent.path();
                        if is_archive_name(&dent.file_name().to_string_lossy()) && path.is_file() {
                            out.push(path);
                        }
                    }
                    Err(e) => reporter.error(format_args!("Failed to read entry in {}: {}", source_dir.display(), e)),
                }
            }
        }
        ScanMode::Recursive => {
            for item in WalkDir::new(source_dir) {
                match item {
                    Ok(dent) => {
                        if is_archive_name(&dent.file_name().to_string_lossy()) && dent.path().is_file() {
                            out.push(dent.into_path());
                        }
                    }
                    Err(e) => {
                        let at = e.path().map(|p| p.display().to_string()).unwrap_or_else(|| source_dir.display().to_string());
                        reporter.error(format_args!("Failed to walk path {}: {}", at, e));
                    }
                }
            }
        }
    }
    out
}

fn process_one(path: &Path, dest_dir: &Path, reporter: &dyn Reporter) -> BatchResult {
    let failed = |outcome, error: String| BatchResult { path: path.to_path_buf(), outcome, error: Some(error) };

    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            reporter.error(format_args!("Failed to open file {}: {}", path.display(), e));
            return failed(BatchOutcome::OpenFailed, e.to_string());
        }
    };

    reporter.info(format_args!("Extracting file {}", path.display()));
    // The handle is consumed here and closed before the removal below.
    let extracted = extract_archive(std::io::BufReader::new(file), dest_dir);
    match extracted {
        Ok(summary) => reporter.info(format_args!(
            "Extracted file {} ({} files, {} directories)",
            path.display(),
            summary.files_written,
            summary.directories_created
        )),
        Err(e) => {
            reporter.error(format_args!("Failed to extract file {}: {}", path.display(), e));
            return failed(BatchOutcome::ExtractFailed, e.to_string());
        }
    }

    if let Err(e) = fs::remove_file(path) {
        reporter.error(format_args!("Failed to remove file {}: {}", path.display(), e));
        return failed(BatchOutcome::RemoveFailed, e.to_string());
    }
    reporter.info(format_args!("Removed file {}", path.display()));

    BatchResult { path: path.to_path_buf(), outcome: BatchOutcome::Extracted, error: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use tempfile::tempdir;

    #[test]
    fn suffix_is_exact_and_case_sensitive() {
        assert!(is_archive_name("data.tar.gz"));
        assert!(!is_archive_name("data.TAR.GZ"));
        assert!(!is_archive_name("data.tgz"));
        assert!(!is_archive_name("data.tar.gz.part"));
    }

    #[test]
    fn scan_mode_from_bool() {
        assert_eq!(ScanMode::from(true), ScanMode::Recursive);
        assert_eq!(ScanMode::from(false), ScanMode::Flat);
    }

    #[test]
    fn missing_source_dir_is_reported_not_returned() {
        let root = tempdir().unwrap();
        let rec = RecordingReporter::new();
        let results = process_archives_in_directory(&root.path().join("absent"), root.path(), ScanMode::Flat, &rec);
        assert!(results.is_empty());
        assert_eq!(rec.count(tracing::Level::ERROR), 1);
    }

    #[test]
    fn directories_with_the_suffix_are_ignored() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("odd.tar.gz")).unwrap();
        let rec = RecordingReporter::new();
        let results = process_archives_in_directory(root.path(), root.path(), ScanMode::Recursive, &rec);
        assert!(results.is_empty());
        assert!(rec.messages().is_empty());
    }

    #[test]
    fn corrupt_candidate_is_kept_on_disk() {
        let root = tempdir().unwrap();
        let bad = root.path().join("bad.tar.gz");
        fs::write(&bad, b"garbage").unwrap();
        let out = tempdir().unwrap();
        let rec = RecordingReporter::new();

        let results = process_archives_in_directory(root.path(), out.path(), ScanMode::Flat, &rec);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, BatchOutcome::ExtractFailed);
        assert!(results[0].error.is_some());
        assert!(bad.exists());
    }

    #[test]
    fn unreadable_candidate_is_open_failed() {
        let root = tempdir().unwrap();
        let rec = RecordingReporter::new();
        let result = process_one(&root.path().join("gone.tar.gz"), root.path(), &rec);
        assert_eq!(result.outcome, BatchOutcome::OpenFailed);
        assert!(result.is_failure());
        assert_eq!(rec.count(tracing::Level::ERROR), 1);
        assert_eq!(rec.count(tracing::Level::INFO), 0);
    }

    #[cfg(unix)]
    #[test]
    fn archive_in_read_only_directory_is_remove_failed() {
        let inbox = tempdir().unwrap();
        let src = tempdir().unwrap();
        fs::write(src.path().join("x.txt"), b"x").unwrap();
        let archive = inbox.path().join("one.tar.gz");
        crate::archive::build_archive(&archive, src.path(), None, Default::default()).unwrap();
        fs::set_unix_permissions(inbox.path(), 0o555).unwrap();

        // Permission bits do not bind root; nothing to check there.
        if fs::write(inbox.path().join("write-check"), b"").is_ok() {
            fs::set_unix_permissions(inbox.path(), 0o755).unwrap();
            return;
        }

        let out = tempdir().unwrap();
        let rec = RecordingReporter::new();
        let result = process_one(&archive, out.path(), &rec);
        fs::set_unix_permissions(inbox.path(), 0o755).unwrap();

        assert_eq!(result.outcome, BatchOutcome::RemoveFailed);
        assert!(archive.exists());
        assert_eq!(fs::read(out.path().join("x.txt")).unwrap(), b"x");
        assert_eq!(rec.count(tracing::Level::ERROR), 1);
    }
}
