//! # Archive Writer
//!
//! Builds gzip-compressed tar archives from a directory tree.
//!
//! Creating an archive is split in two explicit steps:
//!
//! 1. [`build_archive`] walks the source tree and streams every directory and regular
//!    file into the archive. Per-entry failures are collected in an [`ArchiveReport`]
//!    (or abort the build under [`EntryErrorPolicy::FailFast`]).
//! 2. [`purge_archived_sources`] deletes the regular files listed in that report.
//!
//! [`create_archive`] composes both and is the archive-then-delete operation most
//! callers want.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use walkdir::WalkDir;

use crate::common::{absolute_clean, archive_name, ArchiveEntry, EntryKind};
use crate::{fsx as fs, TarkitError};

/// Default gzip level, the same trade-off `gzip(1)` uses.
pub const DEFAULT_LEVEL: u32 = 6;

/// What the writer does when one entry cannot be archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryErrorPolicy {
    /// Record the failure in the report and move on to the next entry.
    #[default]
    Continue,
    /// Stop at the first failure, remove the partial archive and return the error.
    FailFast,
}

/// Tuning knobs for [`build_archive`].
#[derive(Debug, Clone, Copy)]
pub struct ArchiveOptions {
    /// Gzip compression level (0-9).
    pub level: u32,
    pub policy: EntryErrorPolicy,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self { level: DEFAULT_LEVEL, policy: EntryErrorPolicy::Continue }
    }
}

/// One entry that made it into the archive.
#[derive(Debug, Clone, Serialize)]
pub struct ArchivedEntry {
    /// Where the entry came from on disk.
    pub source: PathBuf,
    pub entry: ArchiveEntry,
}

/// One entry that was skipped.
#[derive(Debug)]
pub struct EntryFailure {
    pub path: PathBuf,
    pub error: TarkitError,
}

/// Outcome of a single [`build_archive`] call.
#[derive(Debug, Default)]
pub struct ArchiveReport {
    pub archive_path: PathBuf,
    pub archived: Vec<ArchivedEntry>,
    pub failures: Vec<EntryFailure>,
}

impl ArchiveReport {
    /// True when no entry was skipped.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Source paths of every regular file written to the archive.
    pub fn archived_files(&self) -> impl Iterator<Item = &Path> {
        self.archived
            .iter()
            .filter(|a| a.entry.kind == EntryKind::File)
            .map(|a| a.source.as_path())
    }

    /// Total content bytes written.
    pub fn content_bytes(&self) -> u64 {
        self.archived.iter().map(|a| a.entry.size).sum()
    }
}

/// Outcome of [`purge_archived_sources`].
#[derive(Debug, Default)]
pub struct PurgeReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<EntryFailure>,
}

/// Outcome of [`create_archive`]: the build report plus the purge that followed it.
#[derive(Debug)]
pub struct CreateOutcome {
    pub archive: ArchiveReport,
    pub purge: PurgeReport,
}

/// A writer responsible for streaming a directory tree into a `.tar.gz` file.
///
/// Holds at most one source file open at a time.
pub struct ArchiveWriter {
    builder: tar::Builder<GzEncoder<BufWriter<File>>>,
    archive_path: PathBuf,
    /// Canonical path of the output, used to keep the archive out of its own walk.
    canonical_output: Option<PathBuf>,
    policy: EntryErrorPolicy,
    report: ArchiveReport,
}

impl ArchiveWriter {
    /// Creates (or truncates) `archive_path` and prepares the gzip + tar layers.
    ///
    /// The parent directory must already exist.
    pub fn create(archive_path: &Path, options: ArchiveOptions) -> Result<Self, TarkitError> {
        let file = File::create(archive_path).map_err(TarkitError::at(archive_path))?;
        let canonical_output = fs::canonicalize(archive_path).ok();
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::new(options.level.min(9)));
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);
        Ok(Self {
            builder,
            archive_path: archive_path.to_path_buf(),
            canonical_output,
            policy: options.policy,
            report: ArchiveReport { archive_path: archive_path.to_path_buf(), ..Default::default() },
        })
    }

    /// Walks `source_root` and appends every directory and regular file.
    ///
    /// Entry names are computed relative to `relative_root` when given, otherwise to
    /// `source_root`. Both are made absolute first, so `data` with a relative-root of
    /// `.` yields `data/...`. The relative-root itself (empty name) is not emitted.
    pub fn append_tree(&mut self, source_root: &Path, relative_root: Option<&Path>) -> Result<(), TarkitError> {
        fs::metadata(source_root).map_err(TarkitError::at(source_root))?;
        let walk_root = absolute_clean(source_root).map_err(TarkitError::at(source_root))?;
        let rel_root = match relative_root {
            Some(rel) => absolute_clean(rel).map_err(TarkitError::at(rel))?,
            None => walk_root.clone(),
        };

        for item in WalkDir::new(&walk_root).follow_links(false) {
            let dent = match item {
                Ok(d) => d,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| walk_root.clone());
                    self.record_failure(path, TarkitError::Walk(e))?;
                    continue;
                }
            };
            if self.is_output(dent.path()) {
                continue;
            }
            // Outer error: the archive stream itself is unusable. Inner: this entry was skipped.
            if let Err(e) = self.append_path(dent.path(), &rel_root)? {
                self.record_failure(dent.path().to_path_buf(), e)?;
            }
        }
        Ok(())
    }

    fn is_output(&self, path: &Path) -> bool {
        match &self.canonical_output {
            Some(out) => path.file_name() == out.file_name() && fs::canonicalize(path).ok().as_deref() == Some(out.as_path()),
            None => false,
        }
    }

    fn record_failure(&mut self, path: PathBuf, error: TarkitError) -> Result<(), TarkitError> {
        match self.policy {
            EntryErrorPolicy::FailFast => Err(error),
            EntryErrorPolicy::Continue => {
                tracing::warn!(path = %path.display(), error = %error, "skipping entry");
                self.report.failures.push(EntryFailure { path, error });
                Ok(())
            }
        }
    }

    fn append_path(&mut self, path: &Path, rel_root: &Path) -> Result<Result<(), TarkitError>, TarkitError> {
        let rel = match path.strip_prefix(rel_root) {
            Ok(rel) => rel,
            Err(_) => {
                return Ok(Err(TarkitError::StripPrefix { prefix: rel_root.to_path_buf(), path: path.to_path_buf() }));
            }
        };
        let name = archive_name(rel);
        if name.is_empty() {
            return Ok(Ok(()));
        }

        let meta = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) => return Ok(Err(TarkitError::io(path, e))),
        };
        if !meta.is_dir() && !meta.is_file() {
            return Ok(Err(TarkitError::UnsupportedEntry(path.to_path_buf())));
        }
        if meta.is_dir() {
            let Some(entry) = ArchiveEntry::from_metadata(name, &meta) else {
                return Ok(Err(TarkitError::UnsupportedEntry(path.to_path_buf())));
            };
            return self.append_entry(path, entry, io::empty());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => return Ok(Err(TarkitError::io(path, e))),
        };
        // Size comes from the open handle so the header matches what we stream.
        let entry = match file.metadata() {
            Ok(meta) => ArchiveEntry::from_metadata(name, &meta),
            Err(e) => return Ok(Err(TarkitError::io(path, e))),
        };
        match entry {
            Some(entry) => self.append_entry(path, entry, file),
            None => Ok(Err(TarkitError::UnsupportedEntry(path.to_path_buf()))),
        }
    }

    /// Writes one header and exactly `entry.size` content bytes.
    ///
    /// A source that fails or runs short is zero-filled to the declared size and
    /// reported as the inner error; it never lands in [`ArchiveReport::archived`].
    /// An error writing to the archive is returned as the outer error.
    fn append_entry<R: Read>(
        &mut self,
        source: &Path,
        entry: ArchiveEntry,
        content: R,
    ) -> Result<Result<(), TarkitError>, TarkitError> {
        let mut header = entry.to_header();
        let mut content = FixedSizeReader::new(content, entry.size);
        self.builder
            .append_data(&mut header, &entry.path, &mut content)
            .map_err(TarkitError::at(&self.archive_path))?;
        if let Some(fault) = content.fault {
            return Ok(Err(TarkitError::io(source, fault)));
        }
        tracing::debug!(entry = %entry.path, size = entry.size, "archived entry");
        self.report.archived.push(ArchivedEntry { source: source.to_path_buf(), entry });
        Ok(Ok(()))
    }

    /// Finishes the tar stream, the gzip trailer and flushes the file.
    ///
    /// This method consumes the writer and must be called to produce a valid archive.
    pub fn finalize(self) -> Result<ArchiveReport, TarkitError> {
        let archive_path = self.archive_path;
        let encoder = self.builder.into_inner().map_err(TarkitError::at(&archive_path))?;
        let mut buffered = encoder.finish().map_err(TarkitError::at(&archive_path))?;
        buffered.flush().map_err(TarkitError::at(&archive_path))?;
        Ok(self.report)
    }
}

/// Yields exactly `remaining` bytes. Once the inner reader fails or hits EOF early,
/// the rest is zeros and the first fault is kept for the caller.
struct FixedSizeReader<R> {
    inner: R,
    remaining: u64,
    fault: Option<io::Error>,
}

impl<R: Read> FixedSizeReader<R> {
    fn new(inner: R, size: u64) -> Self {
        Self { inner, remaining: size, fault: None }
    }
}

impl<R: Read> Read for FixedSizeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = usize::try_from(self.remaining).unwrap_or(usize::MAX).min(buf.len());
        if want == 0 {
            return Ok(0);
        }
        let buf = &mut buf[..want];
        let n = if self.fault.is_some() {
            0
        } else {
            match self.inner.read(buf) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => return Err(e),
                Err(e) => {
                    self.fault = Some(e);
                    0
                }
            }
        };
        let n = if n == 0 {
            if self.fault.is_none() {
                self.fault = Some(io::Error::new(io::ErrorKind::UnexpectedEof, "file shrank while it was being archived"));
            }
            buf.fill(0);
            want
        } else {
            n
        };
        self.remaining -= n as u64;
        Ok(n)
    }
}

/// Builds `archive_path` from the tree under `source_root`, leaving the sources untouched.
///
/// Under [`EntryErrorPolicy::FailFast`] a failed build removes the partial archive.
pub fn build_archive(
    archive_path: &Path,
    source_root: &Path,
    relative_root: Option<&Path>,
    options: ArchiveOptions,
) -> Result<ArchiveReport, TarkitError> {
    let mut writer = ArchiveWriter::create(archive_path, options)?;
    let result = writer.append_tree(source_root, relative_root).and_then(|_| writer.finalize());
    match result {
        Ok(report) => {
            tracing::info!(
                archive = %archive_path.display(),
                entries = report.archived.len(),
                skipped = report.failures.len(),
                "archive created"
            );
            Ok(report)
        }
        Err(e) => {
            let _ = fs::remove_file(archive_path);
            Err(e)
        }
    }
}

/// Deletes the source of every regular file recorded in `report`. Directories stay.
pub fn purge_archived_sources(report: &ArchiveReport) -> PurgeReport {
    let mut purge = PurgeReport::default();
    for path in report.archived_files() {
        match fs::remove_file(path) {
            Ok(()) => purge.removed.push(path.to_path_buf()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not remove archived source");
                purge.failures.push(EntryFailure { path: path.to_path_buf(), error: TarkitError::io(path, e) });
            }
        }
    }
    purge
}

/// Archives `source_root` into `archive_path` and then deletes the archived regular
/// files. The purge only runs once the archive is completely written.
pub fn create_archive(archive_path: &Path, source_root: &Path, relative_root: Option<&Path>) -> Result<CreateOutcome, TarkitError> {
    create_archive_with(archive_path, source_root, relative_root, ArchiveOptions::default())
}

/// [`create_archive`] with explicit options.
pub fn create_archive_with(
    archive_path: &Path,
    source_root: &Path,
    relative_root: Option<&Path>,
    options: ArchiveOptions,
) -> Result<CreateOutcome, TarkitError> {
    let archive = build_archive(archive_path, source_root, relative_root, options)?;
    let purge = purge_archived_sources(&archive);
    Ok(CreateOutcome { archive, purge })
}
