//! Common utilities and types module.
// Shared entry types and path helpers used by both the writer and the reader.

use std::fs::Metadata;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::Serialize;
use tar::{EntryType, Header};

use crate::fsx;

/// The kind of a single archive record.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Metadata for a single file or directory record within a tar stream.
///
/// Content is never held here; it is streamed straight between the filesystem and the archive.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// POSIX-style relative path, no leading `/` or `./`.
    pub path: String,
    pub kind: EntryKind,
    /// Content length for files, always 0 for directories.
    pub size: u64,
    /// Permission bits masked with `0o7777`.
    pub mode: u32,
    pub modified_time: u64, // Unix timestamp
}

impl ArchiveEntry {
    /// Builds an entry from filesystem metadata. Returns `None` for anything that is
    /// neither a regular file nor a directory.
    pub fn from_metadata(path: String, meta: &Metadata) -> Option<Self> {
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else if meta.is_file() {
            EntryKind::File
        } else {
            return None;
        };
        let modified_time = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Some(Self {
            path,
            kind,
            size: if kind == EntryKind::File { meta.len() } else { 0 },
            mode: fsx::mode_of(meta),
            modified_time,
        })
    }

    /// Reads an entry back from a tar header. Returns `None` for entry kinds the
    /// extractor does not handle (symlinks, devices, extension records).
    pub fn from_header(path: String, header: &Header) -> Option<Self> {
        let entry_type = header.entry_type();
        let kind = if entry_type.is_dir() {
            EntryKind::Directory
        } else if entry_type.is_file() {
            EntryKind::File
        } else {
            return None;
        };
        Some(Self {
            path,
            kind,
            size: if kind == EntryKind::File { header.size().unwrap_or(0) } else { 0 },
            mode: header.mode().unwrap_or(0) & 0o7777,
            modified_time: header.mtime().unwrap_or(0),
        })
    }

    /// Produces a GNU tar header for this entry. The path and checksum are filled in
    /// by `tar::Builder::append_data`.
    pub fn to_header(&self) -> Header {
        let mut header = Header::new_gnu();
        match self.kind {
            EntryKind::File => header.set_entry_type(EntryType::Regular),
            EntryKind::Directory => header.set_entry_type(EntryType::Directory),
        }
        header.set_size(self.size);
        header.set_mode(self.mode);
        header.set_mtime(self.modified_time);
        header
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Normalize path by replacing backslashes with forward slashes.
/// Removes `./` prefixes and doubled separators while preserving all directories.
/// Example: "./dir1\\dir2/file.txt" becomes "dir1/dir2/file.txt"
pub fn normalize_path(path: &str) -> String {
    let s = path.replace('\\', "/");
    let mut trimmed = s.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    let mut res = trimmed.to_string();
    while res.contains("//") {
        res = res.replace("//", "/");
    }
    res.trim_end_matches('/').to_string()
}

/// Converts a relative filesystem path into the name stored in the archive.
pub fn archive_name(rel: &Path) -> String {
    normalize_path(&rel.to_string_lossy())
}

/// True when `path` stays inside whatever directory it is joined onto:
/// not absolute and no `..` components.
pub fn is_contained(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Makes `path` absolute against the current directory and folds `.` and `..`
/// lexically. Symlinks are not resolved and the path need not exist.
pub fn absolute_clean(path: &Path) -> io::Result<PathBuf> {
    let base = if path.is_absolute() { PathBuf::new() } else { std::env::current_dir()? };
    Ok(clean_from(&base, path))
}

fn clean_from(base: &Path, path: &Path) -> PathBuf {
    let mut out = base.to_path_buf();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_dot_prefix_and_backslashes() {
        assert_eq!(normalize_path("./dir1\\dir2/file.txt"), "dir1/dir2/file.txt");
        assert_eq!(normalize_path("././a//b/"), "a/b");
        assert_eq!(normalize_path("plain.txt"), "plain.txt");
    }

    #[test]
    fn containment_rejects_escapes() {
        assert!(is_contained(Path::new("a/b/c.txt")));
        assert!(is_contained(Path::new("./a")));
        assert!(!is_contained(Path::new("../etc/passwd")));
        assert!(!is_contained(Path::new("a/../../b")));
        assert!(!is_contained(&PathBuf::from("/abs/path")));
    }

    #[test]
    fn header_round_trip_keeps_kind_size_and_mode() {
        let entry = ArchiveEntry {
            path: "logs/app.log".into(),
            kind: EntryKind::File,
            size: 42,
            mode: 0o640,
            modified_time: 1_700_000_000,
        };
        let header = entry.to_header();
        let back = ArchiveEntry::from_header(entry.path.clone(), &header).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn symlink_headers_are_not_entries() {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        assert!(ArchiveEntry::from_header("link".into(), &header).is_none());
    }

    #[test]
    fn clean_from_folds_dots_against_the_base() {
        let base = Path::new("/work/job");
        assert_eq!(clean_from(base, Path::new(".")), PathBuf::from("/work/job"));
        assert_eq!(clean_from(base, Path::new("data/./x")), PathBuf::from("/work/job/data/x"));
        assert_eq!(clean_from(base, Path::new("../other")), PathBuf::from("/work/other"));
        assert_eq!(clean_from(base, Path::new("/abs/a/../b")), PathBuf::from("/abs/b"));
    }

    #[test]
    fn absolute_clean_keeps_absolute_inputs_rooted() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute_clean(Path::new(".")).unwrap(), clean_from(&cwd, Path::new(".")));
        assert!(absolute_clean(Path::new("rel/dir")).unwrap().is_absolute());
    }
}
