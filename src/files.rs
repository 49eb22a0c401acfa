//! Plain file helpers: listing by extension, extension-based deletion, move/copy and
//! "unknown file" scans.
//!
//! Extension filters are case-insensitive and accept the extension with or without the
//! leading dot. The extension of a name is everything from its last `.`, so
//! `archive.tar.gz` has extension `.gz`.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::report::Reporter;
use crate::{fsx as fs, TarkitError};

/// A file found by [`get_files`] or [`get_files_recursive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub name: String,
}

/// `".txt"` for `"txt"` or `".TXT"`, lowercased. Empty stays empty.
fn normalize_ext(ext: &str) -> String {
    if ext.is_empty() {
        return String::new();
    }
    let ext = ext.to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Extension of a file name including the dot, from the last `.` onward.
fn dotted_extension(name: &str) -> &str {
    name.rfind('.').map(|i| &name[i..]).unwrap_or("")
}

fn matches_ext(name: &str, wanted: &str) -> bool {
    wanted.is_empty() || dotted_extension(name).to_lowercase() == wanted
}

/// Lists the non-directory entries directly inside `directory` whose extension matches
/// `extension` (all files when it is empty). Subdirectories are not entered.
pub fn get_files(directory: &Path, extension: &str) -> Result<Vec<FileInfo>, TarkitError> {
    let wanted = normalize_ext(extension);
    let mut files = Vec::new();
    for item in fs::read_dir(directory).map_err(TarkitError::at(directory))? {
        let dent = item.map_err(TarkitError::at(directory))?;
        let ft = dent.file_type().map_err(TarkitError::at(&dent.path()))?;
        if ft.is_dir() {
            continue;
        }
        let name = dent.file_name().to_string_lossy().into_owned();
        if matches_ext(&name, &wanted) {
            files.push(FileInfo { path: dent.path(), name });
        }
    }
    Ok(files)
}

/// Like [`get_files`] but walks the whole subtree. The first walk error aborts.
pub fn get_files_recursive(directory: &Path, extension: &str) -> Result<Vec<FileInfo>, TarkitError> {
    let wanted = normalize_ext(extension);
    let mut files = Vec::new();
    for item in WalkDir::new(directory) {
        let dent = item?;
        if dent.file_type().is_dir() {
            continue;
        }
        let name = dent.file_name().to_string_lossy().into_owned();
        if matches_ext(&name, &wanted) {
            files.push(FileInfo { path: dent.into_path(), name });
        }
    }
    Ok(files)
}

/// Recursively deletes every file under `dir_path` whose extension is in `extensions`.
/// Returns the number of files removed. The first error aborts.
pub fn delete_files_in_dir(dir_path: &Path, extensions: &[&str]) -> Result<usize, TarkitError> {
    let wanted: Vec<String> = extensions.iter().map(|e| normalize_ext(e)).filter(|e| !e.is_empty()).collect();
    let mut removed = 0;
    for item in WalkDir::new(dir_path) {
        let dent = item?;
        if dent.file_type().is_dir() {
            continue;
        }
        let ext = dotted_extension(&dent.file_name().to_string_lossy()).to_lowercase();
        if wanted.iter().any(|w| *w == ext) {
            fs::remove_file(dent.path()).map_err(TarkitError::at(dent.path()))?;
            tracing::debug!(path = %dent.path().display(), "deleted");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Copies `source` to `dest_dir/filename`, creating `dest_dir` when needed.
/// Returns the destination path.
pub fn copy_file(source: &Path, dest_dir: &Path, filename: &str) -> Result<PathBuf, TarkitError> {
    let mut src = fs::File::open(source).map_err(TarkitError::at(source))?;
    fs::create_dir_all(dest_dir).map_err(TarkitError::at(dest_dir))?;
    let dest = dest_dir.join(filename);
    let mut dst = fs::File::create(&dest).map_err(TarkitError::at(&dest))?;
    io::copy(&mut src, &mut dst).map_err(TarkitError::at(&dest))?;
    dst.sync_all().map_err(TarkitError::at(&dest))?;
    Ok(dest)
}

/// Moves `source` to `dest_dir/filename` by copying and then removing the source, so
/// it also works across filesystems.
pub fn move_file(source: &Path, dest_dir: &Path, filename: &str) -> Result<PathBuf, TarkitError> {
    let dest = copy_file(source, dest_dir, filename)?;
    fs::remove_file(source).map_err(TarkitError::at(source))?;
    Ok(dest)
}

/// Warns about every non-directory entry directly inside `dir_path`.
/// Returns how many were reported.
pub fn log_files_in_dir(dir_path: &Path, reporter: &dyn Reporter) -> Result<usize, TarkitError> {
    let mut count = 0;
    for item in fs::read_dir(dir_path).map_err(TarkitError::at(dir_path))? {
        let dent = item.map_err(TarkitError::at(dir_path))?;
        if !dent.file_type().map_err(TarkitError::at(&dent.path()))?.is_dir() {
            reporter.warn(format_args!("unknown file detected {}", dent.path().display()));
            count += 1;
        }
    }
    Ok(count)
}

/// Recursive variant of [`log_files_in_dir`]. The first walk error aborts.
pub fn log_files_in_dir_recursive(dir_path: &Path, reporter: &dyn Reporter) -> Result<usize, TarkitError> {
    let mut count = 0;
    for item in WalkDir::new(dir_path) {
        let dent = item?;
        if !dent.file_type().is_dir() {
            reporter.warn(format_args!("unknown file detected {}", dent.path().display()));
            count += 1;
        }
    }
    Ok(count)
}
