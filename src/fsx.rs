//! Cross-platform filesystem wrapper.
//!
//! On Unix we re-export `std::fs` and apply POSIX permission bits. On other
//! platforms the permission helpers are no-ops and modes fall back to the
//! conventional `0o644` / `0o755` so archives created there still carry sane
//! headers.

use std::io;
use std::path::Path;

pub use std::fs::*;

/// Mode given to every directory the extractor creates, regardless of the archived mode.
pub const DIR_MODE: u32 = 0o755;

#[cfg(not(unix))]
const DEFAULT_FILE_MODE: u32 = 0o644;

#[cfg(unix)]
/// Set POSIX permission bits on Unix.
pub fn set_unix_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
/// No-op off Unix: POSIX permission bits are not preserved.
pub fn set_unix_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Permission bits (`0o7777` mask) of a filesystem object.
pub fn mode_of(meta: &Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o7777
    }
    #[cfg(not(unix))]
    {
        if meta.is_dir() {
            DIR_MODE
        } else {
            DEFAULT_FILE_MODE
        }
    }
}

/// Creates `path` and any missing parents with [`DIR_MODE`].
///
/// The leaf gets its mode applied explicitly so the process umask does not leak into it.
pub fn create_dir_all_fixed(path: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)?;
    set_unix_permissions(path, DIR_MODE)
}

/// Opens `path` for writing with create + truncate semantics.
///
/// A newly created file starts with `mode`; callers still apply the mode afterwards
/// because an existing file keeps its old bits.
pub fn create_truncate(path: &Path, mode: u32) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    opts.open(path)
}
