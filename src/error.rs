use std::io;
use std::path::{Path, PathBuf};

/// The primary error type for all operations in the `tarkit` crate.
#[derive(Debug)]
pub enum TarkitError {
    /// An I/O error occurred while touching the filesystem.
    /// Includes the path where the error happened.
    Io { source: io::Error, path: PathBuf },

    /// The gzip or tar stream is malformed or truncated.
    Stream(io::Error),

    /// An error occurred when trying to strip the relative-root from a file path.
    StripPrefix { prefix: PathBuf, path: PathBuf },

    /// An archive entry is absolute or climbs out of the destination with `..`.
    UnsafeEntryPath(PathBuf),

    /// The archive writer met something that is neither a regular file nor a directory.
    UnsupportedEntry(PathBuf),

    /// The directory walker failed on a path.
    Walk(walkdir::Error),

    /// The configuration file could not be parsed.
    Config(serde_json::Error),

    /// No date could be found in the input string.
    NoDate(String),

    /// A date string does not have the expected `YYYYMMDD` shape.
    InvalidDate(String),

    /// A wrapper for any other error that doesn't fit the specific variants.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl TarkitError {
    /// Builds an `Io` error bound to `path`.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        TarkitError::Io { source, path: path.as_ref().to_path_buf() }
    }

    /// Returns a closure for `map_err` that binds an I/O error to `path`.
    pub(crate) fn at(path: &Path) -> impl FnOnce(io::Error) -> TarkitError + '_ {
        move |source| TarkitError::io(path, source)
    }
}

impl std::fmt::Display for TarkitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TarkitError::Io { source, path } => write!(f, "I/O error on path '{}': {}", path.display(), source),
            TarkitError::Stream(e) => write!(f, "Corrupt or truncated archive stream: {}", e),
            TarkitError::StripPrefix { prefix, path } => write!(f, "Could not strip prefix '{}' from path '{}'", prefix.display(), path.display()),
            TarkitError::UnsafeEntryPath(p) => write!(f, "Archive entry '{}' escapes the destination directory", p.display()),
            TarkitError::UnsupportedEntry(p) => write!(f, "Unsupported file type at '{}'", p.display()),
            TarkitError::Walk(e) => write!(f, "Directory walk failed: {}", e),
            TarkitError::Config(e) => write!(f, "Configuration error: {}", e),
            TarkitError::NoDate(input) => write!(f, "No date found in the string '{}'", input),
            TarkitError::InvalidDate(input) => write!(f, "Date '{}' should be in format YYYYMMDD", input),
            TarkitError::Other(e) => write!(f, "An unexpected error occurred: {}", e),
        }
    }
}

impl std::error::Error for TarkitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TarkitError::Io { source, .. } => Some(source),
            TarkitError::Stream(e) => Some(e),
            TarkitError::Walk(e) => Some(e),
            TarkitError::Config(e) => Some(e),
            TarkitError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TarkitError {
    fn from(err: serde_json::Error) -> Self {
        TarkitError::Config(err)
    }
}

impl From<walkdir::Error> for TarkitError {
    fn from(err: walkdir::Error) -> Self {
        TarkitError::Walk(err)
    }
}

// Generic IO error conversion that doesn't require a path
impl From<io::Error> for TarkitError {
    fn from(err: io::Error) -> Self {
        TarkitError::Io { source: err, path: PathBuf::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_error_display_names_the_path() {
        let err = TarkitError::io("/tmp/missing.tar.gz", io::Error::new(io::ErrorKind::NotFound, "gone"));
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.tar.gz"));
        assert!(msg.contains("gone"));
        assert!(err.source().is_some());
    }

    #[test]
    fn strip_prefix_has_no_source() {
        let err = TarkitError::StripPrefix { prefix: "/a".into(), path: "/b/c".into() };
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "Could not strip prefix '/a' from path '/b/c'");
    }
}
