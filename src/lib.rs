//! # tarkit Core Library
//!
//! Filesystem helpers built around a small tar.gz engine.
//!
//! ## Key Modules
//!
//! - [`archive`]: builds `.tar.gz` archives from a directory tree and purges the archived sources.
//! - [`extract`]: extracts a gzip-compressed tar stream into a directory.
//! - [`batch`]: extracts every `*.tar.gz` in a directory, isolating per-archive failures.
//! - [`gzip`]: single-file gzip compression and decompression.
//! - [`files`]: listing by extension, deletion, move/copy and unknown-file scans.
//! - [`marker`]: `touch` and day/month-change detection.
//! - [`text`]: date extraction from file names.
//! - [`report`]: the `Reporter` sink passed to operations that keep going after failures.
//!
//! ## Examples
//!
//! ```no_run
//! use std::path::Path;
//! use tarkit::{archive, batch, report::TracingReporter};
//!
//! // Archive a spool directory, deleting the files that made it into the archive.
//! let outcome = archive::create_archive(Path::new("/backup/spool.tar.gz"), Path::new("/var/spool/app"), None)?;
//! assert!(outcome.archive.is_complete());
//!
//! // Later: unpack every archive dropped into an inbox.
//! let results = batch::process_archives_in_directory(
//!     Path::new("/inbox"),
//!     Path::new("/restore"),
//!     batch::ScanMode::Flat,
//!     &TracingReporter,
//! );
//! println!("{} archives processed", results.len());
//! # Ok::<(), tarkit::TarkitError>(())
//! ```

pub mod archive;
pub mod batch;
pub mod cli;
pub mod cli_runner;
pub mod common;
pub mod config;
pub mod error;
pub use error::TarkitError;
pub mod extract;
pub mod files;
pub mod gzip;
pub mod logging;
pub mod marker;
pub mod report;
pub mod text;

// Cross-platform filesystem wrapper
pub mod fsx;
