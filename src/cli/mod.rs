use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log at debug level (RUST_LOG still wins when set).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Append logs to this file instead of stderr. Falls back to TARKIT_LOG_FILE.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// JSON configuration file with `logging` and `archive` sections.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Archive a directory into a .tar.gz and delete the archived files.
    #[command(alias = "c")]
    Create {
        /// The path for the output archive (e.g., backup.tar.gz). Its directory must exist.
        #[arg(required = true)]
        archive: PathBuf,

        /// The directory to archive.
        #[arg(required = true)]
        source: PathBuf,

        /// Compute entry names relative to this directory instead of SOURCE.
        #[arg(long)]
        relative_root: Option<PathBuf>,

        /// Leave the source files in place after archiving.
        #[arg(long)]
        keep_sources: bool,

        /// Abort on the first entry that cannot be archived (and remove the partial archive).
        #[arg(long)]
        fail_fast: bool,

        /// Gzip compression level (0-9). Defaults to the config file value, then 6.
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
        level: Option<u32>,

        /// Print the archive report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Extract a .tar.gz archive.
    #[command(alias = "x")]
    Extract {
        /// The archive file to extract.
        #[arg(required = true)]
        archive: PathBuf,

        /// The directory where files will be extracted. Defaults to the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract every *.tar.gz in a directory and delete each archive once extracted.
    ExtractAll {
        /// Directory to scan for archives.
        #[arg(required = true)]
        source_dir: PathBuf,

        /// Directory to extract into.
        #[arg(required = true)]
        dest_dir: PathBuf,

        /// Scan the whole subtree instead of the immediate children.
        #[arg(short, long)]
        recursive: bool,
    },

    /// Gzip-compress a single file.
    Gzip {
        #[arg(required = true)]
        input: PathBuf,

        /// Output path. Defaults to INPUT.gz.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decompress a single gzip file.
    Gunzip {
        #[arg(required = true)]
        input: PathBuf,

        /// Output path. Defaults to INPUT without its .gz suffix.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List files in a directory, optionally filtered by extension.
    #[command(alias = "l")]
    List {
        #[arg(required = true)]
        dir: PathBuf,

        /// Only files with this extension (case-insensitive, dot optional).
        #[arg(long, default_value = "")]
        ext: String,

        /// Walk the whole subtree.
        #[arg(short, long)]
        recursive: bool,
    },
}

/// Parses command-line arguments using `clap`.
///
/// This is the main entry point for the CLI logic. Usage errors, `--help` and
/// `--version` exit the process from inside clap.
pub fn run() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_flags_parse() {
        let args = Args::try_parse_from([
            "tarkit", "--debug", "create", "out.tar.gz", "src", "--relative-root", "..", "--keep-sources", "--level", "9",
        ])
        .unwrap();
        assert!(args.debug);
        match args.command {
            Commands::Create { archive, source, relative_root, keep_sources, fail_fast, level, .. } => {
                assert_eq!(archive, PathBuf::from("out.tar.gz"));
                assert_eq!(source, PathBuf::from("src"));
                assert_eq!(relative_root, Some(PathBuf::from("..")));
                assert!(keep_sources);
                assert!(!fail_fast);
                assert_eq!(level, Some(9));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn level_out_of_range_is_rejected() {
        assert!(Args::try_parse_from(["tarkit", "create", "a", "b", "--level", "12"]).is_err());
    }

    #[test]
    fn extract_all_is_kebab_case() {
        let args = Args::try_parse_from(["tarkit", "extract-all", "in", "out", "-r"]).unwrap();
        assert!(matches!(args.command, Commands::ExtractAll { recursive: true, .. }));
    }
}
