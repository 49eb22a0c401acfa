//! Command dispatch for the `tarkit` binary: loads configuration, installs logging and
//! runs the selected command.

use crate::archive::{build_archive, create_archive_with, ArchiveReport, EntryErrorPolicy};
use crate::batch::{process_archives_in_directory, ScanMode};
use crate::cli::{self, Args, Commands};
use crate::config::{resolve_log_file, Config};
use crate::extract::extract_archive_file;
use crate::files::{get_files, get_files_recursive};
use crate::gzip::{gunzip_file, gunzip_output_path, gzip_file, gzip_output_path};
use crate::logging::{init_logging, LoggingConfig};
use crate::report::TracingReporter;
use crate::TarkitError;

/// Public entry for running CLI logic.
pub fn run_cli_app() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::run();
    let config = Config::load(args.config.as_deref())?;

    let logging = LoggingConfig {
        debug: args.debug || config.logging.debug,
        log_file: resolve_log_file(args.log_file.clone(), config.logging.log_file.clone()),
        json: args.json_logs || config.logging.json,
    };
    match init_logging(&logging) {
        // A subscriber may already be installed when embedded.
        Ok(()) | Err(TarkitError::Other(_)) => {}
        Err(e) => return Err(e.into()),
    }

    run_command(&args, &config)
}

fn run_command(args: &Args, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match &args.command {
        Commands::Create { archive, source, relative_root, keep_sources, fail_fast, level, json } => {
            let mut options = config.archive.options();
            if let Some(level) = level {
                options.level = *level;
            }
            if *fail_fast {
                options.policy = EntryErrorPolicy::FailFast;
            }

            let report = if *keep_sources {
                build_archive(archive, source, relative_root.as_deref(), options)?
            } else {
                let outcome = create_archive_with(archive, source, relative_root.as_deref(), options)?;
                for failure in &outcome.purge.failures {
                    tracing::warn!(path = %failure.path.display(), error = %failure.error, "source not removed");
                }
                outcome.archive
            };
            print_create_report(&report, *json)?;
        }
        Commands::Extract { archive, output } => {
            let dest = match output {
                Some(p) => p.clone(),
                None => std::env::current_dir()?,
            };
            let summary = extract_archive_file(archive, &dest)?;
            println!(
                "Extracted {} files, {} directories ({} bytes) into {}",
                summary.files_written,
                summary.directories_created,
                summary.bytes_written,
                dest.display()
            );
        }
        Commands::ExtractAll { source_dir, dest_dir, recursive } => {
            let results = process_archives_in_directory(source_dir, dest_dir, ScanMode::from(*recursive), &TracingReporter);
            for r in &results {
                println!("{}\t{}", r.outcome, r.path.display());
            }
            let failed = results.iter().filter(|r| r.is_failure()).count();
            if failed > 0 {
                return Err(format!("{} of {} archives failed", failed, results.len()).into());
            }
        }
        Commands::Gzip { input, output } => {
            let out = output.clone().unwrap_or_else(|| gzip_output_path(input));
            let n = gzip_file(input, &out)?;
            println!("{} -> {} ({} bytes in)", input.display(), out.display(), n);
        }
        Commands::Gunzip { input, output } => {
            let out = output.clone().unwrap_or_else(|| gunzip_output_path(input));
            let n = gunzip_file(input, &out)?;
            println!("{} -> {} ({} bytes out)", input.display(), out.display(), n);
        }
        Commands::List { dir, ext, recursive } => {
            let files = if *recursive { get_files_recursive(dir, ext)? } else { get_files(dir, ext)? };
            for f in files {
                println!("{}", f.path.display());
            }
        }
    }
    Ok(())
}

fn print_create_report(report: &ArchiveReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| serde_json::json!({ "path": f.path, "error": f.error.to_string() }))
            .collect();
        let doc = serde_json::json!({
            "archive": report.archive_path,
            "entries": report.archived,
            "failures": failures,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }
    println!(
        "Archived {} entries ({} bytes) into {}",
        report.archived.len(),
        report.content_bytes(),
        report.archive_path.display()
    );
    for f in &report.failures {
        println!("skipped {}: {}", f.path.display(), f.error);
    }
    Ok(())
}
