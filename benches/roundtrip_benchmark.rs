// benches/roundtrip_benchmark.rs
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use rand::{thread_rng, RngCore};
use tarkit::archive::{build_archive, ArchiveOptions};
use tarkit::extract::extract_archive_file;
use tempfile::tempdir;

struct BenchProfile {
    name: &'static str,
    files: usize,
    file_size: usize,
    level: u32,
}

struct BenchResult {
    profile_name: &'static str,
    input_size: u64,
    archive_size: u64,
    create_time: Duration,
    extract_time: Duration,
}

// Helper to format bytes into a readable string
fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;

    if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

fn populate(dir: &Path, profile: &BenchProfile) -> io::Result<u64> {
    let mut rng = thread_rng();
    let mut buf = vec![0u8; profile.file_size];
    for i in 0..profile.files {
        let sub = dir.join(format!("d{}", i % 8));
        fs::create_dir_all(&sub)?;
        // Half random, half repetitive so the compressor has something to do.
        rng.fill_bytes(&mut buf[..profile.file_size / 2]);
        fs::write(sub.join(format!("f{i}.bin")), &buf)?;
    }
    Ok((profile.files * profile.file_size) as u64)
}

fn run_profile(profile: &BenchProfile) -> Result<BenchResult, Box<dyn std::error::Error>> {
    let src = tempdir()?;
    let input_size = populate(src.path(), profile)?;
    let work = tempdir()?;
    let archive = work.path().join("bench.tar.gz");

    let start = Instant::now();
    build_archive(&archive, src.path(), None, ArchiveOptions { level: profile.level, ..Default::default() })?;
    let create_time = start.elapsed();
    let archive_size = fs::metadata(&archive)?.len();

    let out = work.path().join("out");
    let start = Instant::now();
    extract_archive_file(&archive, &out)?;
    let extract_time = start.elapsed();

    Ok(BenchResult { profile_name: profile.name, input_size, archive_size, create_time, extract_time })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let profiles = [
        BenchProfile { name: "many small, L1", files: 2_000, file_size: 2 * 1024, level: 1 },
        BenchProfile { name: "many small, L6", files: 2_000, file_size: 2 * 1024, level: 6 },
        BenchProfile { name: "few large, L6", files: 16, file_size: 4 * 1024 * 1024, level: 6 },
        BenchProfile { name: "few large, L9", files: 16, file_size: 4 * 1024 * 1024, level: 9 },
    ];

    let mut results = Vec::new();
    for p in &profiles {
        println!("Running profile: {}", p.name);
        results.push(run_profile(p)?);
    }

    println!();
    println!("{:<18} {:>12} {:>12} {:>10} {:>10}", "profile", "input", "archive", "create", "extract");
    for r in results {
        println!(
            "{:<18} {:>12} {:>12} {:>9.2}s {:>9.2}s",
            r.profile_name,
            format_bytes(r.input_size),
            format_bytes(r.archive_size),
            r.create_time.as_secs_f64(),
            r.extract_time.as_secs_f64()
        );
    }
    Ok(())
}
