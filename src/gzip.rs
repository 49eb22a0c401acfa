//! Single-file gzip compression and decompression.

use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::{fsx as fs, TarkitError};

/// Compresses `input` into `output` (created or truncated). Returns the number of
/// uncompressed bytes read.
pub fn gzip_file(input: &Path, output: &Path) -> Result<u64, TarkitError> {
    let src = fs::File::open(input).map_err(TarkitError::at(input))?;
    let dst = fs::File::create(output).map_err(TarkitError::at(output))?;

    let mut encoder = GzEncoder::new(BufWriter::new(dst), Compression::default());
    let n = io::copy(&mut BufReader::new(src), &mut encoder).map_err(TarkitError::at(input))?;
    // The trailer is only written by finish(); a silent drop would lose write errors.
    let mut inner = encoder.finish().map_err(TarkitError::at(output))?;
    inner.flush().map_err(TarkitError::at(output))?;
    Ok(n)
}

/// Decompresses `input` into `output`. Concatenated gzip members are all decoded.
pub fn gunzip_file(input: &Path, output: &Path) -> Result<u64, TarkitError> {
    let src = fs::File::open(input).map_err(TarkitError::at(input))?;
    let dst = fs::File::create(output).map_err(TarkitError::at(output))?;

    let mut decoder = MultiGzDecoder::new(BufReader::new(src));
    let mut writer = BufWriter::new(dst);
    let n = io::copy(&mut decoder, &mut writer).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => TarkitError::Stream(e),
        _ => TarkitError::io(output, e),
    })?;
    writer.flush().map_err(TarkitError::at(output))?;
    Ok(n)
}

/// Default output name for [`gzip_file`]: `name` + `.gz`.
pub fn gzip_output_path(input: &Path) -> std::path::PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".gz");
    name.into()
}

/// Default output name for [`gunzip_file`]: strips a trailing `.gz`, or appends `.out`.
pub fn gunzip_output_path(input: &Path) -> std::path::PathBuf {
    let s = input.to_string_lossy();
    match s.strip_suffix(".gz") {
        Some(stem) if !stem.is_empty() && !stem.ends_with('/') => stem.into(),
        _ => format!("{}.out", s).into(),
    }
}
