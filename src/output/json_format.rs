//! JSON output formatting.

use crate::error::{OutputError, OutputResult};
use crate::scanner::ScanResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encode results as a pretty-printed JSON array.
pub fn write_json<W: Write>(writer: W, results: &[ScanResult]) -> OutputResult<()> {
    serde_json::to_writer_pretty(writer, results)?;
    Ok(())
}

/// Write `<path>` as a JSON array of results.
pub fn write_json_file(path: &Path, results: &[ScanResult]) -> OutputResult<()> {
    let file = File::create(path).map_err(|source| OutputError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write_json(&mut writer, results)?;
    writer.flush().map_err(|source| OutputError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
