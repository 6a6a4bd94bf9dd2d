//! CSV output formatting.

use crate::error::{OutputError, OutputResult};
use crate::scanner::ScanResult;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names, matching the JSON field names.
pub const HEADER: [&str; 8] = [
    "host",
    "port",
    "status",
    "duration_ms",
    "service_hint",
    "banner",
    "http",
    "tls",
];

/// Write one header row and one row per result. Null values become empty cells;
/// the nested `http` and `tls` payloads are embedded as JSON.
pub fn write_csv<W: Write>(writer: W, results: &[ScanResult]) -> OutputResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(HEADER)?;

    for result in results {
        wtr.write_record([
            result.host.clone(),
            result.port.to_string(),
            result.status.to_string(),
            result.duration_ms.map_or(String::new(), |t| t.to_string()),
            result.service_hint.clone().unwrap_or_default(),
            result.banner.clone().unwrap_or_default(),
            nested_json(result.http.as_ref())?,
            nested_json(result.tls.as_ref())?,
        ])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write `<path>` as CSV.
pub fn write_csv_file(path: &Path, results: &[ScanResult]) -> OutputResult<()> {
    let file = File::create(path).map_err(|source| OutputError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(file, results)
}

fn nested_json<T: Serialize>(value: Option<&T>) -> OutputResult<String> {
    match value {
        Some(v) => Ok(serde_json::to_string(v)?),
        None => Ok(String::new()),
    }
}
