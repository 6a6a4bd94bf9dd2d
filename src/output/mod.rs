//! Output formatting module.
//!
//! Result files (`<prefix>.results.json`, `<prefix>.results.csv`) plus the
//! console summary.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{write_csv, write_csv_file, HEADER as CSV_HEADER};
pub use json_format::{write_json, write_json_file};
pub use plain::{print_scan_header, print_success, print_summary, write_summary};

use crate::error::OutputResult;
use crate::scanner::ScanResult;
use std::path::{Path, PathBuf};

/// Where the result files for a prefix live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

impl OutputPaths {
    /// `recon_results` becomes `recon_results.results.json` and `.csv`.
    pub fn for_prefix(prefix: &str) -> Self {
        Self {
            json: PathBuf::from(format!("{}.results.json", prefix)),
            csv: PathBuf::from(format!("{}.results.csv", prefix)),
        }
    }
}

/// Write both result files for `prefix`.
pub fn write_results(prefix: &str, results: &[ScanResult]) -> OutputResult<OutputPaths> {
    let paths = OutputPaths::for_prefix(prefix);
    ensure_parent(&paths.json)?;
    write_json_file(&paths.json, results)?;
    write_csv_file(&paths.csv, results)?;
    Ok(paths)
}

fn ensure_parent(path: &Path) -> OutputResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            std::fs::create_dir_all(dir).map_err(|source| crate::error::OutputError::WriteFailed {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ScanStatus, ScanTask};
    use crate::types::Port;
    use tokio_test::assert_ok;

    fn sample() -> Vec<ScanResult> {
        let open = ScanTask::new("127.0.0.1", Port::new(8080).unwrap());
        let filtered = ScanTask::new("10.9.9.9", Port::new(22).unwrap());
        vec![
            ScanResult::new(&open, ScanStatus::Open)
                .with_duration(Some(4))
                .with_service_hint("http"),
            ScanResult::new(&filtered, ScanStatus::FilteredTimeout).with_duration(Some(1000)),
        ]
    }

    #[test]
    fn test_prefix_paths() {
        let paths = OutputPaths::for_prefix("out/lab");
        assert_eq!(paths.json, PathBuf::from("out/lab.results.json"));
        assert_eq!(paths.csv, PathBuf::from("out/lab.results.csv"));
    }

    #[test]
    fn test_json_is_array_of_results() {
        let mut buf = Vec::new();
        assert_ok!(write_json(&mut buf, &sample()));

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["status"], "open");
        assert_eq!(items[1]["status"], "filtered_timeout");
        assert!(items[1]["service_hint"].is_null());
        assert!(items[1]["tls"].is_null());
    }

    #[test]
    fn test_csv_header_and_rows() {
        let mut buf = Vec::new();
        assert_ok!(write_csv(&mut buf, &sample()));

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "host,port,status,duration_ms,service_hint,banner,http,tls");
        assert_eq!(lines[1], "127.0.0.1,8080,open,4,http,,,");
        assert_eq!(lines[2], "10.9.9.9,22,filtered_timeout,1000,,,,");
    }

    #[test]
    fn test_write_results_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("nested").join("scan");

        let paths = assert_ok!(write_results(prefix.to_str().unwrap(), &sample()));
        assert!(paths.json.exists());
        assert!(paths.csv.exists());

        let parsed: Vec<ScanResult> =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_empty_results_still_write_headers() {
        let mut buf = Vec::new();
        assert_ok!(write_csv(&mut buf, &[]));
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);

        let mut buf = Vec::new();
        assert_ok!(write_json(&mut buf, &[]));
        assert_eq!(String::from_utf8(buf).unwrap(), "[]");
    }
}
