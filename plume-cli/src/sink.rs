// Plume CLI - Batch post-processing for pollutant transcripts
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! CSV row sink.
//!
//! Creates the output file up front so an unwritable destination fails
//! before any processing, and writes the header exactly once via an
//! explicit first-write flag rather than inferring it from row indices.

use crate::error::Result;
use std::fs::File;
use std::path::Path;

/// CSV writer with a header written on first use.
pub struct CsvSink {
    writer: csv::Writer<File>,
    header: Vec<String>,
    header_written: bool,
}

impl CsvSink {
    /// Create (or truncate) the output file.
    pub fn create(path: &Path, header: Vec<String>) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self {
            writer,
            header,
            header_written: false,
        })
    }

    /// Write one record, emitting the header first if needed.
    pub fn write_row(&mut self, fields: &[String]) -> Result<()> {
        if !self.header_written {
            self.writer.write_record(&self.header)?;
            self.header_written = true;
        }
        self.writer.write_record(fields)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Insert a tag before a trailing `(unit)` suffix:
/// `NO2 (ppb)` + `baseline` -> `NO2 baseline (ppb)`.
pub fn annotated_column(name: &str, tag: &str) -> String {
    match name.find(" (") {
        Some(at) => format!("{} {}{}", &name[..at], tag, &name[at..]),
        None => format!("{name} {tag}"),
    }
}

/// Threshold column name, unit stripped: `NO2 (ppb)` -> `NO2 thresh`.
pub fn thresh_column(name: &str) -> String {
    let base = match name.find(" (") {
        Some(at) => &name[..at],
        None => name,
    };
    format!("{base} thresh")
}

/// Short lowercase pollutant key used for overrides and event labels:
/// `NO2 (ppb)` -> `no2`.
pub fn pollutant_key(name: &str) -> String {
    let base = match name.find(" (") {
        Some(at) => &name[..at],
        None => name,
    };
    base.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_header_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let header = vec!["Row".to_string(), "Value".to_string()];
        let mut sink = CsvSink::create(&path, header).unwrap();
        sink.write_row(&["0".to_string(), "1.5".to_string()]).unwrap();
        sink.write_row(&["1".to_string(), "2.5".to_string()]).unwrap();
        sink.flush().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Row,Value", "0,1.5", "1,2.5"]);
    }

    #[test]
    fn test_unwritable_destination_fails_at_creation() {
        let err = CsvSink::create(
            Path::new("/definitely/not/a/dir/out.csv"),
            vec!["Row".to_string()],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_annotated_column_names() {
        assert_eq!(annotated_column("NO2 (ppb)", "baseline"), "NO2 baseline (ppb)");
        assert_eq!(
            annotated_column("WCPC (#/cm^3)", "peak"),
            "WCPC peak (#/cm^3)"
        );
        assert_eq!(annotated_column("NO2", "peak"), "NO2 peak");
    }

    #[test]
    fn test_thresh_column_strips_unit() {
        assert_eq!(thresh_column("NO2 (ppb)"), "NO2 thresh");
        assert_eq!(thresh_column("WD"), "WD thresh");
    }

    #[test]
    fn test_pollutant_key() {
        assert_eq!(pollutant_key("NO2 (ppb)"), "no2");
        assert_eq!(pollutant_key("WCPC (#/cm^3)"), "wcpc");
        assert_eq!(pollutant_key("WS"), "ws");
    }
}
