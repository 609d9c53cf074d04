// Plume CLI - Batch post-processing for pollutant transcripts
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Chunked CSV row source.
//!
//! Reads a sensor transcript (`Row, Time, <pollutant columns>…`) in fixed
//! size chunks. The pollutant list is discovered from the header; every
//! numeric field must parse or the whole run aborts with row/column
//! context, so the analytic core never sees partially-typed rows.

use crate::error::{CliError, Result};
use plume::row::{Chunk, Row};
use std::fs::File;
use std::path::Path;

/// Chunked reader over a sensor transcript.
pub struct CsvSource {
    records: csv::StringRecordsIntoIter<File>,
    header: Vec<String>,
    pollutants: Vec<String>,
    chunk_size: usize,
    rows_read: u64,
}

impl CsvSource {
    /// Open a transcript and read its header.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::InputNotFound(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_path(path)?;
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if header.len() < 3 {
            return Err(CliError::Settings(format!(
                "'{}' needs Row, Time and at least one pollutant column",
                path.display()
            )));
        }
        let pollutants = header[2..].to_vec();

        Ok(Self {
            records: reader.into_records(),
            header,
            pollutants,
            chunk_size,
            rows_read: 0,
        })
    }

    /// Full input header, as read.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Pollutant column names, in column order.
    pub fn pollutants(&self) -> &[String] {
        &self.pollutants
    }

    /// Read the next chunk; `None` once the transcript is exhausted.
    ///
    /// A chunk shorter than the configured size is the end-of-stream
    /// signal; the caller sees it as the final chunk.
    pub fn read_chunk(&mut self) -> Result<Option<Chunk>> {
        let mut chunk = Chunk::new();
        while chunk.len() < self.chunk_size {
            match self.records.next() {
                Some(record) => {
                    let record = record?;
                    chunk.push(self.parse_row(&record)?);
                }
                None => break,
            }
        }

        if chunk.is_empty() {
            Ok(None)
        } else {
            Ok(Some(chunk))
        }
    }

    fn parse_row(&mut self, record: &csv::StringRecord) -> Result<Row> {
        let row_number = self.rows_read;
        let field = |at: usize| record.get(at).unwrap_or("").trim();

        let index: u64 = field(0).parse().map_err(|_| CliError::BadField {
            row: row_number,
            column: self.header[0].clone(),
            value: field(0).to_string(),
        })?;
        let time = field(1).to_string();

        let mut readings = Vec::with_capacity(self.pollutants.len());
        for (offset, name) in self.pollutants.iter().enumerate() {
            let raw = field(2 + offset);
            let value: f64 = raw.parse().map_err(|_| CliError::BadField {
                row: row_number,
                column: name.clone(),
                value: raw.to_string(),
            })?;
            readings.push(value);
        }

        self.rows_read += 1;
        Ok(Row::new(index, time, readings))
    }
}
