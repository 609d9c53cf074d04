// Plume - Pollutant baseline and peak analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Row and chunk data model.

use serde::{Deserialize, Serialize};

/// Unique identifier for a pollutant column.
pub type PollutantId = String;

/// A single timestamped record, one reading per pollutant column.
///
/// Rows are immutable once produced; the reading order is fixed by the
/// pollutant list discovered at the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Monotonic row index from the transcript.
    pub index: u64,
    /// Wall-clock timestamp as recorded by the acquisition side.
    pub time: String,
    /// Readings aligned with the pollutant list.
    pub readings: Vec<f64>,
}

impl Row {
    pub fn new(index: u64, time: impl Into<String>, readings: Vec<f64>) -> Self {
        Self {
            index,
            time: time.into(),
            readings,
        }
    }
}

/// An ordered batch of rows, bounded by the configured chunk size.
///
/// A chunk shorter than the configured size signals end-of-stream.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    rows: Vec<Row>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Extract one pollutant's readings across the chunk, in row order.
    pub fn series(&self, column: usize) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.readings.get(column).copied().unwrap_or(f64::NAN))
            .collect()
    }
}
