// Plume CLI - Batch post-processing for pollutant transcripts
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the CLI.

use thiserror::Error;

/// Main error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from the analytic core
    #[error(transparent)]
    Core(#[from] plume::PlumeError),

    /// Invalid or missing settings
    #[error("Settings error: {0}")]
    Settings(String),

    /// Input transcript not found
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    /// A row field failed to parse
    #[error("Row {row}: cannot parse {column} value '{value}'")]
    BadField {
        row: u64,
        column: String,
        value: String,
    },
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
