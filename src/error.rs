// Plume - Pollutant baseline and peak analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the analytic core

use thiserror::Error;

/// Main error type for core operations
#[derive(Error, Debug)]
pub enum PlumeError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Pollutant not registered
    #[error("Unknown pollutant: {0}")]
    UnknownPollutant(String),

    /// Pollutant already registered
    #[error("Pollutant already registered: {0}")]
    PollutantAlreadyRegistered(String),

    /// Row carries a different number of readings than registered pollutants
    #[error("Row {row} carries {got} readings, expected {expected}")]
    ReadingCountMismatch {
        row: u64,
        got: usize,
        expected: usize,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, PlumeError>;
