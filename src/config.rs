// Plume - Pollutant baseline and peak analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Configuration types for the analytic core.

use crate::error::{PlumeError, Result};
use serde::{Deserialize, Serialize};

/// Baseline extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Base window length for minimum tracking.
    pub window_size: usize,

    /// Number of cascaded smoothing scales (>= 1).
    pub smoothing_index: u32,

    /// Rows per processed batch.
    pub chunk_size: usize,

    /// Enable chunk-boundary correction using one-chunk lookahead.
    pub interlace_chunks: bool,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            window_size: 3,
            smoothing_index: 5,
            chunk_size: 3000,
            interlace_chunks: true,
        }
    }
}

impl BaselineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(PlumeError::InvalidConfig(
                "window_size must be at least 1".to_string(),
            ));
        }
        if self.smoothing_index == 0 {
            return Err(PlumeError::InvalidConfig(
                "smoothing_index must be at least 1".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(PlumeError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Adaptive peak detector ("A1") configuration, one instance per pollutant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Multiplier on the below-percentile standard deviation.
    pub coeff: f64,

    /// Percentile defining the "below" split point.
    pub percentile: f64,

    /// Optional additive percentile term (0 disables).
    pub thresh_bump_percentile: f64,

    /// Minimum samples seen before detection is enabled.
    pub startup_bypass: u32,

    /// Capacity of the per-pollutant trace buffer.
    pub trace_length: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            coeff: 15.0,
            percentile: 50.0,
            thresh_bump_percentile: 0.0,
            startup_bypass: 30,
            trace_length: 60,
        }
    }
}

impl DetectorConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(PlumeError::InvalidConfig(format!(
                "percentile must be within [0, 100], got {}",
                self.percentile
            )));
        }
        if !(0.0..=100.0).contains(&self.thresh_bump_percentile) {
            return Err(PlumeError::InvalidConfig(format!(
                "thresh_bump_percentile must be within [0, 100], got {}",
                self.thresh_bump_percentile
            )));
        }
        if self.coeff < 0.0 || !self.coeff.is_finite() {
            return Err(PlumeError::InvalidConfig(format!(
                "coeff must be a finite non-negative number, got {}",
                self.coeff
            )));
        }
        if self.trace_length == 0 {
            return Err(PlumeError::InvalidConfig(
                "trace_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Flat-threshold crossing detector ("AQ") configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossingConfig {
    /// Fixed crossing threshold for the pollutant.
    pub threshold: f64,
}

impl CrossingConfig {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(PlumeError::InvalidConfig(format!(
                "crossing threshold must be finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}
