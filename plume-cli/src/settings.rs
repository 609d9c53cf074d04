// Plume CLI - Batch post-processing for pollutant transcripts
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Settings file handling.
//!
//! A single JSON document configures both post-processors. Every field has
//! a default, so a partial file is enough; everything is validated at load
//! time, before any processing starts. Per-pollutant overrides are keyed by
//! the short lowercase pollutant name (the column name with its unit
//! stripped, e.g. `no2` for `NO2 (ppb)`).

use crate::error::{CliError, Result};
use plume::config::{BaselineConfig, CrossingConfig, DetectorConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Top-level settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Input transcript path.
    pub input: String,
    /// Output transcript path.
    pub output: String,
    /// Optional event log path for the peaks run.
    pub events_output: Option<String>,
    /// Rows per processed batch.
    pub chunk_size: usize,
    /// Baseline extraction settings.
    pub baseline: BaselineSettings,
    /// Peak detector defaults, applied to every pollutant.
    pub detector: DetectorSettings,
    /// Per-pollutant overrides keyed by short lowercase name.
    pub pollutants: HashMap<String, PollutantOverrides>,
    /// Bulk parameter sweep for the baseline run.
    pub baseline_bulk: BaselineBulk,
    /// Bulk parameter sweep for the peaks run.
    pub detector_bulk: DetectorBulk,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: "IN.csv".to_string(),
            output: "OUT.csv".to_string(),
            events_output: None,
            chunk_size: 3000,
            baseline: BaselineSettings::default(),
            detector: DetectorSettings::default(),
            pollutants: HashMap::new(),
            baseline_bulk: BaselineBulk::default(),
            detector_bulk: DetectorBulk::default(),
        }
    }
}

/// Baseline run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineSettings {
    pub window_size: usize,
    pub smoothing_index: u32,
    pub interlace_chunks: bool,
    /// Encode the run parameters into the output filename.
    pub settings_in_name: bool,
}

impl Default for BaselineSettings {
    fn default() -> Self {
        Self {
            window_size: 3,
            smoothing_index: 5,
            interlace_chunks: true,
            settings_in_name: false,
        }
    }
}

/// Peak detector defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    pub coeff: f64,
    pub percentile: f64,
    pub thresh_bump_percentile: f64,
    pub startup_bypass: u32,
    pub trace_length: usize,
    /// Emit a `<pollutant> thresh` column next to each peak column.
    pub thresh_dump: bool,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            coeff: 15.0,
            percentile: 50.0,
            thresh_bump_percentile: 0.0,
            startup_bypass: 30,
            trace_length: 60,
            thresh_dump: false,
        }
    }
}

/// Optional per-pollutant overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollutantOverrides {
    pub coeff: Option<f64>,
    pub percentile: Option<f64>,
    pub thresh_bump_percentile: Option<f64>,
    pub thresh_dump: Option<bool>,
    /// Flat crossing threshold; enables the companion detector for this
    /// pollutant when the peaks run writes an event log.
    pub flat_thresh: Option<f64>,
}

/// Bulk sweep over baseline parameters: parallel lists, the shorter one
/// extended by repeating its last element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineBulk {
    pub enabled: bool,
    pub window_sizes: Vec<usize>,
    pub smoothing_indexes: Vec<u32>,
}

impl BaselineBulk {
    /// Expanded `(window_size, smoothing_index)` pairs.
    pub fn runs(&self) -> Vec<(usize, u32)> {
        let len = self.window_sizes.len().max(self.smoothing_indexes.len());
        let windows = fill_to(&self.window_sizes, len);
        let smoothings = fill_to(&self.smoothing_indexes, len);
        windows.into_iter().zip(smoothings).collect()
    }
}

/// Bulk sweep over detector parameters, applied to every pollutant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorBulk {
    pub enabled: bool,
    pub coeffs: Vec<f64>,
    pub percentiles: Vec<f64>,
    pub thresh_bump_percentiles: Vec<f64>,
}

/// One expanded detector bulk run.
#[derive(Debug, Clone, Copy)]
pub struct DetectorRun {
    pub coeff: f64,
    pub percentile: f64,
    pub thresh_bump_percentile: f64,
}

impl DetectorBulk {
    /// Expanded parameter combinations.
    pub fn runs(&self, defaults: &DetectorSettings) -> Vec<DetectorRun> {
        let len = self
            .coeffs
            .len()
            .max(self.percentiles.len())
            .max(self.thresh_bump_percentiles.len())
            .max(1);

        let coeffs = fill_or_default(&self.coeffs, len, defaults.coeff);
        let percentiles = fill_or_default(&self.percentiles, len, defaults.percentile);
        let bumps = fill_or_default(
            &self.thresh_bump_percentiles,
            len,
            defaults.thresh_bump_percentile,
        );

        (0..len)
            .map(|i| DetectorRun {
                coeff: coeffs[i],
                percentile: percentiles[i],
                thresh_bump_percentile: bumps[i],
            })
            .collect()
    }
}

/// Extend a list to `len` by repeating its last element.
fn fill_to<T: Clone>(list: &[T], len: usize) -> Vec<T> {
    let mut out = list.to_vec();
    while out.len() < len {
        match out.last() {
            Some(last) => out.push(last.clone()),
            None => break,
        }
    }
    out
}

fn fill_or_default(list: &[f64], len: usize, default: f64) -> Vec<f64> {
    if list.is_empty() {
        vec![default; len]
    } else {
        fill_to(list, len)
    }
}

impl Settings {
    /// Load and validate a settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            CliError::Settings(format!("cannot read '{}': {e}", path.display()))
        })?;
        let settings: Settings = serde_json::from_str(&text)
            .map_err(|e| CliError::Settings(format!("cannot parse '{}': {e}", path.display())))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate everything up front, before any processing.
    pub fn validate(&self) -> Result<()> {
        if self.input.is_empty() {
            return Err(CliError::Settings("input path must be set".to_string()));
        }
        if self.output.is_empty() {
            return Err(CliError::Settings("output path must be set".to_string()));
        }
        self.baseline_config().validate()?;
        self.detector_config_for("").validate()?;
        for (name, overrides) in &self.pollutants {
            self.detector_config_for(name).validate()?;
            if let Some(thresh) = overrides.flat_thresh {
                CrossingConfig::new(thresh).validate()?;
            }
        }
        if self.baseline_bulk.enabled && self.baseline_bulk.runs().is_empty() {
            return Err(CliError::Settings(
                "baseline_bulk is enabled but its lists are empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Baseline configuration from the settings.
    pub fn baseline_config(&self) -> BaselineConfig {
        self.baseline_config_with(self.baseline.window_size, self.baseline.smoothing_index)
    }

    /// Baseline configuration with a specific window/smoothing pair (bulk).
    pub fn baseline_config_with(&self, window_size: usize, smoothing_index: u32) -> BaselineConfig {
        BaselineConfig {
            window_size,
            smoothing_index,
            chunk_size: self.chunk_size,
            interlace_chunks: self.baseline.interlace_chunks,
        }
    }

    /// Detector configuration for one pollutant, applying overrides.
    pub fn detector_config_for(&self, pollutant: &str) -> DetectorConfig {
        let overrides = self.pollutants.get(pollutant);
        let pick = |f: fn(&PollutantOverrides) -> Option<f64>, default: f64| {
            overrides.and_then(f).unwrap_or(default)
        };
        DetectorConfig {
            coeff: pick(|o| o.coeff, self.detector.coeff),
            percentile: pick(|o| o.percentile, self.detector.percentile),
            thresh_bump_percentile: pick(
                |o| o.thresh_bump_percentile,
                self.detector.thresh_bump_percentile,
            ),
            startup_bypass: self.detector.startup_bypass,
            trace_length: self.detector.trace_length,
        }
    }

    /// Whether the thresh column is dumped for one pollutant.
    pub fn thresh_dump_for(&self, pollutant: &str) -> bool {
        self.pollutants
            .get(pollutant)
            .and_then(|o| o.thresh_dump)
            .unwrap_or(self.detector.thresh_dump)
    }

    /// Flat crossing threshold for one pollutant, if configured.
    pub fn flat_thresh_for(&self, pollutant: &str) -> Option<f64> {
        self.pollutants.get(pollutant).and_then(|o| o.flat_thresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.chunk_size, 3000);
        assert_eq!(settings.baseline.window_size, 3);
        assert_eq!(settings.detector.coeff, 15.0);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{ "input": "walk.csv", "baseline": { "window_size": 4 } }"#,
        )
        .unwrap();
        assert_eq!(settings.input, "walk.csv");
        assert_eq!(settings.baseline.window_size, 4);
        assert_eq!(settings.baseline.smoothing_index, 5);
        assert_eq!(settings.output, "OUT.csv");
    }

    #[test]
    fn test_pollutant_overrides() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "detector": { "coeff": 15.0 },
                "pollutants": {
                    "wcpc": { "coeff": 4.0, "thresh_dump": true, "flat_thresh": 5000.0 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.detector_config_for("wcpc").coeff, 4.0);
        assert_eq!(settings.detector_config_for("no2").coeff, 15.0);
        assert!(settings.thresh_dump_for("wcpc"));
        assert!(!settings.thresh_dump_for("no2"));
        assert_eq!(settings.flat_thresh_for("wcpc"), Some(5000.0));
        assert_eq!(settings.flat_thresh_for("no2"), None);
    }

    #[test]
    fn test_invalid_percentile_rejected() {
        let settings: Settings = serde_json::from_str(
            r#"{ "detector": { "percentile": 250.0 } }"#,
        )
        .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_baseline_bulk_fills_shorter_list() {
        let bulk = BaselineBulk {
            enabled: true,
            window_sizes: vec![3, 3, 4],
            smoothing_indexes: vec![7, 15, 25, 30],
        };
        assert_eq!(bulk.runs(), vec![(3, 7), (3, 15), (4, 25), (4, 30)]);
    }

    #[test]
    fn test_detector_bulk_fills_from_defaults() {
        let bulk = DetectorBulk {
            enabled: true,
            coeffs: vec![10.0, 20.0],
            percentiles: vec![50.0],
            thresh_bump_percentiles: vec![],
        };
        let runs = bulk.runs(&DetectorSettings::default());
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].coeff, 20.0);
        assert_eq!(runs[1].percentile, 50.0);
        assert_eq!(runs[1].thresh_bump_percentile, 0.0);
    }
}
