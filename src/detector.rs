// Plume - Pollutant baseline and peak analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Adaptive peak detector ("A1").
//!
//! The detector splits the trace at a configured percentile, takes the
//! sample standard deviation of the values strictly below that split, and
//! scales it into a firing threshold. Repeated detections must clear a bar
//! that rises with the square root of the streak length; a single
//! sub-threshold sample ends the streak immediately.

use crate::config::DetectorConfig;
use crate::event::MonitorEvent;
use crate::stats;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};

/// Per-pollutant hysteresis state, mutated only by
/// [`PeakDetector::evaluate`]. Lives for the duration of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdState {
    consecutive_hits: u32,
    event_sequence: u32,
}

impl ThresholdState {
    pub fn new() -> Self {
        Self {
            consecutive_hits: 0,
            event_sequence: 1,
        }
    }

    /// Length of the current detection streak.
    pub fn consecutive_hits(&self) -> u32 {
        self.consecutive_hits
    }

    /// Sequence number the next emitted event will carry.
    pub fn next_sequence(&self) -> u32 {
        self.event_sequence
    }
}

impl Default for ThresholdState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one detector evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The triggering sample value when fired, `0.0` otherwise.
    pub peak: f64,
    /// Threshold in effect for this sample; `0.0` while gated or without
    /// statistical support.
    pub threshold: f64,
    /// Emitted event when the detector fired.
    pub event: Option<MonitorEvent>,
}

impl Evaluation {
    /// A "no detection" outcome with nothing to report.
    fn quiet() -> Self {
        Self {
            peak: 0.0,
            threshold: 0.0,
            event: None,
        }
    }

    pub fn fired(&self) -> bool {
        self.event.is_some()
    }
}

/// Adaptive peak detector, one instance per pollutant.
#[derive(Debug, Clone)]
pub struct PeakDetector {
    config: DetectorConfig,
}

impl PeakDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Evaluate the newest sample in the trace.
    ///
    /// While fewer than `startup_bypass` samples have ever been seen, the
    /// detector reports no event and leaves the state untouched. Fewer
    /// than two values below the split percentile is a defined "no
    /// detection" outcome that resets the streak, not an error.
    pub fn evaluate(
        &self,
        pollutant: &str,
        trace: &Trace,
        state: &mut ThresholdState,
    ) -> Evaluation {
        if trace.seen() < u64::from(self.config.startup_bypass) {
            return Evaluation::quiet();
        }

        let values: Vec<f64> = trace.iter().copied().collect();
        let Some(&latest) = values.last() else {
            return Evaluation::quiet();
        };

        let m = stats::percentile(&values, self.config.percentile);
        let below: Vec<f64> = values.iter().copied().filter(|v| *v < m).collect();
        if below.len() < 2 {
            state.consecutive_hits = 0;
            return Evaluation::quiet();
        }

        let sd = stats::sample_stdev(&below);
        let mut thresh = self.config.coeff * sd;
        if self.config.thresh_bump_percentile != 0.0 {
            thresh += stats::percentile(&values, self.config.thresh_bump_percentile);
        }

        // The bar rises with the streak: a run must keep clearing
        // thresh + sd * sqrt(n) to stay alive.
        let bar = if state.consecutive_hits == 0 {
            thresh
        } else {
            thresh + sd * f64::from(state.consecutive_hits).sqrt()
        };

        if latest >= bar {
            state.consecutive_hits += 1;
            let event = MonitorEvent::peak(pollutant, state.event_sequence, latest);
            state.event_sequence += 1;

            let dumped = if state.consecutive_hits > 1 {
                thresh + sd * f64::from(state.consecutive_hits).sqrt()
            } else {
                thresh
            };

            Evaluation {
                peak: latest,
                threshold: dumped,
                event: Some(event),
            }
        } else {
            state.consecutive_hits = 0;
            Evaluation {
                peak: 0.0,
                threshold: thresh,
                event: None,
            }
        }
    }
}
