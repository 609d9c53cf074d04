// Plume - Pollutant baseline and peak analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Flat-threshold crossing detector ("AQ").
//!
//! Level-triggered companion to the adaptive detector: fires once when the
//! signal moves above a fixed threshold and once when it moves back below,
//! debounced by a single boolean. Its state is independent from the
//! adaptive detector's hysteresis.

use crate::config::CrossingConfig;
use crate::event::MonitorEvent;
use serde::{Deserialize, Serialize};

/// Per-pollutant crossing state, mutated only by
/// [`ThresholdCrossing::evaluate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossingState {
    over: bool,
    event_sequence: u32,
}

impl CrossingState {
    pub fn new() -> Self {
        Self {
            over: false,
            event_sequence: 1,
        }
    }

    /// Whether the signal is currently above the threshold.
    pub fn is_over(&self) -> bool {
        self.over
    }
}

impl Default for CrossingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat-threshold crossing detector, one instance per pollutant.
#[derive(Debug, Clone)]
pub struct ThresholdCrossing {
    config: CrossingConfig,
}

impl ThresholdCrossing {
    pub fn new(config: CrossingConfig) -> Self {
        Self { config }
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Evaluate one sample; returns the crossing event if one fired.
    pub fn evaluate(
        &self,
        pollutant: &str,
        value: f64,
        state: &mut CrossingState,
    ) -> Option<MonitorEvent> {
        if value > self.config.threshold && !state.over {
            state.over = true;
            let event = MonitorEvent::over(pollutant, state.event_sequence, value);
            state.event_sequence += 1;
            return Some(event);
        }

        if value < self.config.threshold && state.over {
            state.over = false;
            let event = MonitorEvent::under(pollutant, state.event_sequence, value);
            state.event_sequence += 1;
            return Some(event);
        }

        None
    }
}
