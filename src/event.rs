// Plume - Pollutant baseline and peak analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Detection event types.

use serde::{Deserialize, Serialize};

/// Kind of detection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Adaptive peak detection fired.
    Peak,
    /// Signal moved above the flat crossing threshold.
    Over,
    /// Signal moved back below the flat crossing threshold.
    Under,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Peak => "peak",
            EventKind::Over => "AQ over",
            EventKind::Under => "AQ under",
        }
    }
}

/// A discrete detection event for one pollutant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorEvent {
    /// Event kind.
    pub kind: EventKind,
    /// Pollutant the event belongs to.
    pub pollutant: String,
    /// Per-pollutant sequence number, starting at 1.
    pub sequence: u32,
    /// Sample value that triggered the event.
    pub value: f64,
    /// Event tag as written to the log, e.g. `A1-no2-3`.
    pub label: String,
}

impl MonitorEvent {
    /// Adaptive peak event, tagged `A1-<pollutant>-<seq>`.
    pub fn peak(pollutant: &str, sequence: u32, value: f64) -> Self {
        Self {
            kind: EventKind::Peak,
            pollutant: pollutant.to_string(),
            sequence,
            value,
            label: format!("A1-{pollutant}-{sequence}"),
        }
    }

    /// Upward crossing event, tagged `AQ-<POLLUTANT>-over-<seq>`.
    pub fn over(pollutant: &str, sequence: u32, value: f64) -> Self {
        Self {
            kind: EventKind::Over,
            pollutant: pollutant.to_string(),
            sequence,
            value,
            label: format!("AQ-{}-over-{sequence}", pollutant.to_uppercase()),
        }
    }

    /// Downward crossing event, tagged `AQ-<POLLUTANT>-under-<seq>`.
    pub fn under(pollutant: &str, sequence: u32, value: f64) -> Self {
        Self {
            kind: EventKind::Under,
            pollutant: pollutant.to_string(),
            sequence,
            value,
            label: format!("AQ-{}-under-{sequence}", pollutant.to_uppercase()),
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
