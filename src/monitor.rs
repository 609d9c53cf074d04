// Plume - Pollutant baseline and peak analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Live-path orchestration: one trace and detector set per pollutant,
//! driven one sample per scheduler tick.
//!
//! The monitor owns all per-pollutant state. One logical thread of control
//! calls [`Monitor::process`] per tick, so no locking is needed; the tick
//! scheduler and the acquisition transport are external collaborators.

use crate::config::{CrossingConfig, DetectorConfig};
use crate::crossing::{CrossingState, ThresholdCrossing};
use crate::detector::{PeakDetector, ThresholdState};
use crate::error::{PlumeError, Result};
use crate::event::MonitorEvent;
use crate::row::Row;
use crate::trace::Trace;
use std::collections::HashMap;

/// All detection state for one pollutant.
struct PollutantChannel {
    id: String,
    trace: Trace,
    detector: PeakDetector,
    threshold_state: ThresholdState,
    crossing: Option<ThresholdCrossing>,
    crossing_state: CrossingState,
}

/// Live per-sample detection over a set of registered pollutants.
#[derive(Default)]
pub struct Monitor {
    channels: Vec<PollutantChannel>,
    index: HashMap<String, usize>,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pollutant with its detector configuration and an optional
    /// flat crossing threshold. Registration order fixes the reading order
    /// expected by [`Monitor::process`].
    pub fn add_pollutant(
        &mut self,
        id: impl Into<String>,
        detector: DetectorConfig,
        crossing: Option<CrossingConfig>,
    ) -> Result<()> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(PlumeError::PollutantAlreadyRegistered(id));
        }
        detector.validate()?;
        if let Some(ref crossing) = crossing {
            crossing.validate()?;
        }

        let channel = PollutantChannel {
            trace: Trace::new(detector.trace_length),
            detector: PeakDetector::new(detector),
            threshold_state: ThresholdState::new(),
            crossing: crossing.map(ThresholdCrossing::new),
            crossing_state: CrossingState::new(),
            id: id.clone(),
        };
        self.index.insert(id, self.channels.len());
        self.channels.push(channel);
        Ok(())
    }

    /// Registered pollutant ids in registration order.
    pub fn pollutants(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.id.as_str())
    }

    /// Feed one sample for a single pollutant and collect any events.
    pub fn ingest(&mut self, pollutant: &str, value: f64) -> Result<Vec<MonitorEvent>> {
        let &at = self
            .index
            .get(pollutant)
            .ok_or_else(|| PlumeError::UnknownPollutant(pollutant.to_string()))?;
        Ok(Self::evaluate_channel(&mut self.channels[at], value))
    }

    /// Feed one full row, readings aligned with registration order.
    /// Returns emitted events in that order.
    pub fn process(&mut self, row: &Row) -> Result<Vec<MonitorEvent>> {
        if row.readings.len() != self.channels.len() {
            return Err(PlumeError::ReadingCountMismatch {
                row: row.index,
                got: row.readings.len(),
                expected: self.channels.len(),
            });
        }

        let mut events = Vec::new();
        for (channel, &value) in self.channels.iter_mut().zip(&row.readings) {
            events.extend(Self::evaluate_channel(channel, value));
        }
        Ok(events)
    }

    /// Current trace for a pollutant, if registered.
    pub fn trace(&self, pollutant: &str) -> Option<&Trace> {
        self.index
            .get(pollutant)
            .map(|&at| &self.channels[at].trace)
    }

    fn evaluate_channel(channel: &mut PollutantChannel, value: f64) -> Vec<MonitorEvent> {
        let mut events = Vec::new();

        channel.trace.push(value);
        let eval = channel.detector.evaluate(
            &channel.id,
            &channel.trace,
            &mut channel.threshold_state,
        );
        events.extend(eval.event);

        if let Some(ref crossing) = channel.crossing {
            events.extend(crossing.evaluate(&channel.id, value, &mut channel.crossing_state));
        }

        events
    }
}
