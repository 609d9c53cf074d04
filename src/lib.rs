// Plume - Pollutant baseline and peak analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Plume
//!
//! Baseline extraction and adaptive peak detection for mobile air quality
//! sensor streams.
//!
//! Plume provides the two analytic halves of a pollutant monitoring rig:
//! - **Baseline extraction**: a slowly-varying lower envelope separating
//!   ambient drift from transient pollution events, computed per chunk with
//!   windowed-minimum passes, gap interpolation, multi-scale smoothing and
//!   chunk-boundary correction.
//! - **Peak detection**: statistically significant upward excursions above
//!   an adaptively computed threshold, with hysteresis that demands a
//!   progressively harder-to-sustain run, plus a flat-threshold crossing
//!   companion.
//!
//! Acquisition hardware, tick scheduling, rendering and storage are
//! external collaborators; the crate consumes plain numeric series and row
//! records and produces aligned baselines, evaluations and events.
//!
//! ## Batch baseline
//!
//! ```rust
//! use plume::baseline::BaselineEngine;
//! use plume::config::BaselineConfig;
//!
//! let config = BaselineConfig {
//!     window_size: 2,
//!     smoothing_index: 1,
//!     ..Default::default()
//! };
//! let mut engine = BaselineEngine::new(config);
//!
//! let series = [10.0, 8.0, 9.0, 5.0, 7.0, 6.0];
//! let baseline = engine.process_chunk(&series, None);
//!
//! assert_eq!(baseline.len(), series.len());
//! assert_eq!(baseline, vec![10.0, 8.0, 6.5, 5.0, 5.5, 6.0]);
//! ```
//!
//! ## Live detection
//!
//! ```rust
//! use plume::config::{CrossingConfig, DetectorConfig};
//! use plume::monitor::Monitor;
//! use plume::row::Row;
//!
//! let detector = DetectorConfig {
//!     coeff: 5.0,
//!     startup_bypass: 9,
//!     ..Default::default()
//! };
//!
//! let mut monitor = Monitor::new();
//! monitor
//!     .add_pollutant("no2", detector, Some(CrossingConfig::new(25.0)))
//!     .unwrap();
//!
//! for (i, value) in [1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0].iter().enumerate() {
//!     let events = monitor
//!         .process(&Row::new(i as u64, "12:00:00", vec![*value]))
//!         .unwrap();
//!     assert!(events.is_empty());
//! }
//!
//! let events = monitor
//!     .process(&Row::new(8, "12:00:08", vec![30.0]))
//!     .unwrap();
//! assert_eq!(events.len(), 2); // adaptive peak + flat crossing
//! assert_eq!(events[0].label, "A1-no2-1");
//! assert_eq!(events[1].label, "AQ-NO2-over-1");
//! ```

// Core modules
pub mod baseline;
pub mod config;
pub mod crossing;
pub mod detector;
pub mod error;
pub mod event;
pub mod monitor;
pub mod row;
pub mod stats;
pub mod trace;

// Re-exports for convenience
pub use baseline::BaselineEngine;
pub use config::{BaselineConfig, CrossingConfig, DetectorConfig};
pub use crossing::{CrossingState, ThresholdCrossing};
pub use detector::{Evaluation, PeakDetector, ThresholdState};
pub use error::{PlumeError, Result};
pub use event::{EventKind, MonitorEvent};
pub use monitor::Monitor;
pub use row::{Chunk, PollutantId, Row};
pub use trace::Trace;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
