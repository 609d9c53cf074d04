// Plume - Pollutant baseline and peak analytics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Baseline extraction: multi-pass windowed-minimum tracking with gap
//! interpolation, multi-scale smoothing, and chunk-boundary correction.
//!
//! The baseline is a smoothed lower envelope of a pollutant signal,
//! separating ambient drift from transient pollution events. A single pass
//! samples the minimum of each non-overlapping window and linearly
//! interpolates between those anchors; three passes at staggered window
//! phases are averaged so the window grid cannot alias against periodic
//! noise. Larger scales are folded in as a cascaded pairwise average, and
//! the result is clamped so it never exceeds the observed signal.
//!
//! # Example
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
//! assert_eq!(baseline, vec![10.0, 8.0, 6.5, 5.0, 5.5, 6.0]);
//! ```

use crate::config::BaselineConfig;
use crate::stats::round_to;

/// A pass slot: either a directly computed anchor or a gap awaiting
/// interpolation.
type Slot = Option<f64>;

/// Minimum of a window and the first position holding it.
fn window_minimum(window: &[f64]) -> (f64, usize) {
    let mut min = window[0];
    let mut at = 0;
    for (i, &v) in window.iter().enumerate().skip(1) {
        if v < min {
            min = v;
            at = i;
        }
    }
    (min, at)
}

/// Build one windowed-minimum pass over the series.
///
/// The output anchors position 0 to the first raw value, pads `offset` gaps
/// to stagger the window grid, then walks non-overlapping windows of
/// `window_size` writing each window's minimum at its original position and
/// gaps everywhere else. The tail is padded with gaps and the final
/// position anchored to the last raw value, so every gap is bounded by
/// anchors on both sides.
fn raw_pass(series: &[f64], window_size: usize, offset: usize) -> Vec<Slot> {
    let n = series.len();
    let mut pass: Vec<Slot> = Vec::with_capacity(n + offset);

    pass.push(Some(series[0]));
    pass.extend(std::iter::repeat(None).take(offset));

    let mut i = window_size + offset;
    while i < n {
        let window = &series[i + 1 - window_size..=i];
        let (min, at) = window_minimum(window);
        for w in 0..window_size {
            pass.push(if w == at { Some(min) } else { None });
        }
        i += window_size;
    }

    while pass.len() < n - 1 {
        pass.push(None);
    }
    if pass.len() == n - 1 {
        pass.push(Some(series[n - 1]));
    } else {
        let last = pass.len() - 1;
        pass[last] = Some(series[n - 1]);
    }

    pass
}

/// Replace every run of gaps with values linearly interpolated between the
/// bounding anchors, rounded to 2 decimals.
fn interpolate(pass: &[Slot]) -> Vec<f64> {
    let mut out = Vec::with_capacity(pass.len());
    let mut prev = match pass.first() {
        Some(Some(v)) => *v,
        _ => return Vec::new(),
    };
    out.push(prev);

    let mut gap = 0usize;
    for slot in &pass[1..] {
        match slot {
            Some(v) => {
                let slope = (v - prev) / (gap + 1) as f64;
                for inc in 1..=gap {
                    out.push(round_to(prev + inc as f64 * slope, 2));
                }
                out.push(*v);
                prev = *v;
                gap = 0;
            }
            None => gap += 1,
        }
    }

    // The final position is always an anchor, so no trailing gap survives.
    debug_assert_eq!(out.len(), pass.len());
    out
}

/// One single-scale baseline: three offset passes averaged element-wise.
///
/// The offsets `0`, `⌊w/3⌋` and `2·⌊w/3⌋` sample window minima at three
/// phases of the window grid; averaging them cancels most phase-dependent
/// bias. With `window_size < 3` all offsets collapse to 0 and the passes
/// coincide, which is an accepted degenerate case.
pub fn averaged_pass(series: &[f64], window_size: usize) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return Vec::new();
    }

    let offset = window_size / 3;
    let p1 = interpolate(&raw_pass(series, window_size, 0));
    let p2 = interpolate(&raw_pass(series, window_size, offset));
    let p3 = interpolate(&raw_pass(series, window_size, 2 * offset));

    (0..n)
        .map(|i| round_to((p1[i] + p2[i] + p3[i]) / 3.0, 3))
        .collect()
}

/// Full baseline for one series: multi-scale cascade, clamp, round.
///
/// Scales `2..=smoothing` are folded in sequentially as
/// `result = (result + scale_k) / 2`, a cascaded pairwise average that
/// weights later scales geometrically heavier than earlier ones. The
/// ordering is observable behavior and must not be replaced by an
/// equal-weighted mean.
pub fn compute(series: &[f64], window_size: usize, smoothing: u32) -> Vec<f64> {
    let mut out = averaged_pass(series, window_size);

    for scale in 2..=smoothing {
        let other = averaged_pass(series, window_size * scale as usize);
        for (o, v) in out.iter_mut().zip(other) {
            *o = (*o + v) / 2.0;
        }
    }

    for (o, raw) in out.iter_mut().zip(series) {
        if *o > *raw {
            *o = *raw;
        }
        *o = round_to(*o, 6);
    }

    out
}

/// Combined baseline retained from the previous chunk's lookahead
/// computation, used to correct the left edge of the following chunk.
#[derive(Debug, Clone)]
struct Carry {
    values: Vec<f64>,
    /// Whether the combined computation covered two full chunks.
    full: bool,
}

/// Stateful per-pollutant baseline engine over a chunked stream.
///
/// Stateless apart from the one-chunk lookahead carry used for boundary
/// correction. Chunks must be fed strictly in stream order.
#[derive(Debug)]
pub struct BaselineEngine {
    config: BaselineConfig,
    carry: Option<Carry>,
}

impl BaselineEngine {
    pub fn new(config: BaselineConfig) -> Self {
        Self {
            config,
            carry: None,
        }
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }

    /// Compute the baseline for one chunk of the stream.
    ///
    /// `lookahead` is the entire next chunk's series when one exists. With
    /// `interlace_chunks` enabled and a full current chunk, the engine
    /// recomputes over the concatenation and overwrites the second half of
    /// the current chunk from it; the combined result is carried so the
    /// first half of the *next* chunk can be overwritten in turn, provided
    /// the combined computation covered two full chunks. A final short
    /// chunk has no lookahead and is returned uncorrected.
    pub fn process_chunk(&mut self, series: &[f64], lookahead: Option<&[f64]>) -> Vec<f64> {
        let mut baseline = compute(series, self.config.window_size, self.config.smoothing_index);

        if !self.config.interlace_chunks {
            return baseline;
        }

        let chunk = self.config.chunk_size;

        if let Some(carry) = self.carry.take() {
            if carry.full {
                let take = (chunk / 2).min(baseline.len());
                baseline[..take].copy_from_slice(&carry.values[chunk..chunk + take]);
            }
        }

        let next = lookahead.filter(|next| !next.is_empty());
        if series.len() == chunk {
            if let Some(next) = next {
                let mut combined = Vec::with_capacity(series.len() + next.len());
                combined.extend_from_slice(series);
                combined.extend_from_slice(next);

                let combined_baseline = compute(
                    &combined,
                    self.config.window_size,
                    self.config.smoothing_index,
                );

                let half = baseline.len() / 2;
                baseline[half..].copy_from_slice(&combined_baseline[half..baseline.len()]);

                self.carry = Some(Carry {
                    full: combined.len() == 2 * chunk,
                    values: combined_baseline,
                });
            }
        }

        baseline
    }

    /// Drop the lookahead carry, e.g. between independent runs.
    pub fn reset(&mut self) {
        self.carry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_minimum_first_occurrence() {
        assert_eq!(window_minimum(&[3.0, 1.0, 1.0, 2.0]), (1.0, 1));
    }

    #[test]
    fn test_raw_pass_shape() {
        let series = [10.0, 8.0, 9.0, 5.0, 7.0, 6.0];
        let pass = raw_pass(&series, 2, 0);
        assert_eq!(
            pass,
            vec![Some(10.0), Some(8.0), None, Some(5.0), None, Some(6.0)]
        );
    }

    #[test]
    fn test_interpolate_fills_gaps() {
        let pass = vec![Some(10.0), Some(8.0), None, Some(5.0), None, Some(6.0)];
        assert_eq!(interpolate(&pass), vec![10.0, 8.0, 6.5, 5.0, 5.5, 6.0]);
    }

    #[test]
    fn test_interpolate_rounds_to_two_decimals() {
        // Slope 1/3 between the anchors.
        let pass = vec![Some(0.0), None, None, Some(1.0)];
        assert_eq!(interpolate(&pass), vec![0.0, 0.33, 0.67, 1.0]);
    }

    #[test]
    fn test_known_series_baseline() {
        let series = [10.0, 8.0, 9.0, 5.0, 7.0, 6.0];
        let baseline = compute(&series, 2, 1);
        assert_eq!(baseline, vec![10.0, 8.0, 6.5, 5.0, 5.5, 6.0]);
    }

    #[test]
    fn test_baseline_length_matches_series() {
        for len in [1usize, 2, 5, 17, 100] {
            let series: Vec<f64> = (0..len).map(|i| ((i * 7) % 13) as f64).collect();
            for window in [1usize, 2, 3, 5, 8] {
                assert_eq!(compute(&series, window, 2).len(), len);
            }
        }
    }

    #[test]
    fn test_baseline_never_exceeds_raw() {
        let series: Vec<f64> = (0..200)
            .map(|i| {
                let i = i as f64;
                5.0 + (i * 0.37).sin() * 2.0 + if i as usize % 17 == 0 { 30.0 } else { 0.0 }
            })
            .collect();
        let baseline = compute(&series, 4, 3);
        for (b, r) in baseline.iter().zip(&series) {
            assert!(b <= r, "baseline {b} exceeds raw {r}");
        }
    }

    #[test]
    fn test_deterministic() {
        let series: Vec<f64> = (0..80).map(|i| ((i * 31) % 23) as f64 * 0.5).collect();
        assert_eq!(compute(&series, 3, 4), compute(&series, 3, 4));
    }

    #[test]
    fn test_small_window_passes_coincide() {
        // window_size < 3 forces every offset to 0, so the 3-pass average
        // equals a single interpolated pass exactly.
        let series: Vec<f64> = (0..40).map(|i| ((i * 11) % 7) as f64 + 1.0).collect();
        for window in [1usize, 2] {
            let single = interpolate(&raw_pass(&series, window, 0));
            let averaged = averaged_pass(&series, window);
            for (a, s) in averaged.iter().zip(&single) {
                assert_relative_eq!(*a, round_to(*s, 3));
            }
        }
    }

    #[test]
    fn test_single_element_series() {
        assert_eq!(compute(&[4.2], 3, 2), vec![4.2]);
    }

    #[test]
    fn test_empty_series() {
        assert!(compute(&[], 3, 2).is_empty());
    }

    #[test]
    fn test_series_shorter_than_window() {
        // No full window fits; the baseline is the interpolation between
        // the two end anchors, clamped to the raw signal.
        let series = [9.0, 2.0, 3.0];
        let baseline = compute(&series, 10, 1);
        assert_eq!(baseline.len(), 3);
        assert!(baseline[1] <= 2.0);
    }

    #[test]
    fn test_cascade_is_pairwise_not_mean() {
        let series: Vec<f64> = (0..60)
            .map(|i| ((i * 13) % 11) as f64 + ((i % 4) as f64) * 0.25)
            .collect();

        let s1 = averaged_pass(&series, 3);
        let s2 = averaged_pass(&series, 6);
        let s3 = averaged_pass(&series, 9);

        let expected: Vec<f64> = (0..series.len())
            .map(|i| {
                let cascaded = ((s1[i] + s2[i]) / 2.0 + s3[i]) / 2.0;
                round_to(cascaded.min(series[i]), 6)
            })
            .collect();

        assert_eq!(compute(&series, 3, 3), expected);
    }

    #[test]
    fn test_engine_without_interlacing_is_plain_compute() {
        let config = BaselineConfig {
            window_size: 3,
            smoothing_index: 2,
            chunk_size: 10,
            interlace_chunks: false,
        };
        let series: Vec<f64> = (0..10).map(|i| (i % 5) as f64 + 1.0).collect();
        let mut engine = BaselineEngine::new(config);
        let lookahead: Vec<f64> = (0..10).map(|i| (i % 3) as f64 + 2.0).collect();
        assert_eq!(
            engine.process_chunk(&series, Some(&lookahead)),
            compute(&series, 3, 2)
        );
    }

    #[test]
    fn test_engine_final_short_chunk_skips_correction() {
        let config = BaselineConfig {
            window_size: 2,
            smoothing_index: 1,
            chunk_size: 10,
            interlace_chunks: true,
        };
        let mut engine = BaselineEngine::new(config);
        let series = [10.0, 8.0, 9.0, 5.0, 7.0, 6.0];
        assert_eq!(
            engine.process_chunk(&series, None),
            compute(&series, 2, 1)
        );
    }
}
