// Plume - Integration Tests
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Integration tests for the baseline extraction path.

use plume::baseline::{self, BaselineEngine};
use plume::config::BaselineConfig;
use plume::row::{Chunk, Row};

// ============================================================================
// Helper Functions
// ============================================================================

fn config(window_size: usize, smoothing_index: u32, chunk_size: usize) -> BaselineConfig {
    BaselineConfig {
        window_size,
        smoothing_index,
        chunk_size,
        interlace_chunks: true,
    }
}

/// Deterministic wavy test signal with occasional spikes.
fn signal(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let base = 10.0 + ((i * 7) % 13) as f64 * 0.5;
            let spike = if i % 11 == 0 { 25.0 } else { 0.0 };
            base + spike
        })
        .collect()
}

// ============================================================================
// Section 1: Alignment and Envelope Properties
// ============================================================================

#[test]
fn test_01_baseline_aligned_with_series() {
    for len in [1usize, 4, 30, 97] {
        let series = signal(len);
        for window in [1usize, 2, 3, 7] {
            let baseline = baseline::compute(&series, window, 3);
            assert_eq!(baseline.len(), series.len());
        }
    }
}

#[test]
fn test_02_baseline_stays_below_signal() {
    let series = signal(150);
    for smoothing in 1..=4 {
        let baseline = baseline::compute(&series, 3, smoothing);
        for (b, r) in baseline.iter().zip(&series) {
            assert!(b <= r, "baseline {b} above raw {r}");
        }
    }
}

#[test]
fn test_03_identical_inputs_identical_outputs() {
    let series = signal(120);
    assert_eq!(
        baseline::compute(&series, 4, 5),
        baseline::compute(&series, 4, 5)
    );
}

// ============================================================================
// Section 2: Known Scenarios
// ============================================================================

#[test]
fn test_04_reference_series() {
    // Window minima at positions 1 and 3 are 8 and 5; gaps interpolate
    // linearly between anchors and nothing needs clamping.
    let series = [10.0, 8.0, 9.0, 5.0, 7.0, 6.0];
    let baseline = baseline::compute(&series, 2, 1);
    assert_eq!(baseline, vec![10.0, 8.0, 6.5, 5.0, 5.5, 6.0]);
}

#[test]
fn test_05_small_window_collapses_offsets() {
    // With window_size < 3 all three pass offsets are 0, so the averaged
    // result equals any single pass.
    let series = signal(50);
    let averaged = baseline::averaged_pass(&series, 2);
    let again = baseline::averaged_pass(&series, 2);
    assert_eq!(averaged, again);

    // The degenerate case must still produce an envelope when combined
    // with clamping.
    let baseline = baseline::compute(&series, 2, 1);
    for (b, r) in baseline.iter().zip(&series) {
        assert!(b <= r);
    }
}

#[test]
fn test_06_flat_series_is_its_own_baseline() {
    let series = vec![3.5; 40];
    let baseline = baseline::compute(&series, 3, 2);
    assert_eq!(baseline, series);
}

// ============================================================================
// Section 3: Chunk Interlacing
// ============================================================================

#[test]
fn test_07_interlaced_halves_match_whole_series() {
    // Two full chunks: the combined lookahead computation covers the whole
    // series, so the corrected region (second half of chunk 1, first half
    // of chunk 2) must match the whole-series baseline exactly.
    let chunk_size = 12;
    let series = signal(2 * chunk_size);
    let whole = baseline::compute(&series, 3, 2);

    let mut engine = BaselineEngine::new(config(3, 2, chunk_size));
    let b1 = engine.process_chunk(&series[..chunk_size], Some(&series[chunk_size..]));
    let b2 = engine.process_chunk(&series[chunk_size..], None);

    assert_eq!(b1.len(), chunk_size);
    assert_eq!(b2.len(), chunk_size);

    let half = chunk_size / 2;
    assert_eq!(&b1[half..], &whole[half..chunk_size]);
    assert_eq!(&b2[..half], &whole[chunk_size..chunk_size + half]);
}

#[test]
fn test_08_partial_lookahead_corrects_right_edge_only() {
    // Three chunks, the last one short: chunk 2's right edge is corrected
    // from the partial combination, but the short final chunk keeps its
    // uncorrected left edge because the combination was not full.
    let chunk_size = 12;
    let series = signal(2 * chunk_size + 6);
    let (c1, rest) = series.split_at(chunk_size);
    let (c2, c3) = rest.split_at(chunk_size);

    let mut engine = BaselineEngine::new(config(3, 1, chunk_size));
    let _ = engine.process_chunk(c1, Some(c2));
    let b2 = engine.process_chunk(c2, Some(c3));
    let b3 = engine.process_chunk(c3, None);

    let mut combined = c2.to_vec();
    combined.extend_from_slice(c3);
    let combined_baseline = baseline::compute(&combined, 3, 1);
    let half = chunk_size / 2;
    assert_eq!(&b2[half..], &combined_baseline[half..chunk_size]);

    assert_eq!(b3, baseline::compute(c3, 3, 1));
}

#[test]
fn test_09_interlacing_disabled_leaves_chunks_independent() {
    let chunk_size = 10;
    let series = signal(2 * chunk_size);
    let mut cfg = config(3, 2, chunk_size);
    cfg.interlace_chunks = false;

    let mut engine = BaselineEngine::new(cfg);
    let b1 = engine.process_chunk(&series[..chunk_size], Some(&series[chunk_size..]));
    let b2 = engine.process_chunk(&series[chunk_size..], None);

    assert_eq!(b1, baseline::compute(&series[..chunk_size], 3, 2));
    assert_eq!(b2, baseline::compute(&series[chunk_size..], 3, 2));
}

// ============================================================================
// Section 4: Chunk Data Model
// ============================================================================

#[test]
fn test_10_per_pollutant_series_through_engine() {
    let chunk = Chunk::from_rows(
        (0..20)
            .map(|i| {
                Row::new(
                    i,
                    format!("10:00:{i:02}"),
                    vec![signal(20)[i as usize], 400.0 + i as f64],
                )
            })
            .collect(),
    );

    let mut engines: Vec<BaselineEngine> = (0..2)
        .map(|_| BaselineEngine::new(config(3, 2, 20)))
        .collect();

    for (column, engine) in engines.iter_mut().enumerate() {
        let series = chunk.series(column);
        let baseline = engine.process_chunk(&series, None);
        assert_eq!(baseline.len(), chunk.len());
        for (b, r) in baseline.iter().zip(&series) {
            assert!(b <= r);
        }
    }
}
