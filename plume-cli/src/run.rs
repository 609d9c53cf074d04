// Plume CLI - Batch post-processing for pollutant transcripts
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Batch drivers for the baseline and peaks post-processors.
//!
//! Chunks are processed strictly in order: a chunk's rows are written
//! before the next chunk is read, so row order in the output always
//! matches the transcript. Bulk mode sweeps parameter lists and writes one
//! output file per combination, encoding the parameters in the filename.

use crate::error::Result;
use crate::settings::{DetectorRun, Settings};
use crate::sink::{annotated_column, pollutant_key, thresh_column, CsvSink};
use crate::source::CsvSource;
use plume::baseline::BaselineEngine;
use plume::config::CrossingConfig;
use plume::crossing::{CrossingState, ThresholdCrossing};
use plume::detector::{PeakDetector, ThresholdState};
use plume::event::MonitorEvent;
use plume::trace::Trace;
use std::path::Path;
use tracing::{debug, info};

/// Run the baseline post-processor, bulk or single.
pub fn run_baseline(settings: &Settings) -> Result<()> {
    if settings.baseline_bulk.enabled {
        let runs = settings.baseline_bulk.runs();
        info!("bulk processing enabled: {} baseline runs", runs.len());
        for (i, (window_size, smoothing_index)) in runs.iter().enumerate() {
            info!(
                "computing baseline {} of {}, window_size = {}, smoothing_index = {}",
                i + 1,
                runs.len(),
                window_size,
                smoothing_index
            );
            let output = baseline_run_name(
                &settings.output,
                *window_size,
                *smoothing_index,
                settings.chunk_size,
                settings.baseline.interlace_chunks,
            );
            run_baseline_once(settings, *window_size, *smoothing_index, Path::new(&output))?;
        }
        return Ok(());
    }

    let output = if settings.baseline.settings_in_name {
        baseline_run_name(
            &settings.output,
            settings.baseline.window_size,
            settings.baseline.smoothing_index,
            settings.chunk_size,
            settings.baseline.interlace_chunks,
        )
    } else {
        settings.output.clone()
    };
    run_baseline_once(
        settings,
        settings.baseline.window_size,
        settings.baseline.smoothing_index,
        Path::new(&output),
    )
}

fn run_baseline_once(
    settings: &Settings,
    window_size: usize,
    smoothing_index: u32,
    output: &Path,
) -> Result<()> {
    let mut source = CsvSource::open(Path::new(&settings.input), settings.chunk_size)?;

    let mut header: Vec<String> = source.header().to_vec();
    header.push(String::new());
    header.extend(
        source
            .pollutants()
            .iter()
            .map(|name| annotated_column(name, "baseline")),
    );
    let mut sink = CsvSink::create(output, header)?;

    let config = settings.baseline_config_with(window_size, smoothing_index);
    config.validate()?;
    let mut engines: Vec<BaselineEngine> = source
        .pollutants()
        .iter()
        .map(|_| BaselineEngine::new(config.clone()))
        .collect();

    let mut chunk_count = 0usize;
    let mut current = source.read_chunk()?;
    while let Some(chunk) = current {
        let next = source.read_chunk()?;

        let baselines: Vec<Vec<f64>> = engines
            .iter_mut()
            .enumerate()
            .map(|(column, engine)| {
                let series = chunk.series(column);
                let lookahead = next.as_ref().map(|n| n.series(column));
                engine.process_chunk(&series, lookahead.as_deref())
            })
            .collect();

        for (at, row) in chunk.rows().iter().enumerate() {
            let mut fields = vec![row.index.to_string(), row.time.clone()];
            fields.extend(row.readings.iter().map(|v| v.to_string()));
            fields.push(String::new());
            fields.extend(baselines.iter().map(|b| b[at].to_string()));
            sink.write_row(&fields)?;
        }
        sink.flush()?;

        chunk_count += 1;
        info!("chunk {} written", chunk_count);
        current = next;
    }

    Ok(())
}

/// All detection state for one pollutant column during a peaks run.
struct PeakChannel {
    key: String,
    detector: PeakDetector,
    trace: Trace,
    state: ThresholdState,
    dump: bool,
    crossing: Option<ThresholdCrossing>,
    crossing_state: CrossingState,
}

/// Run the peaks post-processor, bulk or single.
pub fn run_peaks(settings: &Settings) -> Result<()> {
    if settings.detector_bulk.enabled {
        let runs = settings.detector_bulk.runs(&settings.detector);
        info!("bulk processing enabled: {} detector runs", runs.len());
        for (i, run) in runs.iter().enumerate() {
            info!("computing peaks {} of {}", i + 1, runs.len());
            debug!(
                "coeff = {}, percentile = {}, thresh_bump_percentile = {}",
                run.coeff, run.percentile, run.thresh_bump_percentile
            );
            let output = peaks_run_name(&settings.output, i, settings, run);
            run_peaks_once(settings, Some(*run), Path::new(&output))?;
        }
        return Ok(());
    }

    run_peaks_once(settings, None, Path::new(&settings.output))
}

fn run_peaks_once(
    settings: &Settings,
    bulk: Option<DetectorRun>,
    output: &Path,
) -> Result<()> {
    let mut source = CsvSource::open(Path::new(&settings.input), settings.chunk_size)?;

    let mut channels = Vec::with_capacity(source.pollutants().len());
    for name in source.pollutants() {
        let key = pollutant_key(name);
        let mut config = settings.detector_config_for(&key);
        if let Some(run) = bulk {
            config.coeff = run.coeff;
            config.percentile = run.percentile;
            config.thresh_bump_percentile = run.thresh_bump_percentile;
        }
        config.validate()?;

        let crossing = settings
            .events_output
            .as_ref()
            .and_then(|_| settings.flat_thresh_for(&key))
            .map(|thresh| ThresholdCrossing::new(CrossingConfig::new(thresh)));

        channels.push(PeakChannel {
            trace: Trace::new(config.trace_length),
            detector: PeakDetector::new(config),
            state: ThresholdState::new(),
            dump: settings.thresh_dump_for(&key),
            crossing,
            crossing_state: CrossingState::new(),
            key,
        });
    }

    let mut header: Vec<String> = source.header().to_vec();
    header.push(String::new());
    for (name, channel) in source.pollutants().iter().zip(&channels) {
        header.push(annotated_column(name, "peak"));
        if channel.dump {
            header.push(thresh_column(name));
        }
    }
    let mut sink = CsvSink::create(output, header)?;

    let mut event_sink = match settings.events_output.as_ref() {
        Some(path) => Some(CsvSink::create(
            Path::new(path),
            ["Row", "Time", "Event Tag", "Algorithm", "Pollutant", "Value"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )?),
        None => None,
    };

    let mut chunk_count = 0usize;
    while let Some(chunk) = source.read_chunk()? {
        for row in chunk.rows() {
            let mut fields = vec![row.index.to_string(), row.time.clone()];
            fields.extend(row.readings.iter().map(|v| v.to_string()));
            fields.push(String::new());

            for (column, channel) in channels.iter_mut().enumerate() {
                let value = row.readings.get(column).copied().unwrap_or(f64::NAN);
                channel.trace.push(value);

                let eval =
                    channel
                        .detector
                        .evaluate(&channel.key, &channel.trace, &mut channel.state);
                fields.push(eval.peak.to_string());
                if channel.dump {
                    fields.push(eval.threshold.to_string());
                }

                if let Some(sink) = event_sink.as_mut() {
                    if let Some(event) = eval.event {
                        write_event(sink, row.index, &row.time, &event)?;
                    }
                    if let Some(crossing) = channel.crossing.as_ref() {
                        if let Some(event) =
                            crossing.evaluate(&channel.key, value, &mut channel.crossing_state)
                        {
                            write_event(sink, row.index, &row.time, &event)?;
                        }
                    }
                }
            }

            sink.write_row(&fields)?;
        }
        sink.flush()?;
        if let Some(sink) = event_sink.as_mut() {
            sink.flush()?;
        }

        chunk_count += 1;
        info!("chunk {} written", chunk_count);
    }

    Ok(())
}

fn write_event(sink: &mut CsvSink, row: u64, time: &str, event: &MonitorEvent) -> Result<()> {
    sink.write_row(&[
        row.to_string(),
        time.to_string(),
        event.label.clone(),
        event.kind.as_str().to_string(),
        event.pollutant.clone(),
        event.value.to_string(),
    ])
}

/// Output path stem with a trailing `.csv` stripped.
fn stem(path: &str) -> &str {
    if path.len() >= 4 && path[path.len() - 4..].eq_ignore_ascii_case(".csv") {
        &path[..path.len() - 4]
    } else {
        path
    }
}

/// Baseline bulk filename, parameters encoded the way the run was set up.
fn baseline_run_name(
    output: &str,
    window_size: usize,
    smoothing_index: u32,
    chunk_size: usize,
    interlaced: bool,
) -> String {
    let suffix = if interlaced {
        ", interlaced chunks.csv"
    } else {
        ", not interlaced.csv"
    };
    format!(
        "{}, window_size = {}, smoothing_index = {}, chunk_size={}{}",
        stem(output),
        window_size,
        smoothing_index,
        chunk_size,
        suffix
    )
}

/// Peaks bulk filename: every parameter swept over more than one value is
/// encoded; with nothing to encode the files are numbered instead.
fn peaks_run_name(output: &str, index: usize, settings: &Settings, run: &DetectorRun) -> String {
    let bulk = &settings.detector_bulk;
    let mut name = stem(output).to_string();
    let mut encoded = false;

    if bulk.coeffs.len() > 1 {
        name.push_str(&format!(", coeff={}", run.coeff));
        encoded = true;
    }
    if bulk.percentiles.len() > 1 {
        name.push_str(&format!(", percentile={}", run.percentile));
        encoded = true;
    }
    if bulk.thresh_bump_percentiles.len() > 1 {
        name.push_str(&format!(
            ", thresh_bump_percentile={}",
            run.thresh_bump_percentile
        ));
        encoded = true;
    }

    if encoded {
        name.push_str(".csv");
        name
    } else {
        format!("{}-{}.csv", name, index + 1)
    }
}
