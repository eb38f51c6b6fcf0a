// fusion_cli/src/runner.rs

//! Drives an estimator over a measurement log and collects the results.

use anyhow::{Context, Result};
use fusion_core::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counters and accuracy gathered over one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Non-blank, non-comment lines seen.
    pub records: usize,
    /// Estimate lines written (one per accepted record).
    pub estimates: usize,
    /// Lines that could not be parsed.
    pub malformed_records: usize,
    /// Parsed records the estimator refused.
    pub rejected_measurements: usize,
    /// Records whose update was skipped after the prediction.
    pub skipped_updates: usize,
    /// Radar updates linearized at the origin.
    pub degenerate_jacobians: usize,
    pub rmse: Result<StateVector, AccuracyError>,
}

/// Processes every record from `input`, writing an `EstimateRecord` line to
/// `output` for each record the estimator accepted.
///
/// Per-record problems (bad lines, out-of-order timestamps, degenerate updates)
/// are logged and counted; only I/O failures abort the run.
pub fn run_stream<E, R, W>(estimator: &mut E, input: R, output: &mut W) -> Result<RunSummary>
where
    E: StateEstimator,
    R: BufRead,
    W: Write,
{
    let mut accuracy = RmseAccumulator::default();
    let mut records = 0;
    let mut estimates = 0;
    let mut malformed_records = 0;
    let mut rejected_measurements = 0;
    let mut skipped_updates = 0;
    let mut degenerate_jacobians = 0;

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("failed to read line {}", line_number))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        records += 1;

        let record = match SensorRecord::parse(trimmed, line_number) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping record: {}", e);
                malformed_records += 1;
                continue;
            }
        };

        let step = match estimator.process(&record.measurement) {
            Ok(step) => step,
            Err(e) => {
                warn!("Skipping record on line {}: {}", line_number, e);
                rejected_measurements += 1;
                continue;
            }
        };

        match &step.kind {
            StepKind::UpdateSkipped { .. } => skipped_updates += 1,
            StepKind::Updated {
                degenerate_jacobian: true,
                ..
            } => degenerate_jacobians += 1,
            _ => {}
        }

        if !step.has_estimate() {
            debug!(line = line_number, "no estimate for this record");
            continue;
        }

        writeln!(output, "{}", EstimateRecord::new(step.estimate, &record))
            .context("failed to write estimate record")?;
        accuracy.push(&step.estimate, &record.ground_truth);
        estimates += 1;
    }
    output.flush().context("failed to flush estimate records")?;

    Ok(RunSummary {
        records,
        estimates,
        malformed_records,
        rejected_measurements,
        skipped_updates,
        degenerate_jacobians,
        rmse: accuracy.rmse(),
    })
}

/// File-based front end for [`run_stream`].
pub fn run_files(input: &Path, output: Option<&Path>, config: &FusionConfig) -> Result<RunSummary> {
    let mut estimator = FusionEkf::new(config.clone()).context("invalid filter configuration")?;

    let reader = BufReader::new(
        File::open(input).with_context(|| format!("failed to open input {}", input.display()))?,
    );
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("failed to create output {}", path.display())
        })?)),
        None => Box::new(io::sink()),
    };

    info!("Processing measurements from: {}", input.display());
    let summary = run_stream(&mut estimator, reader, &mut writer)?;
    info!(
        records = summary.records,
        estimates = summary.estimates,
        malformed = summary.malformed_records,
        rejected = summary.rejected_measurements,
        skipped_updates = summary.skipped_updates,
        "Run complete"
    );
    Ok(summary)
}

/// `RMSE: [px py vx vy]`
pub fn format_rmse(rmse: &StateVector) -> String {
    format!("RMSE: [{} {} {} {}]", rmse[0], rmse[1], rmse[2], rmse[3])
}
