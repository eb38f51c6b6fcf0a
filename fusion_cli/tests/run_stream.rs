use fusion_cli::{load_config, run_files, run_stream, ConfigOverrides};
use fusion_core::prelude::*;
use std::io::{Cursor, Write};
use std::path::PathBuf;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample_input.txt")
}

fn run_text(text: &str) -> (String, fusion_cli::RunSummary) {
    let mut estimator = FusionEkf::default();
    let mut output = Vec::new();
    let summary = run_stream(&mut estimator, Cursor::new(text), &mut output).unwrap();
    (String::from_utf8(output).unwrap(), summary)
}

#[test]
fn identical_input_gives_identical_output() {
    let text = std::fs::read_to_string(sample_path()).unwrap();

    let (first, first_summary) = run_text(&text);
    let (second, second_summary) = run_text(&text);

    assert_eq!(first, second);
    assert_eq!(first_summary.rmse, second_summary.rmse);
    assert_eq!(first.lines().count(), 60);
}

#[test]
fn sample_log_tracks_the_ground_truth() {
    let text = std::fs::read_to_string(sample_path()).unwrap();
    let (output, summary) = run_text(&text);

    assert_eq!(summary.records, 60);
    assert_eq!(summary.estimates, 60);
    assert_eq!(summary.malformed_records, 0);
    assert_eq!(summary.rejected_measurements, 0);
    assert_eq!(summary.skipped_updates, 0);

    let rmse = summary.rmse.unwrap();
    assert!(rmse[0] < 1.0 && rmse[1] < 1.0, "position RMSE {}", rmse);
    assert!(rmse.iter().all(|v| v.is_finite()));

    for line in output.lines() {
        assert_eq!(line.split(' ').count(), 10, "bad output line: {}", line);
    }
}

#[test]
fn bad_lines_are_skipped_and_the_stream_continues() {
    let text = "\
# comment lines and blank lines are ignored

L 1.0 1.0 0 1.0 1.0 0.0 0.0
X 1.0 1.0 50000 1.0 1.0 0.0 0.0
L 1.05 oops 100000 1.1 1.0 1.0 0.0
R 1.0 0.5 150000 1.0 1.0 1.0 0.0
L 1.1 1.0 100000 1.1 1.0 1.0 0.0
L 1.0 1.0 50000 1.05 1.0 1.0 0.0
L 1.2 1.0 200000 1.2 1.0 1.0 0.0
";
    let (output, summary) = run_text(text);

    // Three malformed lines (unknown tag, bad number, missing field) and one
    // out-of-order record.
    assert_eq!(summary.records, 7);
    assert_eq!(summary.malformed_records, 3);
    assert_eq!(summary.rejected_measurements, 1);
    assert_eq!(summary.estimates, 3);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    // meas_1, meas_2 and the ground truth are echoed verbatim.
    assert!(lines[0].ends_with(" 1 1 1 1 0 0"), "{}", lines[0]);
    assert!(lines[2].ends_with(" 1.2 1 1.2 1 1 0"), "{}", lines[2]);
}

#[test]
fn extreme_timestamp_gap_is_rejected_and_the_stream_continues() {
    let text = "\
L 1.0 1.0 -9000000000000000000 1.0 1.0 0.0 0.0
L 1.1 1.0 9000000000000000000 1.1 1.0 1.0 0.0
L 1.1 1.0 -8999999999999900000 1.1 1.0 1.0 0.0
";
    let (output, summary) = run_text(text);

    assert_eq!(summary.records, 3);
    assert_eq!(summary.rejected_measurements, 1);
    assert_eq!(summary.estimates, 2);
    assert_eq!(output.lines().count(), 2);
}

#[test]
fn radar_output_columns_are_rho_and_phi() {
    let text = "R 5.0 0.0 0.0 0 5.0 0.0 0.0 0.0\n";
    let (output, _) = run_text(text);

    assert_eq!(output.trim_end(), "5 0 0 0 5 0 5 0 0 0");
}

#[test]
fn rmse_is_an_error_when_nothing_was_accepted() {
    let (output, summary) = run_text("Z 1 2 3 4 5 6 7\n");

    assert!(output.is_empty());
    assert_eq!(
        summary.rmse,
        Err(AccuracyError::InvalidAccuracyInput {
            estimates: 0,
            ground_truths: 0
        })
    );
}

#[test]
fn run_files_writes_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("output.txt");

    let summary = run_files(&sample_path(), Some(output_path.as_path()), &FusionConfig::default())
        .unwrap();
    let written = std::fs::read_to_string(&output_path).unwrap();

    assert_eq!(written.lines().count(), summary.estimates);
    assert!(summary.rmse.is_ok());
}

#[test]
fn missing_input_file_is_reported() {
    let err = run_files(
        &PathBuf::from("/no/such/input.txt"),
        None,
        &FusionConfig::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("failed to open input"));
}

#[test]
fn config_file_is_layered_under_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[filter]
lidar_noise = [0.04, 0.04]
covariance_update = "joseph"

[filter.process]
noise_ax = 2.0
noise_ay = 3.0
"#
    )
    .unwrap();

    let overrides = ConfigOverrides {
        noise_ay: Some(5.0),
        ..ConfigOverrides::default()
    };
    let config = load_config(Some(file.path()), &overrides).unwrap();

    assert_eq!(config.filter.lidar_noise, [0.04, 0.04]);
    assert_eq!(config.filter.radar_noise, [0.09, 0.0009, 0.09]);
    assert_eq!(config.filter.process.noise_ax, 2.0);
    assert_eq!(config.filter.process.noise_ay, 5.0);
    assert_eq!(
        config.filter.covariance_update,
        fusion_core::estimation::CovarianceUpdate::Joseph
    );
}

#[test]
fn invalid_config_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[filter]\nuse_lidar = false\nuse_radar = false").unwrap();

    assert!(load_config(Some(file.path()), &ConfigOverrides::default()).is_err());
}
