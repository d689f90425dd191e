use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn dashtrack() -> Command {
    let mut cmd = Command::cargo_bin("dashtrack").unwrap();
    cmd.env_remove("DASHTRACK_CONFIG")
        .env_remove("DASHTRACK_MODE")
        .env_remove("DASHTRACK_PROPERTIES")
        .env("DASHTRACK_LOG_LEVEL", "warn");
    cmd
}

fn feature_count(path: &Path) -> usize {
    let text = fs::read_to_string(path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["type"], "FeatureCollection");
    value["features"].as_array().unwrap().len()
}

#[test]
fn test_help_lists_commands() {
    dashtrack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("video"))
        .stdout(predicate::str::contains("gpx"))
        .stdout(predicate::str::contains("merge"));
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    dashtrack()
        .args(["gpx", "--input"])
        .arg(dir.path().join("absent.gpx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input does not exist"));
}

#[test]
fn test_gpx_command_writes_named_file() {
    let dir = TempDir::new().unwrap();
    dashtrack()
        .args(["gpx", "--input"])
        .arg(fixture_path("ride.gpx"))
        .args(["--name", "guilin", "--frequency", "1", "--output-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("guilin.geojson"));

    // 5 samples over 4 s plus the line
    assert_eq!(feature_count(&dir.path().join("guilin.geojson")), 6);
}

#[test]
fn test_invalid_mode_is_rejected() {
    let dir = TempDir::new().unwrap();
    dashtrack()
        .args(["gpx", "--input"])
        .arg(fixture_path("ride.gpx"))
        .args(["--mode", "both", "--output-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("both"));
    assert!(!dir.path().join("ride.geojson").exists());
}

#[test]
fn test_gpx_frequency_below_one_is_rejected() {
    let dir = TempDir::new().unwrap();
    dashtrack()
        .args(["gpx", "--input"])
        .arg(fixture_path("ride.gpx"))
        .args(["--frequency", "0.5", "--output-dir"])
        .arg(dir.path())
        .assert()
        .failure();
}

#[test]
fn test_merge_files_in_order() {
    let dir = TempDir::new().unwrap();
    for (name, frequency) in [("a", "1"), ("b", "2")] {
        dashtrack()
            .args(["gpx", "--input"])
            .arg(fixture_path("ride.gpx"))
            .args(["--name", name, "--frequency", frequency, "--output-dir"])
            .arg(dir.path())
            .assert()
            .success();
    }

    let merged = dir.path().join("all.geojson");
    dashtrack()
        .args(["merge", "--compact", "--output"])
        .arg(&merged)
        .arg(dir.path().join("a.geojson"))
        .arg(dir.path().join("b.geojson"))
        .assert()
        .success();

    assert_eq!(feature_count(&merged), 6 + 10);
    let text = fs::read_to_string(&merged).unwrap();
    assert_eq!(text.trim_end().lines().count(), 1);
}

#[test]
fn test_merge_directory_skips_its_own_output() {
    let dir = TempDir::new().unwrap();
    dashtrack()
        .args(["gpx", "--input"])
        .arg(fixture_path("ride.gpx"))
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success();

    let merged = dir.path().join("merged.geojson");
    for _ in 0..2 {
        dashtrack()
            .args(["merge", "--output"])
            .arg(&merged)
            .arg("--input-dir")
            .arg(dir.path())
            .assert()
            .success();
    }
    assert_eq!(feature_count(&merged), 10);
}

#[test]
fn test_merge_directory_skips_output_named_another_way() {
    let dir = TempDir::new().unwrap();
    dashtrack()
        .args(["gpx", "--input"])
        .arg(fixture_path("ride.gpx"))
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success();

    let merged = dir.path().join(".").join("all.geojson");
    for _ in 0..2 {
        dashtrack()
            .args(["merge", "--output"])
            .arg(&merged)
            .arg("--input-dir")
            .arg(dir.path())
            .assert()
            .success();
    }
    assert_eq!(feature_count(&dir.path().join("all.geojson")), 10);
}

#[test]
fn test_zero_timeout_in_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("dashtrack.toml");
    fs::write(&config, "[exiftool]\ntimeout_secs = 0\n").unwrap();
    let video = dir.path().join("clip.mp4");
    fs::write(&video, b"").unwrap();

    dashtrack()
        .arg("--config")
        .arg(&config)
        .args(["video", "--input"])
        .arg(&video)
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_secs"));
    assert!(!dir.path().join("clip.geojson").exists());
}

#[test]
fn test_merge_requires_inputs() {
    dashtrack()
        .args(["merge", "--output", "out.geojson"])
        .assert()
        .failure();
}

/// Configuration pointing the metadata tool at the replay script
#[cfg(unix)]
fn replay_config(dir: &Path) -> PathBuf {
    let script = fixture_path("fake_exiftool.sh");
    let config = dir.join("dashtrack.toml");
    fs::write(
        &config,
        format!(
            "[exiftool]\nprogram = \"sh\"\nargs = [\"{}\"]\ntimeout_secs = 10\n",
            script.display()
        ),
    )
    .unwrap();
    config
}

#[cfg(unix)]
#[test]
fn test_video_command_with_replayed_tool() {
    let dir = TempDir::new().unwrap();
    let config = replay_config(dir.path());
    let video = dir.path().join("20250226112032_000029A.MP4");
    fs::write(&video, b"").unwrap();
    let out = dir.path().join("geojson");

    dashtrack()
        .arg("--config")
        .arg(&config)
        .args(["video", "--input"])
        .arg(&video)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("20250226112032_000029A.geojson"));

    let written = out.join("20250226112032_000029A.geojson");
    assert_eq!(feature_count(&written), 5);
    let text = fs::read_to_string(&written).unwrap();
    assert!(text.contains("\"starttime\": \"2025-02-26T03:20:32Z\""));
}

#[cfg(unix)]
#[test]
fn test_inspect_reports_frames() {
    let dir = TempDir::new().unwrap();
    let config = replay_config(dir.path());
    let video = dir.path().join("clip.mp4");
    fs::write(&video, b"").unwrap();

    let output = dashtrack()
        .arg("--config")
        .arg(&config)
        .args(["inspect", "--input"])
        .arg(&video)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["fix_count"], 4);
    assert_eq!(report["fixes"][3]["frame_index"], 89);
}

#[cfg(unix)]
#[test]
fn test_convert_directory_with_replayed_tool() {
    let dir = TempDir::new().unwrap();
    let config = replay_config(dir.path());
    let input = dir.path().join("Movie");
    let out = dir.path().join("geojson");
    fs::create_dir_all(input.join("trip")).unwrap();
    fs::write(input.join("front.mp4"), b"").unwrap();
    fs::write(input.join("trip/ride.mov"), b"").unwrap();
    fs::copy(fixture_path("ride.gpx"), input.join("trip/ride.gpx")).unwrap();

    dashtrack()
        .arg("--config")
        .arg(&config)
        .args(["convert", "--concurrency", "2", "--input-dir"])
        .arg(&input)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("converted 2 source(s), skipped 0"))
        .stdout(predicate::str::contains("merged: "));

    assert_eq!(feature_count(&out.join("front.geojson")), 5);
    assert_eq!(feature_count(&out.join("ride.geojson")), 10);
}
