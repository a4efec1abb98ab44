use std::fs;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_emoharmony_cli"))
}

/// Write a request file under the system temp dir and return its path
fn request_file(name: &str, body: &Value) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "emoharmony_cli_{}_{}.json",
        name,
        std::process::id()
    ));
    fs::write(&path, body.to_string()).expect("write request file");
    path
}

fn sine(frequency: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| (2.0 * std::f64::consts::PI * frequency * i as f64 / 128.0).sin())
        .collect()
}

#[test]
fn analyze_prints_report() {
    let request = serde_json::json!({
        "signal": sine(10.0, 1280),
        "samplingRate": 128,
        "modelType": "AUTO"
    });
    let input = request_file("analyze", &request);

    let output = cli()
        .args(["analyze", "--input"])
        .arg(&input)
        .output()
        .expect("failed to run emoharmony_cli analyze");
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("analysis report JSON payload");
    assert_eq!(json["samplesAnalyzed"], 1280);
    assert_eq!(json["channelsAnalyzed"], 1);
    assert_eq!(json["classification"]["strategy"], "ENSEMBLE");
    assert_eq!(json["classification"]["model_used"], "AUTO");
    assert_eq!(json["classification"]["source"], "heuristic");
    assert_eq!(json["features"].as_array().map(Vec::len), Some(17));

    let _ = fs::remove_file(input);
}

#[test]
fn analyze_interleaved_channels_with_strategy_override() {
    let left = sine(10.0, 256);
    let right = sine(20.0, 256);
    let flat: Vec<f64> = left.iter().zip(&right).flat_map(|(l, r)| [*l, *r]).collect();
    let request = serde_json::json!({
        "signal": flat,
        "samplingRate": 128,
        "modelType": "SVM",
        "channels": 2
    });
    let input = request_file("interleaved", &request);

    let output = cli()
        .args(["analyze", "--strategy", "lightgbm", "--input"])
        .arg(&input)
        .output()
        .expect("failed to run interleaved analyze");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("report JSON");
    assert_eq!(json["channelsAnalyzed"], 2);
    assert_eq!(json["samplesAnalyzed"], 256);
    assert_eq!(json["classification"]["strategy"], "LGBM");
    assert_eq!(json["classification"]["model_used"], "lightgbm");

    let _ = fs::remove_file(input);
}

#[test]
fn analyze_rejects_short_signal() {
    let request = serde_json::json!({ "signal": sine(10.0, 32) });
    let input = request_file("short", &request);

    let output = cli()
        .args(["analyze", "--input"])
        .arg(&input)
        .output()
        .expect("failed to run short analyze");
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("\"code\": 1004"),
        "expected error payload in stderr, got {stderr}"
    );

    let _ = fs::remove_file(input);
}

#[test]
fn analyze_missing_input_fails() {
    let output = cli()
        .args(["analyze", "--input", "/nonexistent/emoharmony/request.json"])
        .output()
        .expect("failed to run analyze");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn models_lists_catalog() {
    let output = cli().arg("models").output().expect("failed to run models");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("catalog JSON");
    let entries = json.as_array().expect("catalog array");
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().all(|e| e["available"] == false));
    assert!(entries.iter().any(|e| e["id"] == "ENSEMBLE"));
}

#[test]
fn bands_prints_band_table() {
    let output = cli().arg("bands").output().expect("failed to run bands");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("bands JSON");
    let bands = json.as_array().expect("bands array");
    assert_eq!(bands.len(), 5);
    assert_eq!(bands[2]["name"], "alpha");
    assert_eq!(bands[2]["low_hz"], 8.0);
}
