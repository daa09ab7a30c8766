use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const RATE: u32 = 16_000;

fn write_wav(path: &Path, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

fn voiced_samples(duration_ms: usize) -> Vec<f32> {
    let len = duration_ms * RATE as usize / 1000;
    (0..len)
        .map(|i| {
            let t = i as f32 / RATE as f32;
            0.4 * (2.0 * std::f32::consts::PI * 220.0 * t).sin()
        })
        .collect()
}

#[test]
fn scores_a_wav_and_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("attempt.wav");
    write_wav(&wav, &voiced_samples(1_000));

    let output = Command::cargo_bin("phonoscore")
        .unwrap()
        .arg(&wav)
        .args(["--phonemes", "DH AH K AE T"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aggregate_score"))
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["per_phoneme"].as_array().unwrap().len(), 5);
    assert_eq!(parsed["per_phoneme"][0]["phoneme"], "DH");
}

#[test]
fn silent_recording_reports_an_actionable_error() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("silence.wav");
    write_wav(&wav, &vec![0.0; RATE as usize]);

    Command::cargo_bin("phonoscore")
        .unwrap()
        .arg(&wav)
        .args(["--phonemes", "DH AH"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no usable voiced audio"));
}

#[test]
fn unknown_phoneme_symbol_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("attempt.wav");
    write_wav(&wav, &voiced_samples(500));

    Command::cargo_bin("phonoscore")
        .unwrap()
        .arg(&wav)
        .args(["--phonemes", "DH QX"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("QX"));
}

#[test]
fn writes_result_to_output_file_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("attempt.wav");
    let out = dir.path().join("result.json");
    write_wav(&wav, &voiced_samples(800));

    Command::cargo_bin("phonoscore")
        .unwrap()
        .arg(&wav)
        .args(["--phonemes", "HH AY"])
        .arg("--output")
        .arg(&out)
        .args(["--phonetic-priors"])
        .assert()
        .success();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert!(parsed["aggregate_score"].is_number());
    // HH gets less time than the vowel under phonetic priors.
    let first = &parsed["per_phoneme"][0];
    let second = &parsed["per_phoneme"][1];
    let hh_len = first["end_ms"].as_f64().unwrap() - first["start_ms"].as_f64().unwrap();
    let ay_len = second["end_ms"].as_f64().unwrap() - second["start_ms"].as_f64().unwrap();
    assert!(ay_len > hh_len);
}
