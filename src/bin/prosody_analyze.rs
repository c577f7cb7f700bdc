//! Analyze one speech recording and print the feature report as JSON
//!
//! Usage:
//!   prosody-analyze <file> [--profile male|female] [--details]
//!
//! The file is decoded, down-mixed to mono and resampled to 16 kHz before
//! analysis. Request-level failures are reported inside the JSON output, so
//! the exit status is non-zero only for usage errors.

use std::env;

use prosody_dsp::io::decoder::decode_audio;
use prosody_dsp::io::resample::{resample_to, ANALYSIS_SAMPLE_RATE};
use prosody_dsp::{
    analyze_voice, score_report, AnalysisConfig, AnalysisError, FeatureReport, VoiceProfile,
};
use serde_json::json;

fn usage() -> &'static str {
    "Usage: prosody-analyze <file> [--profile male|female] [--details]\n\
     \n\
     --profile P  Speaker profile used for the pitch score (default: unspecified)\n\
     --details    Print segments, estimator diagnostics and metadata\n"
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut details = false;
    let mut profile = VoiceProfile::default();
    let mut path: Option<String> = None;

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--details" => details = true,
            "--profile" => {
                let v = args.first().ok_or("--profile requires a value")?;
                profile = v.parse()?;
                args.remove(0);
            }
            "--help" | "-h" => {
                eprintln!("{}", usage());
                return Ok(());
            }
            _ if path.is_none() => path = Some(a),
            _ => {
                eprintln!("ERROR: unexpected argument '{}'\n\n{}", a, usage());
                std::process::exit(2);
            }
        }
    }

    let Some(path) = path else {
        eprintln!("ERROR: Provide an audio file path. Use --help for usage.");
        std::process::exit(2);
    };

    let config = AnalysisConfig::default();

    let analysis = decode_audio(&path)
        .and_then(|buffer| resample_to(&buffer, ANALYSIS_SAMPLE_RATE))
        .and_then(|buffer| analyze_voice(buffer.samples(), buffer.sample_rate(), &config));

    let output = match analysis {
        Ok(analysis) => {
            let scores = score_report(&analysis.report, profile);
            let notes: Vec<&str> = analysis.notes.iter().map(|n| n.description()).collect();
            if details {
                json!({
                    "file": path,
                    "report": analysis.report,
                    "scores": scores,
                    "notes": notes,
                    "segments": analysis.segments,
                    "pitch": analysis.pitch,
                    "tempo": analysis.tempo,
                    "loudness": analysis.loudness,
                    "metadata": analysis.metadata,
                })
            } else {
                json!({
                    "file": path,
                    "report": analysis.report,
                    "scores": scores,
                    "notes": notes,
                })
            }
        }
        Err(e) => {
            log::warn!("{}: {}", path, e);
            failure_json(&path, &e)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn failure_json(path: &str, error: &AnalysisError) -> serde_json::Value {
    json!({
        "file": path,
        "report": FeatureReport::failure(error),
    })
}
