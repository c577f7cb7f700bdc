//! Example: Analyze multiple recordings in parallel
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] [--profile P] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files (batch-level). Each file analysis is still single-threaded
//!   unless the crate is built with the `parallel` feature.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.
//! - Files are passed in chronological order; the personal baseline is computed over the
//!   newest successful reports.

use prosody_dsp::features::statistics::percentile;
use prosody_dsp::io::decoder::decode_audio;
use prosody_dsp::io::resample::{resample_to, ANALYSIS_SAMPLE_RATE};
use prosody_dsp::{
    analyze_buffer, compute_baseline, score_report, AnalysisConfig, FeatureReport, VoiceProfile,
};
use rayon::prelude::*;
use std::env;
use std::time::Instant;

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut profile = VoiceProfile::default();
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--profile" => {
                profile = args.first().ok_or("--profile requires a value")?.parse()?;
                args.remove(0);
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_batch [--jobs N] [--json] [--profile P] <file1> <file2> ...\n\
                     \n\
                     --jobs N     Parallel workers (default: CPU-1)\n\
                     --json       Emit one JSON object per line (JSONL)\n\
                     --profile P  male | female | unspecified (pitch score)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one audio file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let config = AnalysisConfig::default();

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let reports: Vec<(FeatureReport, f32)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let started = Instant::now();
                let report = decode_audio(path)
                    .and_then(|buffer| resample_to(&buffer, ANALYSIS_SAMPLE_RATE))
                    .map(|buffer| analyze_buffer(&buffer, &config))
                    .unwrap_or_else(|e| FeatureReport::failure(&e));
                (report, started.elapsed().as_secs_f32() * 1000.0)
            })
            .collect()
    });

    for (idx, (path, (report, elapsed_ms))) in paths.iter().zip(&reports).enumerate() {
        let scores = score_report(report, profile);
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "file": path,
                    "report": report,
                    "scores": scores,
                    "elapsed_ms": elapsed_ms,
                })
            );
        } else if let Some(error) = &report.error_message {
            println!("[{}/{}] {}: ERROR: {}", idx + 1, reports.len(), path, error);
        } else {
            println!(
                "[{}/{}] {}: pitch={:?} tempo={:?} volume={:?} scores={:?} time={:.2}ms",
                idx + 1,
                reports.len(),
                path,
                report.pitch_hz,
                report.tempo_per_minute,
                report.volume_dbfs,
                scores,
                elapsed_ms
            );
        }
    }

    if let Some(baseline) = compute_baseline(reports.iter().rev().map(|(r, _)| r)) {
        if json {
            println!("{}", serde_json::json!({ "baseline": baseline }));
        } else {
            println!("Baseline: {:?}", baseline);
        }
    }

    let ok_times: Vec<f32> = reports
        .iter()
        .filter(|(r, _)| r.is_success())
        .map(|(_, t)| *t)
        .collect();
    let wall_ms = t0.elapsed().as_secs_f64() * 1000.0;

    eprintln!(
        "Done: ok={}/{} wall={:.0}ms",
        ok_times.len(),
        reports.len(),
        wall_ms
    );
    if !ok_times.is_empty() {
        let mean = ok_times.iter().sum::<f32>() / ok_times.len() as f32;
        let p50 = percentile(&ok_times, 50.0).unwrap_or(mean);
        let p90 = percentile(&ok_times, 90.0).unwrap_or(mean);
        eprintln!(
            "processing_time_ms: mean={:.2} p50={:.2} p90={:.2}",
            mean, p50, p90
        );
    }

    Ok(())
}
