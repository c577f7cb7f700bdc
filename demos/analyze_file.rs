//! Example: Analyze a single audio file
//!
//! This example demonstrates how to analyze a speech recording and print the
//! report, advisory notes and condition scores.
//!
//! Usage:
//!   cargo run --example analyze_file -- <file>

use prosody_dsp::io::decoder::decode_audio;
use prosody_dsp::io::resample::{resample_to, ANALYSIS_SAMPLE_RATE};
use prosody_dsp::{analyze_voice, score_report, AnalysisConfig, VoiceProfile};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: analyze_file <file>")?;

    // Load and convert to the analysis rate
    let decoded = decode_audio(&path)?;
    let buffer = resample_to(&decoded, ANALYSIS_SAMPLE_RATE)?;

    // Configure analysis
    let config = AnalysisConfig::default();

    // Analyze
    let analysis = analyze_voice(buffer.samples(), buffer.sample_rate(), &config)?;
    let report = &analysis.report;
    let scores = score_report(report, VoiceProfile::Unspecified);

    let fmt = |v: Option<f32>, unit: &str| match v {
        Some(v) => format!("{:.1} {}", v, unit),
        None => "undetermined".to_string(),
    };

    // Print results
    println!("Analysis Results:");
    println!("  Duration: {:.2} s ({} segments, {:.2} s voiced)",
        buffer.duration_seconds(),
        analysis.metadata.segment_count,
        analysis.metadata.voiced_duration_seconds
    );
    println!("  Pitch: {} (score {:?})", fmt(report.pitch_hz, "Hz"), scores.pitch);
    println!("  Tempo: {} (score {:?})", fmt(report.tempo_per_minute, "/min"), scores.tempo);
    println!("  Volume: {} (score {:?})", fmt(report.volume_dbfs, "dBFS"), scores.volume);
    println!("  Band loudness: {}", fmt(analysis.loudness.band_loudness_lufs, "LUFS"));
    println!("  Dynamic range: {}", fmt(analysis.loudness.dynamic_range_db, "dB"));
    for note in &analysis.notes {
        println!("  Note: {}", note.description());
    }
    println!("  Processing time: {:.2} ms", analysis.metadata.processing_time_ms);

    Ok(())
}
