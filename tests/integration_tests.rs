//! Integration tests for the voice analysis pipeline

use prosody_dsp::io::decoder::decode_audio;
use prosody_dsp::io::resample::{resample_to, ANALYSIS_SAMPLE_RATE};
use prosody_dsp::{
    analyze, analyze_buffer, analyze_voice, analyze_with_config, detect_voice_segments,
    AnalysisConfig, AnalysisError, FeatureReport, PitchScope, QualityNote,
};
use std::f32::consts::PI;
use std::path::PathBuf;

const SR: u32 = 16000;

fn sine(freq: f32, amplitude: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Alternating voiced "syllables" and pauses
fn syllables(count: usize, freq: f32, amplitude: f32) -> Vec<f32> {
    let mut samples = Vec::new();
    for _ in 0..count {
        samples.extend(sine(freq, amplitude, 0.25, SR));
        samples.extend(vec![0.0f32; (0.15 * SR as f32) as usize]);
    }
    samples
}

/// Deterministic white noise in [-amplitude, amplitude]
fn noise(n: usize, amplitude: f32) -> Vec<f32> {
    let mut state = 0x9E37_79B9u32;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as f32 / u32::MAX as f32 * 2.0 - 1.0) * amplitude
        })
        .collect()
}

/// Write a 16-bit WAV with every channel carrying `samples`
fn write_wav(name: &str, samples: &[f32], sample_rate: u32, channels: u16) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "prosody_dsp_{}_{}.wav",
        name,
        std::process::id()
    ));
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
    for &s in samples {
        let value = (s * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(value).expect("write sample");
        }
    }
    writer.finalize().expect("finalize wav");
    path
}

fn assert_failure(report: &FeatureReport, message: &str) {
    assert_eq!(report.error_message.as_deref(), Some(message));
    assert!(report.pitch_hz.is_none());
    assert!(report.tempo_per_minute.is_none());
    assert!(report.volume_dbfs.is_none());
    assert!(report.duration_seconds.is_none());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_reports_no_speech() {
        let silence = vec![0.0f32; 2 * SR as usize];
        assert!(detect_voice_segments(&silence, SR, &AnalysisConfig::default())
            .unwrap()
            .is_empty());
        assert_failure(&analyze(&silence, SR), "No speech detected in audio file");
    }

    #[test]
    fn test_empty_buffer_reports_no_speech() {
        assert_failure(&analyze(&[], SR), "No speech detected in audio file");
        assert_eq!(
            analyze_voice(&[], SR, &AnalysisConfig::default()).unwrap_err(),
            AnalysisError::NoSpeechDetected
        );
    }

    #[test]
    fn test_over_length_rejected_before_analysis() {
        let long = sine(150.0, 0.5, 11.0, SR);
        assert_failure(
            &analyze(&long, SR),
            "Audio file too long. Maximum 10 seconds allowed.",
        );
        let err = analyze_voice(&long, SR, &AnalysisConfig::default()).unwrap_err();
        assert!(err.is_input_rejection());
    }

    #[test]
    fn test_150hz_tone_scenario() {
        let tone = sine(150.0, 0.5, 2.0, SR);
        let analysis = analyze_voice(&tone, SR, &AnalysisConfig::default()).unwrap();

        let pitch = analysis.report.pitch_hz.expect("pitch determinate");
        assert!((pitch - 150.0).abs() <= 5.0, "pitch {}", pitch);

        assert_eq!(analysis.segments.len(), 1);
        assert!(analysis.segments[0].start_seconds < 0.05);
        assert!(analysis.segments[0].end_seconds > 1.9);

        let expected_dbfs = 20.0 * (0.5 / 2f32.sqrt()).log10();
        let volume = analysis.report.volume_dbfs.expect("volume determinate");
        assert!((volume - expected_dbfs).abs() < 0.1, "volume {}", volume);

        assert_eq!(analysis.report.duration_seconds, Some(2.0));
        assert!(analysis.notes.contains(&QualityNote::LoudVolume));
        assert!(analysis.metadata.contained_faults.is_empty());
        assert!(analysis.loudness.band_loudness_lufs.is_some());
    }

    #[test]
    fn test_idempotent() {
        let samples = syllables(8, 180.0, 0.4);
        let first = analyze(&samples, SR);
        let second = analyze(&samples, SR);
        assert!(first.is_success());
        assert_eq!(first, second);
    }

    #[test]
    fn test_gain_raises_level_by_20log10() {
        let quiet = syllables(6, 160.0, 0.04);
        let gain = 10.0f32;
        let loud: Vec<f32> = quiet.iter().map(|x| x * gain).collect();

        let a = analyze(&quiet, SR).volume_dbfs.unwrap();
        let b = analyze(&loud, SR).volume_dbfs.unwrap();
        assert!(
            (b - a - 20.0 * gain.log10()).abs() < 1e-2,
            "level moved by {}",
            b - a
        );
    }

    #[test]
    fn test_threshold_monotonicity() {
        // Constant-amplitude bursts of different strength, separated by silence
        let mut samples = Vec::new();
        for &amplitude in &[0.5f32, 0.1, 0.03, 0.3] {
            samples.extend(sine(200.0, amplitude, 0.4, SR));
            samples.extend(vec![0.0f32; (0.3 * SR as f32) as usize]);
        }

        let mut previous_count = usize::MAX;
        let mut previous_voiced = f32::INFINITY;
        for &ratio in &[0.01f32, 0.05, 0.1, 0.2, 0.5, 0.9] {
            let config = AnalysisConfig::default().with_energy_threshold_ratio(ratio);
            let segments = detect_voice_segments(&samples, SR, &config).unwrap();
            let voiced: f32 = segments.iter().map(|s| s.duration()).sum();

            assert!(segments.len() <= previous_count, "ratio {} added segments", ratio);
            assert!(voiced <= previous_voiced + 1e-6, "ratio {} added voiced time", ratio);
            previous_count = segments.len();
            previous_voiced = voiced;
        }
    }

    #[test]
    fn test_pitch_stays_in_range() {
        for &freq in &[40.0f32, 75.0, 150.0, 300.0, 420.0, 900.0] {
            let report = analyze(&sine(freq, 0.5, 1.0, SR), SR);
            assert!(report.is_success());
            if let Some(pitch) = report.pitch_hz {
                assert!((50.0..=400.0).contains(&pitch), "{} Hz -> {}", freq, pitch);
            }
        }
    }

    #[test]
    fn test_tempo_non_negative() {
        for count in [2usize, 5, 12] {
            let report = analyze(&syllables(count, 140.0, 0.5), SR);
            if let Some(tempo) = report.tempo_per_minute {
                assert!(tempo >= 0.0 && tempo.is_finite(), "tempo {}", tempo);
            }
        }
    }

    #[test]
    fn test_partial_result_is_success() {
        // Noise has no periodicity: pitch undetermined, loudness still reported
        let samples = noise(SR as usize, 0.3);
        let report = analyze(&samples, SR);
        assert!(report.is_success());
        assert!(report.pitch_hz.is_none());
        assert!(report.volume_dbfs.is_some());
        assert!(report.duration_seconds.is_some());
    }

    #[test]
    fn test_invalid_config_reported_as_error() {
        let config = AnalysisConfig::default().with_energy_threshold_ratio(0.0);
        let report = analyze_with_config(&sine(150.0, 0.5, 1.0, SR), SR, &config);
        assert!(!report.is_success());
        assert!(report
            .error_message
            .as_deref()
            .unwrap()
            .starts_with("Invalid configuration"));
    }

    #[test]
    fn test_report_json_wire_format() {
        let report = analyze(&sine(150.0, 0.5, 1.0, SR), SR);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["pitch_value"].is_number());
        assert!(json["volume_value"].is_number());
        assert!(json["analysis_error_message"].is_null());

        let failed = serde_json::to_value(analyze(&[], SR)).unwrap();
        assert!(failed["pitch_value"].is_null());
        assert_eq!(failed["analysis_error_message"], "No speech detected in audio file");
    }

    #[test]
    fn test_wav_decode_and_analyze() {
        let tone = sine(150.0, 0.5, 1.5, SR);
        let path = write_wav("mono16k", &tone, SR, 1);

        let buffer = decode_audio(&path).expect("decode wav");
        assert_eq!(buffer.sample_rate(), SR);
        assert_eq!(buffer.len(), tone.len());
        assert!((buffer.samples()[100] - tone[100]).abs() < 1e-3);

        let report = analyze_buffer(&buffer, &AnalysisConfig::default());
        let pitch = report.pitch_hz.expect("pitch determinate");
        assert!((pitch - 150.0).abs() <= 5.0, "pitch {}", pitch);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_stereo_48k_wav_resampled() {
        let tone = sine(150.0, 0.5, 1.0, 48000);
        let path = write_wav("stereo48k", &tone, 48000, 2);

        let decoded = decode_audio(&path).expect("decode wav");
        assert_eq!(decoded.sample_rate(), 48000);
        assert_eq!(decoded.len(), tone.len());

        let buffer = resample_to(&decoded, ANALYSIS_SAMPLE_RATE).unwrap();
        assert_eq!(buffer.sample_rate(), ANALYSIS_SAMPLE_RATE);

        let report = analyze_buffer(&buffer, &AnalysisConfig::default());
        let pitch = report.pitch_hz.expect("pitch determinate");
        assert!((pitch - 150.0).abs() <= 5.0, "pitch {}", pitch);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_decoding_failure() {
        let err = decode_audio("/nonexistent/recording.wav").unwrap_err();
        let report = FeatureReport::failure(&err);
        assert!(report
            .error_message
            .as_deref()
            .unwrap()
            .starts_with("Decoding error"));
    }

    #[test]
    fn test_low_rate_keeps_level_without_band_loudness() {
        // 4 kHz input: the 500-2000 Hz band reaches Nyquist, only band loudness is lost
        let rate = 4000;
        let tone = sine(150.0, 0.5, 2.0, rate);
        let report = analyze(&tone, rate);
        assert!(report.is_success(), "{:?}", report.error_message);
        assert!(report.volume_dbfs.is_some());
        assert_eq!(report.duration_seconds, Some(2.0));

        let analysis = analyze_voice(&tone, rate, &AnalysisConfig::default()).unwrap();
        assert!(analysis.loudness.band_loudness_lufs.is_none());
        assert!(analysis.loudness.level_dbfs.is_some());
        let pitch = analysis.report.pitch_hz.expect("pitch determinate");
        assert!((pitch - 150.0).abs() <= 5.0, "pitch {}", pitch);
    }

    #[test]
    fn test_pitch_scope_full_buffer_and_voiced_only() {
        let mut samples = vec![0.0f32; 3 * SR as usize];
        samples.extend(sine(150.0, 0.5, 1.0, SR));
        samples.extend(vec![0.0f32; 3 * SR as usize]);

        let full = analyze_voice(&samples, SR, &AnalysisConfig::default()).unwrap();
        let voiced_config = AnalysisConfig::default().with_pitch_scope(PitchScope::VoicedOnly);
        let voiced = analyze_voice(&samples, SR, &voiced_config).unwrap();

        for analysis in [&full, &voiced] {
            let pitch = analysis.report.pitch_hz.expect("pitch determinate");
            assert!((pitch - 150.0).abs() <= 5.0, "pitch {}", pitch);
        }
        assert!(
            voiced.pitch.frames_analyzed < full.pitch.frames_analyzed,
            "voiced {} vs full {}",
            voiced.pitch.frames_analyzed,
            full.pitch.frames_analyzed
        );
        assert_eq!(voiced.metadata.pitch_frames, voiced.pitch.frames_analyzed);
    }

    #[test]
    fn test_duration_cap_is_configurable() {
        let long = sine(150.0, 0.5, 11.0, SR);
        let config = AnalysisConfig::default().with_max_duration(12.0);
        let analysis = analyze_voice(&long, SR, &config).unwrap();
        assert_eq!(analysis.report.duration_seconds, Some(11.0));

        let short_cap = AnalysisConfig::default().with_max_duration(1.0);
        let report = analyze_with_config(&sine(150.0, 0.5, 2.0, SR), SR, &short_cap);
        assert!(!report.is_success());
    }

    #[test]
    fn test_min_segment_duration_drops_short_runs() {
        // 0.25 s bursts well apart: about 0.38 s voiced each after framing
        let mut samples = Vec::new();
        for _ in 0..4 {
            samples.extend(sine(160.0, 0.5, 0.25, SR));
            samples.extend(vec![0.0f32; (0.5 * SR as f32) as usize]);
        }
        let default_segments =
            detect_voice_segments(&samples, SR, &AnalysisConfig::default()).unwrap();
        assert_eq!(default_segments.len(), 4);

        let strict = AnalysisConfig::default().with_min_segment_duration(0.6);
        assert!(detect_voice_segments(&samples, SR, &strict).unwrap().is_empty());
        assert_eq!(
            analyze_voice(&samples, SR, &strict).unwrap_err(),
            AnalysisError::NoSpeechDetected
        );
    }
}
