//! Audio decoding using Symphonia
//!
//! Decodes the first audio track of a file and down-mixes every frame to
//! mono by averaging the channels.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

use super::sample_buffer::SampleBuffer;
use crate::error::AnalysisError;

fn decoding_error(context: &str, e: SymphoniaError) -> AnalysisError {
    AnalysisError::Decoding(format!("{}: {}", context, e))
}

/// Average all channels of `buf` into mono f32
fn downmix<S>(buf: &AudioBuffer<S>) -> Vec<f32>
where
    S: Sample,
    f32: FromSample<S>,
{
    let channels = buf.spec().channels.count();
    if channels == 1 {
        return buf.chan(0).iter().map(|&s| f32::from_sample(s)).collect();
    }
    (0..buf.frames())
        .map(|i| {
            (0..channels)
                .map(|ch| f32::from_sample(buf.chan(ch)[i]))
                .sum::<f32>()
                / channels as f32
        })
        .collect()
}

fn downmix_ref(decoded: AudioBufferRef<'_>) -> Vec<f32> {
    match decoded {
        AudioBufferRef::U8(buf) => downmix(&buf),
        AudioBufferRef::U16(buf) => downmix(&buf),
        AudioBufferRef::U24(buf) => downmix(&buf),
        AudioBufferRef::U32(buf) => downmix(&buf),
        AudioBufferRef::S8(buf) => downmix(&buf),
        AudioBufferRef::S16(buf) => downmix(&buf),
        AudioBufferRef::S24(buf) => downmix(&buf),
        AudioBufferRef::S32(buf) => downmix(&buf),
        AudioBufferRef::F32(buf) => downmix(&buf),
        AudioBufferRef::F64(buf) => downmix(&buf),
    }
}

/// Decode an audio file to mono PCM samples
///
/// # Arguments
///
/// * `path` - Path to audio file (any container/codec Symphonia supports)
///
/// # Returns
///
/// Mono [`SampleBuffer`] at the file's native sample rate
///
/// # Errors
///
/// Returns `AnalysisError::Decoding` if the file cannot be opened, probed or
/// decoded, has no audio track, or does not declare a sample rate
pub fn decode_audio<P: AsRef<Path>>(path: P) -> Result<SampleBuffer, AnalysisError> {
    let path = path.as_ref();
    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path)
        .map_err(|e| AnalysisError::Decoding(format!("{}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decoding_error("unsupported format", e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::Decoding("No supported audio tracks found".to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::Decoding("Track has no sample rate".to_string()))?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decoding_error("unsupported codec", e))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(decoding_error("reading packet", e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => samples.extend(downmix_ref(decoded)),
            Err(SymphoniaError::DecodeError(e)) => {
                // Corrupted packet; keep going
                log::warn!("Skipping undecodable packet: {}", e);
            }
            Err(e) => return Err(decoding_error("decoding packet", e)),
        }
    }

    log::debug!(
        "Decoded {} mono samples at {} Hz from {}",
        samples.len(),
        sample_rate,
        path.display()
    );

    SampleBuffer::new(samples, sample_rate)
}
