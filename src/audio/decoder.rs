//! Audio decoding from in-memory buffers using Symphonia

use log::{debug, info, warn};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{mix_to_mono, AudioSample};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, Result};

/// Turns an uploaded or recorded byte buffer into a mono [`AudioSample`].
///
/// The format reader and codec live only for the duration of one `decode` call,
/// so they are released on every exit path including errors.
#[derive(Debug, Clone)]
pub struct SignalDecoder {
    assumed_sample_rate: u32,
    default_duration_secs: f32,
}

impl Default for SignalDecoder {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }
}

impl SignalDecoder {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            assumed_sample_rate: config.assumed_sample_rate,
            default_duration_secs: config.default_duration_secs,
        }
    }

    /// Decode `bytes` declared as `media_type` (e.g. `audio/wav`).
    ///
    /// # Errors
    /// `AnalysisError::Decode` when the buffer is empty, the media type is not
    /// audio, no container or codec matches, or nothing decodes.
    pub fn decode(&self, bytes: &[u8], media_type: &str) -> Result<AudioSample> {
        if bytes.is_empty() {
            return Err(AnalysisError::Decode("empty audio buffer".to_string()));
        }
        check_media_type(media_type)?;

        let mut format = open_format(bytes, media_type)?;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AnalysisError::Decode("no audio tracks found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| AnalysisError::Decode(format!("unsupported codec: {}", e)))?;

        let mut mono = Vec::new();
        let mut packet_errors = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) => {
                    // Corrupt packets are skipped, not fatal
                    packet_errors += 1;
                    debug!("Skipping undecodable packet: {}", msg);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count();
            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            mono.extend(mix_to_mono(sample_buf.samples(), channels));
        }

        if mono.is_empty() {
            return Err(AnalysisError::Decode(format!(
                "no samples decoded ({} packet errors)",
                packet_errors
            )));
        }

        let sample = self.finish_sample(mono, codec_params.sample_rate);

        info!(
            "Decoded {} mono samples at {} Hz ({:.2}s)",
            sample.samples().len(),
            sample.sample_rate(),
            sample.duration_secs()
        );

        Ok(sample)
    }

    /// Wrap decoded mono samples, substituting the assumed rate and default
    /// duration when the container reported no usable sample rate
    fn finish_sample(&self, mono: Vec<f32>, sample_rate: Option<u32>) -> AudioSample {
        match sample_rate {
            Some(rate) if rate > 0 => AudioSample::new(mono, rate),
            _ => {
                let err = AnalysisError::MetadataUnavailable("codec parameters carry no sample rate".to_string());
                warn!(
                    "{}; assuming {} Hz and {:.1}s duration",
                    err, self.assumed_sample_rate, self.default_duration_secs
                );
                AudioSample::with_duration(mono, self.assumed_sample_rate, self.default_duration_secs)
            }
        }
    }
}

/// Duration in seconds read from container metadata, without decoding any packets.
///
/// `None` when no container is recognised or the first audio track lacks a frame
/// count or sample rate.
pub fn container_duration(bytes: &[u8], media_type: &str) -> Option<f32> {
    if bytes.is_empty() {
        return None;
    }
    let format = open_format(bytes, media_type).ok()?;
    let params = &format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)?
        .codec_params;

    match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Some(frames as f32 / rate as f32),
        _ => None,
    }
}

fn open_format(bytes: &[u8], media_type: &str) -> Result<Box<dyn FormatReader>> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let mut hint = Hint::new();
    if is_specific_audio_type(media_type) {
        hint.mime_type(media_type);
    }
    if let Some(ext) = extension_for_media_type(media_type) {
        hint.with_extension(ext);
    }

    let detected = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AnalysisError::Decode(format!("unrecognised container: {}", e)))?;

    Ok(detected.format)
}

/// Uploads must be declared as audio; unknown or generic binary types are left to format detection
fn check_media_type(media_type: &str) -> Result<()> {
    let media_type = media_type.trim().to_ascii_lowercase();
    if media_type.is_empty() || media_type == "application/octet-stream" || media_type.starts_with("audio/") {
        Ok(())
    } else {
        Err(AnalysisError::Decode(format!("media type '{}' is not audio", media_type)))
    }
}

fn is_specific_audio_type(media_type: &str) -> bool {
    media_type.starts_with("audio/") && media_type != "audio/*"
}

/// Map a media type to the extension symphonia recognises
pub fn extension_for_media_type(media_type: &str) -> Option<&'static str> {
    let essence = media_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    match essence.as_str() {
        "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "audio/aac" => Some("m4a"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/ogg" | "audio/vorbis" => Some("ogg"),
        "audio/webm" => Some("webm"),
        _ => None,
    }
}

/// Map a file extension to the media type the decoder expects
pub fn media_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "wav" | "wave" => "audio/wav",
        "mp3" => "audio/mpeg",
        "m4a" | "mp4" | "aac" => "audio/mp4",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}
