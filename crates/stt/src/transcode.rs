//! Audio transcoding to 16kHz mono PCM
//!
//! Two backends: symphonia decodes entirely in memory; ffmpeg shells out
//! through per-request temporary files that are removed when dropped.

use readscore_common::AppConfig;
use std::io::{Cursor, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, error, info, warn};

use crate::audio::PcmAudio;

/// Source sample rates accepted from a container header
pub const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 8_000..=192_000;

/// Longest accepted recording; synchronous recognition stops at one minute
pub const MAX_DURATION_SECS: u32 = 60;

/// Transcoding failure
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    /// Bytes are not a decodable audio container
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// The transcoder itself could not run (missing binary, crashed)
    #[error("transcoder failed: {0}")]
    Backend(String),

    #[error("transcoder IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts arbitrary container audio into mono 16kHz PCM
///
/// Implementations block (CPU work or a subprocess); callers on an async
/// runtime should run them on a blocking thread.
pub trait AudioTranscoder: Send + Sync {
    /// Short backend name, reported by the health endpoint
    fn name(&self) -> &'static str;

    fn transcode(&self, data: Vec<u8>) -> Result<PcmAudio, TranscodeError>;
}

/// Build the transcoder selected by `TRANSCODER`
pub fn transcoder_from_config(config: &AppConfig) -> Arc<dyn AudioTranscoder> {
    match config.transcoder.as_str() {
        "ffmpeg" => Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone())),
        _ => Arc::new(SymphoniaTranscoder),
    }
}

/// In-memory transcoder backed by symphonia
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaTranscoder;

impl AudioTranscoder for SymphoniaTranscoder {
    fn name(&self) -> &'static str {
        "symphonia"
    }

    fn transcode(&self, data: Vec<u8>) -> Result<PcmAudio, TranscodeError> {
        let decoded = decode_container(data, None)?;
        Ok(decoded.into_recognizer_format())
    }
}

/// Decode a container, turning a decoder panic into a format error
///
/// symphonia asserts on some header fields (a zero sample rate panics in
/// the probe), and those bytes come straight from the client.
fn decode_container(data: Vec<u8>, extension: Option<&str>) -> Result<PcmAudio, TranscodeError> {
    panic::catch_unwind(AssertUnwindSafe(move || decode_track(data, extension))).unwrap_or_else(
        |payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(reason = %reason, "Audio decoder panicked");
            Err(TranscodeError::UnsupportedFormat(
                "malformed audio header".to_string(),
            ))
        },
    )
}

/// Decode the default track of an audio container into mono f32
fn decode_track(data: Vec<u8>, extension: Option<&str>) -> Result<PcmAudio, TranscodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| TranscodeError::UnsupportedFormat(format!("probe: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| TranscodeError::UnsupportedFormat("no audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| TranscodeError::UnsupportedFormat("unknown sample rate".to_string()))?;
    if !SAMPLE_RATE_RANGE.contains(&sample_rate) {
        return Err(TranscodeError::UnsupportedFormat(format!(
            "sample rate {} Hz outside {}-{} Hz",
            sample_rate,
            SAMPLE_RATE_RANGE.start(),
            SAMPLE_RATE_RANGE.end()
        )));
    }
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);
    let max_frames = sample_rate as usize * MAX_DURATION_SECS as usize;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| TranscodeError::UnsupportedFormat(format!("codec: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(TranscodeError::UnsupportedFormat(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(TranscodeError::UnsupportedFormat(format!("decode: {}", e)));
            }
        };

        if decoded.frames() == 0 {
            continue;
        }

        let spec = *decoded.spec();
        let packet_channels = spec.channels.count().max(1);
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        // Downmix as we go so only mono frames are held
        samples.extend(
            sample_buf
                .samples()
                .chunks_exact(packet_channels)
                .map(|frame| frame.iter().sum::<f32>() / packet_channels as f32),
        );

        if samples.len() > max_frames {
            return Err(TranscodeError::UnsupportedFormat(format!(
                "audio longer than {} seconds",
                MAX_DURATION_SECS
            )));
        }
    }

    if samples.is_empty() {
        return Err(TranscodeError::UnsupportedFormat(
            "no audio samples decoded".to_string(),
        ));
    }

    debug!(
        samples = samples.len(),
        sample_rate,
        channels,
        "Decoded audio container"
    );

    Ok(PcmAudio::new(samples, sample_rate, 1))
}

/// Transcoder that runs the ffmpeg binary
///
/// Input and output go through `tempfile` files unique to the call, so
/// concurrent requests never share an intermediate artifact.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

impl AudioTranscoder for FfmpegTranscoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn transcode(&self, data: Vec<u8>) -> Result<PcmAudio, TranscodeError> {
        let mut input = tempfile::Builder::new().prefix("readscore-in-").tempfile()?;
        input.write_all(&data)?;
        input.flush()?;

        let output = tempfile::Builder::new()
            .prefix("readscore-out-")
            .suffix(".wav")
            .tempfile()?;

        info!(
            "Converting {} bytes to 16kHz mono WAV using FFmpeg",
            data.len()
        );

        let result = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error", "-i"])
            .arg(input.path())
            .args([
                "-ar", "16000",      // 16kHz sample rate
                "-ac", "1",          // Mono
                "-c:a", "pcm_s16le", // 16-bit PCM
                "-f", "wav",
                "-y",                // Overwrite the empty tempfile
            ])
            .arg(output.path())
            .output()
            .map_err(|e| {
                TranscodeError::Backend(format!(
                    "Failed to run {}: {}",
                    self.ffmpeg_path.display(),
                    e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            warn!(status = %result.status, stderr = %stderr.trim(), "FFmpeg conversion failed");
            return Err(TranscodeError::UnsupportedFormat(ffmpeg_failure(
                &stderr,
                input.path(),
            )));
        }

        let wav = std::fs::read(output.path())?;
        let decoded = decode_container(wav, Some("wav"))?;

        Ok(decoded.into_recognizer_format())
    }
}

/// Last stderr line of a failed ffmpeg run, without the server's temp path
fn ffmpeg_failure(stderr: &str, input: &Path) -> String {
    let line = stderr
        .lines()
        .map(str::trim)
        .rev()
        .find(|l| !l.is_empty())
        .unwrap_or("ffmpeg could not decode the input");

    line.replace(&input.display().to_string(), "input")
}
