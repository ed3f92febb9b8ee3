use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, process::Command};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::{
    error::{PipelineError, Result},
    paths::get_model_dir,
    types::{Segment, TranscriptOutput},
};

pub const MODEL_NAME: &str = "ggml-base.en-q5_1.bin";

/// Confidence assigned to live speech segments. The whisper-rs segment
/// iterator does not expose avg token log-probability, so a fixed value
/// above the OCR confidence stands in for it.
pub const WHISPER_CONFIDENCE: f64 = 0.9;

/// Produces timestamped text segments for the speech in a video.
#[async_trait]
pub trait Transcriber {
    async fn transcribe(&self, video: &Path) -> Result<TranscriptOutput>;
}

/// Download the whisper model into the cache directory if missing.
pub async fn ensure_model(cache_dir: &Path) -> Result<PathBuf> {
    let download_url = format!(
        "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/{}",
        MODEL_NAME
    );
    let model_dir = get_model_dir(cache_dir);

    if !model_dir.exists() {
        fs::create_dir_all(&model_dir).await?;
    }

    let model_path = model_dir.join(MODEL_NAME);
    if !model_path.exists() {
        let output = Command::new("curl")
            .arg("-L")
            .arg(&download_url)
            .arg("-o")
            .arg(&model_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(PipelineError::ModelDownloadFailed {
                url: download_url,
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
    }

    Ok(model_path)
}

/// Speech transcription with whisper.cpp via whisper-rs.
///
/// The audio track is extracted to a scoped temporary WAV (16 kHz mono,
/// what whisper expects) which is removed on every exit path, including
/// when extraction or inference fails.
pub struct WhisperTranscriber {
    model_path: PathBuf,
}

impl WhisperTranscriber {
    pub fn new(model_path: PathBuf) -> Self {
        Self { model_path }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, video: &Path) -> Result<TranscriptOutput> {
        let audio = tempfile::Builder::new()
            .prefix("framealign-audio-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| transcription_error(video, format!("temp audio file: {e}")))?;

        extract_audio(video, audio.path()).await?;
        let samples = read_samples(video, audio.path())?;

        run_whisper(video, &self.model_path, &samples)
    }
}

/// Extract the audio track with ffmpeg, resampled for whisper.
async fn extract_audio(video: &Path, audio_path: &Path) -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(video)
        .arg("-ar")
        .arg("16000")
        .arg("-ac")
        .arg("1")
        .arg(audio_path)
        .output()
        .await
        .map_err(|e| transcription_error(video, format!("failed to run ffmpeg: {e}")))?;

    if !output.status.success() {
        return Err(transcription_error(
            video,
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    Ok(())
}

fn read_samples(video: &Path, audio_path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(audio_path)
        .map_err(|e| transcription_error(video, format!("failed to read audio: {e}")))?;
    reader
        .samples::<i16>()
        .map(|s| {
            s.map(|v| v as f32 / i16::MAX as f32)
                .map_err(|e| transcription_error(video, format!("bad audio sample: {e}")))
        })
        .collect()
}

fn run_whisper(video: &Path, model_path: &Path, samples: &[f32]) -> Result<TranscriptOutput> {
    let model_path_str = model_path.to_string_lossy();
    let ctx_params = WhisperContextParameters {
        use_gpu: true,
        flash_attn: true,
        ..Default::default()
    };
    let ctx = WhisperContext::new_with_params(&model_path_str, ctx_params)
        .map_err(|e| transcription_error(video, format!("failed to load model: {e}")))?;

    let params = FullParams::new(SamplingStrategy::Greedy { best_of: 5 });

    let mut state = ctx
        .create_state()
        .map_err(|e| transcription_error(video, format!("failed to create state: {e}")))?;
    state
        .full(params, samples)
        .map_err(|e| transcription_error(video, format!("failed to run model: {e}")))?;

    let mut text = String::new();
    let mut segments: Vec<Segment> = Vec::new();

    for segment in state.as_iter() {
        let seg_text = match segment.to_str() {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(seg) = whisper_segment(
            segment.start_timestamp(),
            segment.end_timestamp(),
            seg_text,
        ) {
            segments.push(seg);
            text.push_str(seg_text);
        }
    }

    if segments.is_empty() {
        // No per-segment detail; hand back whatever text there was as one
        // coarse block and let the caller synthesize timing.
        Ok(TranscriptOutput::Coarse {
            text,
            confidence: 0.0,
        })
    } else {
        Ok(TranscriptOutput::Segmented(segments))
    }
}

/// Build a segment from whisper's centisecond timestamps and raw text.
/// Blank text yields no segment: segment text is non-empty by contract.
fn whisper_segment(start_cs: i64, end_cs: i64, seg_text: &str) -> Option<Segment> {
    if seg_text.trim().is_empty() {
        return None;
    }
    Some(Segment {
        start: start_cs as f64 / 100.0,
        end: end_cs as f64 / 100.0,
        text: seg_text.to_string(),
        confidence: WHISPER_CONFIDENCE,
    })
}

fn transcription_error(video: &Path, reason: String) -> PipelineError {
    PipelineError::TranscriptionFailed {
        video: video.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_whisper_text_yields_no_segment() {
        assert_eq!(whisper_segment(0, 150, ""), None);
        assert_eq!(whisper_segment(0, 150, "  \n"), None);
    }

    #[test]
    fn whisper_timestamps_convert_from_centiseconds() {
        let seg = whisper_segment(150, 420, " hello there").unwrap();
        assert_eq!(seg.start, 1.5);
        assert_eq!(seg.end, 4.2);
        assert_eq!(seg.text, " hello there");
        assert_eq!(seg.confidence, WHISPER_CONFIDENCE);
    }
}

