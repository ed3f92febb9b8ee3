use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Frame sampling failed for {video}: {reason}")]
    SamplingFailed { video: PathBuf, reason: String },

    #[error("Transcription failed for {video}: {reason}")]
    TranscriptionFailed { video: PathBuf, reason: String },

    #[error("no segments available for alignment")]
    EmptySegmentSet,

    #[error("Failed to persist results for {video_name}: {reason}")]
    PersistenceFailed { video_name: String, reason: String },

    #[error("Model download failed from {url}: {reason}")]
    ModelDownloadFailed { url: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
