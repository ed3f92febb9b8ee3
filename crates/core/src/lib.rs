//! framealign core library
//!
//! Samples timestamped frames from a video, transcribes its speech, falls
//! back to per-frame OCR when transcription is sparse, and aligns every
//! frame with a transcript segment. Results are persisted as JSON record
//! sets keyed by video name.

pub mod align;
pub mod error;
pub mod fallback;
pub mod format;
pub mod ocr;
pub mod paths;
pub mod pipeline;
pub mod sampler;
pub mod store;
pub mod transcriber;
pub mod types;

// Re-export commonly used items at crate root
pub use align::match_frames;
pub use error::{PipelineError, Result};
pub use fallback::apply_fallback;
pub use format::format_batch_summary;
pub use ocr::{FrameTextExtractor, OcrOutcome, TesseractExtractor};
pub use paths::{find_videos, get_root_cache_dir, is_video_file, video_name};
pub use pipeline::Pipeline;
pub use sampler::{DEFAULT_SAMPLE_RATE, FfmpegSampler, FrameSampler};
pub use store::{JsonResultStore, ResultStore};
pub use transcriber::{MODEL_NAME, Transcriber, WhisperTranscriber, ensure_model};
pub use types::{BatchReport, Frame, MatchedPair, RunOutcome, RunSummary, Segment, TranscriptOutput};
