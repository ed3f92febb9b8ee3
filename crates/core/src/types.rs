use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single sampled still image, taken from the video at a known timestamp.
///
/// Produced once by the frame sampler in strictly increasing timestamp order
/// and never mutated afterwards. `path` is the stored image on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: usize,
    pub timestamp: f64,
    pub path: PathBuf,
}

/// A time-bounded unit of text, speech- or vision-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub confidence: f64,
}

/// Transcriber output. Speech backends do not always return per-segment
/// detail; when they don't, the caller gets one coarse block of text
/// instead of probing for optional fields at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutput {
    Segmented(Vec<Segment>),
    Coarse { text: String, confidence: f64 },
}

/// Span of the synthesized segment when the transcriber only produced
/// coarse text with no timing detail.
pub const COARSE_WINDOW_SECS: f64 = 10.0;

impl TranscriptOutput {
    /// Flatten into a segment sequence. Coarse text becomes a single
    /// segment spanning a fixed window from t=0; blank coarse text
    /// contributes nothing.
    pub fn into_segments(self) -> Vec<Segment> {
        match self {
            TranscriptOutput::Segmented(segments) => segments,
            TranscriptOutput::Coarse { text, confidence } => {
                if text.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![Segment {
                        start: 0.0,
                        end: COARSE_WINDOW_SECS,
                        text,
                        confidence,
                    }]
                }
            }
        }
    }
}

/// The alignment result joining one frame to one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub frame: Frame,
    pub segment: Segment,
    pub match_confidence: f64,
}

/// Counts recorded for a video that made it through the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub video_name: String,
    pub frames: usize,
    pub segments: usize,
    pub pairs: usize,
}

/// Outcome of one video run, as recorded in the batch report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Success(RunSummary),
    Error { video_name: String, message: String },
}

impl RunOutcome {
    pub fn video_name(&self) -> &str {
        match self {
            RunOutcome::Success(summary) => &summary.video_name,
            RunOutcome::Error { video_name, .. } => video_name,
        }
    }
}

/// Aggregate outcome record across all videos in one invocation.
/// Appended to as each run completes, read-only afterwards.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<RunOutcome>,
}

impl BatchReport {
    pub fn successes(&self) -> impl Iterator<Item = &RunSummary> {
        self.outcomes.iter().filter_map(|o| match o {
            RunOutcome::Success(summary) => Some(summary),
            RunOutcome::Error { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            RunOutcome::Success(_) => None,
            RunOutcome::Error {
                video_name,
                message,
            } => Some((video_name.as_str(), message.as_str())),
        })
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o, RunOutcome::Error { .. }))
    }
}
