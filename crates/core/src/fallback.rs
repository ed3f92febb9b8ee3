use crate::{
    ocr::{FrameTextExtractor, OcrOutcome},
    types::{Frame, Segment},
};

/// Confidence assigned to vision-derived segments. Kept below what the
/// live transcriber reports so downstream consumers can rank them apart.
pub const OCR_CONFIDENCE: f64 = 0.8;

/// How long an on-screen text is assumed to stay readable.
pub const OCR_DWELL_SECS: f64 = 1.0;

/// OCR results at or under this trimmed length are noise, not captions.
pub const MIN_OCR_TEXT_LEN: usize = 3;

/// Placeholder segment text when neither speech nor OCR produced anything.
pub const PLACEHOLDER_TEXT: &str = "(no speech or on-screen text detected)";

/// Decide whether the speech-derived segments are usable and, if not,
/// sweep the sampled frames through OCR.
///
/// The trigger is structural: a transcript of at most one segment is
/// treated as "transcription failed or fell back to a single coarse
/// block". Text content and confidence scores are not inspected.
///
/// OCR-derived segments are appended after the speech-derived ones, which
/// are returned unmodified. The returned sequence is never empty: if both
/// signals came up dry, one placeholder segment spanning the sampled range
/// is synthesized so alignment always has something to match against.
pub async fn apply_fallback<X>(
    segments: Vec<Segment>,
    frames: &[Frame],
    extractor: &X,
) -> Vec<Segment>
where
    X: FrameTextExtractor,
{
    let mut segments = segments;

    if segments.len() <= 1 {
        for frame in frames {
            match extractor.extract(frame).await {
                OcrOutcome::Text(text) => {
                    let text = text.trim();
                    if text.chars().count() > MIN_OCR_TEXT_LEN {
                        segments.push(Segment {
                            start: frame.timestamp,
                            end: frame.timestamp + OCR_DWELL_SECS,
                            text: text.to_string(),
                            confidence: OCR_CONFIDENCE,
                        });
                    }
                }
                // A failed extraction and a textless frame contribute the
                // same thing: nothing.
                OcrOutcome::Empty | OcrOutcome::Failed => {}
            }
        }
    }

    if segments.is_empty() {
        segments.push(placeholder_segment(frames));
    }

    segments
}

fn placeholder_segment(frames: &[Frame]) -> Segment {
    let end = frames
        .last()
        .map(|f| f.timestamp + OCR_DWELL_SECS)
        .unwrap_or(1.0);
    Segment {
        start: 0.0,
        end,
        text: PLACEHOLDER_TEXT.to_string(),
        confidence: 0.0,
    }
}
