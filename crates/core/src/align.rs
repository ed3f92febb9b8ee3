use crate::{
    error::{PipelineError, Result},
    types::{Frame, MatchedPair, Segment},
};

/// Map every frame to exactly one transcript segment.
///
/// Per frame at timestamp `t`, in frame order:
/// 1. The first segment in scan order with `start <= t <= end` wins.
///    First match, not best match: with overlapping segments the
///    earliest-listed containing one is chosen, not the tightest.
/// 2. Otherwise the segment whose nearest boundary is closest to `t`
///    (distance to `start` or `end`, whichever is smaller); ties go to
///    the earliest-listed segment.
///
/// `match_confidence` records which branch fired: 1.0 for containment,
/// 0.0 for the nearest-boundary fallback.
pub fn match_frames(frames: &[Frame], segments: &[Segment]) -> Result<Vec<MatchedPair>> {
    if segments.is_empty() {
        return Err(PipelineError::EmptySegmentSet);
    }

    let mut matched = Vec::with_capacity(frames.len());
    for frame in frames {
        let t = frame.timestamp;

        let containing = segments.iter().find(|s| s.start <= t && t <= s.end);

        let (segment, confidence) = match containing {
            Some(segment) => (segment, 1.0),
            None => (nearest_segment(segments, t), 0.0),
        };

        matched.push(MatchedPair {
            frame: frame.clone(),
            segment: segment.clone(),
            match_confidence: confidence,
        });
    }

    Ok(matched)
}

/// Segment with the smallest distance from `t` to either boundary.
/// Strict `<` keeps the earliest-listed segment on ties.
fn nearest_segment(segments: &[Segment], t: f64) -> &Segment {
    let mut best = &segments[0];
    let mut best_distance = boundary_distance(best, t);
    for segment in &segments[1..] {
        let distance = boundary_distance(segment, t);
        if distance < best_distance {
            best = segment;
            best_distance = distance;
        }
    }
    best
}

fn boundary_distance(segment: &Segment, t: f64) -> f64 {
    let to_start = (segment.start - t).abs();
    let to_end = (segment.end - t).abs();
    to_start.min(to_end)
}
