use std::path::{Path, PathBuf};

use crate::{
    align::match_frames,
    error::Result,
    fallback::apply_fallback,
    ocr::FrameTextExtractor,
    paths::{frames_dir, video_name},
    sampler::FrameSampler,
    store::ResultStore,
    transcriber::Transcriber,
    types::{BatchReport, RunOutcome, RunSummary},
};

/// Sequences one video through sampling, transcription, the OCR fallback
/// check, alignment, and persistence. Holds no algorithmic logic of its
/// own; each step is delegated to the owned collaborator.
pub struct Pipeline<S, T, X, R> {
    sampler: S,
    transcriber: T,
    extractor: X,
    store: R,
    output_root: PathBuf,
}

impl<S, T, X, R> Pipeline<S, T, X, R>
where
    S: FrameSampler,
    T: Transcriber,
    X: FrameTextExtractor,
    R: ResultStore,
{
    pub fn new(sampler: S, transcriber: T, extractor: X, store: R, output_root: PathBuf) -> Self {
        Self {
            sampler,
            transcriber,
            extractor,
            store,
            output_root,
        }
    }

    /// Run the full pipeline for one video. Any step error aborts this
    /// run and propagates to the caller.
    pub async fn run_video(&self, video: &Path) -> Result<RunSummary> {
        let name = video_name(video);

        let frames = self
            .sampler
            .sample(video, &frames_dir(&self.output_root, &name))
            .await?;

        let transcript = self.transcriber.transcribe(video).await?;
        let segments = transcript.into_segments();

        let segments = apply_fallback(segments, &frames, &self.extractor).await;

        let pairs = match_frames(&frames, &segments)?;

        self.store.persist(&name, &frames, &segments, &pairs).await?;

        Ok(RunSummary {
            video_name: name,
            frames: frames.len(),
            segments: segments.len(),
            pairs: pairs.len(),
        })
    }

    /// Run a batch of videos, one at a time. A failure inside one run is
    /// recorded against that video and never aborts the rest; the report
    /// always carries one outcome per input video. `on_outcome` fires as
    /// each video completes.
    pub async fn run_batch<F>(&self, videos: &[PathBuf], mut on_outcome: F) -> BatchReport
    where
        F: FnMut(&RunOutcome),
    {
        let mut report = BatchReport::default();
        for video in videos {
            let outcome = match self.run_video(video).await {
                Ok(summary) => RunOutcome::Success(summary),
                Err(e) => RunOutcome::Error {
                    video_name: video_name(video),
                    message: e.to_string(),
                },
            };
            on_outcome(&outcome);
            report.outcomes.push(outcome);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::PipelineError,
        ocr::OcrOutcome,
        types::{Frame, MatchedPair, Segment, TranscriptOutput},
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn frame(index: usize, timestamp: f64) -> Frame {
        Frame {
            index,
            timestamp,
            path: PathBuf::from(format!("frame_{index}.jpg")),
        }
    }

    fn segment(start: f64, end: f64, text: &str) -> Segment {
        Segment {
            start,
            end,
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    /// Emits a fixed number of frames at 1 fps, regardless of the video.
    struct FixedSampler {
        count: usize,
    }

    #[async_trait]
    impl FrameSampler for FixedSampler {
        async fn sample(&self, _video: &Path, _frames_dir: &Path) -> Result<Vec<Frame>> {
            Ok((0..self.count).map(|i| frame(i, i as f64)).collect())
        }
    }

    /// Scripted per-video transcripts; videos named in `failing` error out.
    struct ScriptedTranscriber {
        outputs: HashMap<String, TranscriptOutput>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl Transcriber for ScriptedTranscriber {
        async fn transcribe(&self, video: &Path) -> Result<TranscriptOutput> {
            let name = video_name(video);
            if self.failing.contains(&name) {
                return Err(PipelineError::TranscriptionFailed {
                    video: video.to_path_buf(),
                    reason: "audio stream unreadable".to_string(),
                });
            }
            Ok(self
                .outputs
                .get(&name)
                .cloned()
                .unwrap_or(TranscriptOutput::Segmented(vec![
                    segment(0.0, 1.5, "one"),
                    segment(1.5, 3.0, "two"),
                ])))
        }
    }

    struct NoTextExtractor;

    #[async_trait]
    impl FrameTextExtractor for NoTextExtractor {
        async fn extract(&self, _frame: &Frame) -> OcrOutcome {
            OcrOutcome::Empty
        }
    }

    /// Captures persisted records as serialized JSON, keyed by video name.
    #[derive(Default)]
    struct RecordingStore {
        persisted: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl ResultStore for RecordingStore {
        async fn persist(
            &self,
            video_name: &str,
            frames: &[Frame],
            segments: &[Segment],
            pairs: &[MatchedPair],
        ) -> Result<()> {
            let blob = serde_json::to_string(&(frames, segments, pairs))?;
            self.persisted
                .lock()
                .unwrap()
                .insert(video_name.to_string(), blob);
            Ok(())
        }
    }

    fn pipeline(
        frames: usize,
        failing: Vec<&str>,
    ) -> Pipeline<FixedSampler, ScriptedTranscriber, NoTextExtractor, RecordingStore> {
        Pipeline::new(
            FixedSampler { count: frames },
            ScriptedTranscriber {
                outputs: HashMap::new(),
                failing: failing.into_iter().map(String::from).collect(),
            },
            NoTextExtractor,
            RecordingStore::default(),
            PathBuf::from("output"),
        )
    }

    #[tokio::test]
    async fn successful_run_reports_counts_and_persists() {
        let p = pipeline(3, vec![]);
        let summary = p.run_video(Path::new("videos/talk.mp4")).await.unwrap();

        assert_eq!(summary.video_name, "talk");
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.segments, 2);
        assert_eq!(summary.pairs, 3);
        assert!(p.store.persisted.lock().unwrap().contains_key("talk"));
    }

    #[tokio::test]
    async fn every_frame_ends_up_in_exactly_one_pair() {
        let p = pipeline(5, vec![]);
        let summary = p.run_video(Path::new("clip.mp4")).await.unwrap();
        assert_eq!(summary.pairs, summary.frames);

        let persisted = p.store.persisted.lock().unwrap();
        let (frames, _segments, pairs): (Vec<Frame>, Vec<Segment>, Vec<MatchedPair>) =
            serde_json::from_str(persisted.get("clip").unwrap()).unwrap();
        let paired: Vec<&Frame> = pairs.iter().map(|p| &p.frame).collect();
        assert_eq!(paired.len(), frames.len());
        for (frame, paired_frame) in frames.iter().zip(paired) {
            assert_eq!(frame, paired_frame);
        }
    }

    #[tokio::test]
    async fn batch_isolates_a_failing_video() {
        let p = pipeline(2, vec!["second"]);
        let videos = vec![
            PathBuf::from("first.mp4"),
            PathBuf::from("second.mp4"),
            PathBuf::from("third.mp4"),
        ];

        let report = p.run_batch(&videos, |_| {}).await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.successes().count(), 2);
        assert_eq!(report.failures().count(), 1);
        assert!(report.has_failures());

        let (failed_name, message) = report.failures().next().unwrap();
        assert_eq!(failed_name, "second");
        assert!(message.contains("Transcription failed"));

        // The surrounding runs persisted full results.
        let persisted = p.store.persisted.lock().unwrap();
        for name in ["first", "third"] {
            let (frames, _, pairs): (Vec<Frame>, Vec<Segment>, Vec<MatchedPair>) =
                serde_json::from_str(persisted.get(name).unwrap()).unwrap();
            assert_eq!(frames.len(), 2);
            assert_eq!(pairs.len(), 2);
        }
        assert!(!persisted.contains_key("second"));
    }

    #[tokio::test]
    async fn batch_outcomes_preserve_input_order() {
        let p = pipeline(1, vec!["b"]);
        let videos = vec![
            PathBuf::from("a.mp4"),
            PathBuf::from("b.mp4"),
            PathBuf::from("c.mp4"),
        ];
        let mut seen = Vec::new();
        let report = p
            .run_batch(&videos, |outcome| seen.push(outcome.video_name().to_string()))
            .await;

        assert_eq!(seen, vec!["a", "b", "c"]);
        let names: Vec<&str> = report.outcomes.iter().map(|o| o.video_name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn rerun_with_deterministic_collaborators_is_idempotent() {
        let p = pipeline(4, vec![]);
        p.run_video(Path::new("talk.mp4")).await.unwrap();
        let first = p.store.persisted.lock().unwrap().get("talk").unwrap().clone();

        p.run_video(Path::new("talk.mp4")).await.unwrap();
        let second = p.store.persisted.lock().unwrap().get("talk").unwrap().clone();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn coarse_transcript_still_produces_aligned_output() {
        let mut outputs = HashMap::new();
        outputs.insert(
            "talk".to_string(),
            TranscriptOutput::Coarse {
                text: "one long undivided transcript".to_string(),
                confidence: 0.4,
            },
        );
        let p = Pipeline::new(
            FixedSampler { count: 3 },
            ScriptedTranscriber {
                outputs,
                failing: vec![],
            },
            NoTextExtractor,
            RecordingStore::default(),
            PathBuf::from("output"),
        );

        let summary = p.run_video(Path::new("talk.mp4")).await.unwrap();
        // One coarse segment, still one pair per frame.
        assert_eq!(summary.segments, 1);
        assert_eq!(summary.pairs, 3);
    }
}
