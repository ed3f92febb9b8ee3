use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{
    error::{PipelineError, Result},
    paths::{frames_json_path, matched_json_path, transcript_json_path},
    types::{Frame, MatchedPair, Segment},
};

/// Persists the three record sets of a completed video run, keyed by
/// video name.
#[async_trait]
pub trait ResultStore {
    async fn persist(
        &self,
        video_name: &str,
        frames: &[Frame],
        segments: &[Segment],
        pairs: &[MatchedPair],
    ) -> Result<()>;
}

/// JSON files under an output root: `frames/<name>_frames.json`,
/// `transcript/<name>_transcript.json`, `matched/<name>_matched.json`.
///
/// Each file is written to a `.tmp` sibling and renamed into place, so a
/// reader never observes a partial write.
pub struct JsonResultStore {
    root: PathBuf,
}

impl JsonResultStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write_records<T: serde::Serialize>(
        &self,
        video_name: &str,
        path: &Path,
        records: &[T],
    ) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        write_atomic(path, json.as_bytes())
            .await
            .map_err(|e| PipelineError::PersistenceFailed {
                video_name: video_name.to_string(),
                reason: format!("{}: {e}", path.display()),
            })
    }
}

#[async_trait]
impl ResultStore for JsonResultStore {
    async fn persist(
        &self,
        video_name: &str,
        frames: &[Frame],
        segments: &[Segment],
        pairs: &[MatchedPair],
    ) -> Result<()> {
        self.write_records(video_name, &frames_json_path(&self.root, video_name), frames)
            .await?;
        self.write_records(
            video_name,
            &transcript_json_path(&self.root, video_name),
            segments,
        )
        .await?;
        self.write_records(video_name, &matched_json_path(&self.root, video_name), pairs)
            .await?;
        Ok(())
    }
}

/// Write via a temp sibling and rename; the rename is atomic on the
/// destination filesystem.
async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await
}
