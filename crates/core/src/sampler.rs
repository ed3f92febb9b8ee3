use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, process::Command};

use crate::{
    error::{PipelineError, Result},
    paths::{frame_file_name, video_name},
    types::Frame,
};

/// Default sampling cadence: one frame per second of video.
pub const DEFAULT_SAMPLE_RATE: f64 = 1.0;

/// Produces an ordered, timestamped frame sequence for a video, writing
/// one image file per frame into `frames_dir`.
#[async_trait]
pub trait FrameSampler {
    async fn sample(&self, video: &Path, frames_dir: &Path) -> Result<Vec<Frame>>;
}

/// Frame sampling via ffmpeg's `fps` filter.
///
/// One decode pass emits every sampled frame; each image is then renamed
/// to a deterministic name derived from the video name, frame index, and
/// timestamp. With a cadence of `rate` frames per second, frame `i` sits
/// at `i / rate` seconds.
pub struct FfmpegSampler {
    rate: f64,
}

impl FfmpegSampler {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Default for FfmpegSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

#[async_trait]
impl FrameSampler for FfmpegSampler {
    async fn sample(&self, video: &Path, frames_dir: &Path) -> Result<Vec<Frame>> {
        fs::create_dir_all(frames_dir).await?;

        // An interrupted earlier pass can leave raw images behind; a
        // shorter rerun would pick them up as phantom frames past the
        // video's end.
        clear_raw_images(frames_dir)?;

        let pattern = frames_dir.join("raw_%06d.jpg");
        let output = Command::new("ffmpeg")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(video)
            .arg("-vf")
            .arg(format!("fps={}", self.rate))
            .arg("-q:v")
            .arg("2")
            .arg("-y")
            .arg(&pattern)
            .output()
            .await
            .map_err(|e| PipelineError::SamplingFailed {
                video: video.to_path_buf(),
                reason: format!("failed to run ffmpeg: {e}"),
            })?;

        if !output.status.success() {
            return Err(PipelineError::SamplingFailed {
                video: video.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let name = video_name(video);
        let raw_images = raw_images(frames_dir)?;

        let mut frames = Vec::with_capacity(raw_images.len());
        for (index, raw_path) in raw_images.into_iter().enumerate() {
            let timestamp = index as f64 / self.rate;
            let final_path = frames_dir.join(frame_file_name(&name, index, timestamp));
            fs::rename(&raw_path, &final_path).await?;
            frames.push(Frame {
                index,
                timestamp,
                path: final_path,
            });
        }

        Ok(frames)
    }
}

/// The raw ffmpeg output images in a frames directory, in frame order.
/// Zero-padded ffmpeg numbering, so lexical order is frame order.
fn raw_images(frames_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut raw: Vec<PathBuf> = std::fs::read_dir(frames_dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|f| f.to_string_lossy().starts_with("raw_"))
                .unwrap_or(false)
        })
        .collect();
    raw.sort();
    Ok(raw)
}

/// Delete any raw images left over from a previous pass.
fn clear_raw_images(frames_dir: &Path) -> std::io::Result<()> {
    for path in raw_images(frames_dir)? {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"jpg").unwrap();
    }

    #[test]
    fn stale_raw_images_are_cleared_renamed_frames_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("raw_000001.jpg"));
        touch(&dir.path().join("raw_000005.jpg"));
        touch(&dir.path().join("talk_frame_000000_0.00s.jpg"));

        clear_raw_images(dir.path()).unwrap();

        assert!(raw_images(dir.path()).unwrap().is_empty());
        assert!(dir.path().join("talk_frame_000000_0.00s.jpg").exists());
    }

    #[test]
    fn raw_images_come_back_in_frame_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("raw_000010.jpg"));
        touch(&dir.path().join("raw_000002.jpg"));
        touch(&dir.path().join("raw_000001.jpg"));

        let names: Vec<String> = raw_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["raw_000001.jpg", "raw_000002.jpg", "raw_000010.jpg"]);
    }
}
