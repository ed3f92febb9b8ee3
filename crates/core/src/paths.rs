use std::path::{Path, PathBuf};

/// Directory holding the sampled images for one video.
pub fn frames_dir(output_root: &Path, video_name: &str) -> PathBuf {
    output_root.join("frames").join(video_name)
}

/// Deterministic image file name for a sampled frame.
pub fn frame_file_name(video_name: &str, index: usize, timestamp: f64) -> String {
    format!("{}_frame_{:06}_{:.2}s.jpg", video_name, index, timestamp)
}

/// Path for the persisted frame records of a video.
pub fn frames_json_path(output_root: &Path, video_name: &str) -> PathBuf {
    output_root
        .join("frames")
        .join(format!("{}_frames.json", video_name))
}

/// Path for the persisted segment records of a video.
pub fn transcript_json_path(output_root: &Path, video_name: &str) -> PathBuf {
    output_root
        .join("transcript")
        .join(format!("{}_transcript.json", video_name))
}

/// Path for the persisted matched-pair records of a video.
pub fn matched_json_path(output_root: &Path, video_name: &str) -> PathBuf {
    output_root
        .join("matched")
        .join(format!("{}_matched.json", video_name))
}

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("framealign")
}

pub fn get_model_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("models")
}

/// Stable video identity: the file stem.
pub fn video_name(video: &Path) -> String {
    video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}

/// Whether a path looks like a video container we can process.
pub fn is_video_file(path: &Path) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = ext.to_string_lossy().to_lowercase();
    matches!(ext.as_str(), "mp4" | "webm" | "mkv" | "mov" | "avi")
}

/// Collect the video files in a directory, sorted by name so batches
/// run in a stable order.
pub fn find_videos(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut videos: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_video_file(path))
        .collect();
    videos.sort();
    Ok(videos)
}
