use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::types::Frame;

/// Result of running OCR over one frame image.
///
/// Extraction failures are a per-frame matter: one unreadable image must
/// not affect the others, so the extractor reports them as a variant
/// instead of an error the caller could accidentally propagate.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrOutcome {
    /// Whitespace-trimmed text found on the frame.
    Text(String),
    /// The engine ran but found nothing.
    Empty,
    /// The engine could not process this frame.
    Failed,
}

/// Best-effort text extraction from a stored frame image.
#[async_trait]
pub trait FrameTextExtractor {
    async fn extract(&self, frame: &Frame) -> OcrOutcome;
}

/// OCR via the `tesseract` command-line tool.
///
/// `--psm 6` assumes a uniform block of text, which suits slides and
/// overlaid captions better than the default page segmentation.
pub struct TesseractExtractor;

impl TesseractExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameTextExtractor for TesseractExtractor {
    async fn extract(&self, frame: &Frame) -> OcrOutcome {
        extract_with_tesseract(&frame.path).await
    }
}

async fn extract_with_tesseract(image: &Path) -> OcrOutcome {
    let output = Command::new("tesseract")
        .arg(image)
        .arg("stdout")
        .arg("--psm")
        .arg("6")
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(_) => return OcrOutcome::Failed,
    };

    if !output.status.success() {
        return OcrOutcome::Failed;
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() {
        OcrOutcome::Empty
    } else {
        OcrOutcome::Text(text)
    }
}
