//! Request and response shapes exchanged with the generation service.

use crate::error::{JobClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fewest images a submission may carry.
pub const MIN_IMAGES: usize = 2;
/// Most images a submission may carry.
pub const MAX_IMAGES: usize = 6;

/// Image formats the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// GIF format.
    Gif,
    /// Windows bitmap.
    Bmp,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        // BMP last: "BM" is a weak signature.
        if data.len() >= 14 && data.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        None
    }
}

/// One image attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Raw image bytes, sent as-is.
    pub data: Vec<u8>,
    /// File name reported in the multipart part.
    pub file_name: String,
    /// MIME type reported in the multipart part.
    pub mime_type: String,
}

impl ImageUpload {
    /// Creates an upload, guessing the MIME type from the bytes, then the
    /// file name's extension.
    pub fn new(data: Vec<u8>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let mime_type = ImageFormat::from_magic_bytes(&data)
            .or_else(|| {
                Path::new(&file_name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(ImageFormat::from_extension)
            })
            .map(|f| f.mime_type())
            .unwrap_or("application/octet-stream")
            .to_string();

        Self {
            data,
            file_name,
            mime_type,
        }
    }

    /// Reads an image from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        Ok(Self::new(data, file_name))
    }

    /// Overrides the detected MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A request to turn an ordered image sequence into one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    /// Keyframes in playback order.
    pub images: Vec<ImageUpload>,
    /// Optional text prompt. Empty prompts are not sent.
    pub prompt: Option<String>,
}

impl JobSubmission {
    /// Creates a submission from images in playback order.
    pub fn new(images: Vec<ImageUpload>) -> Self {
        Self {
            images,
            prompt: None,
        }
    }

    /// Sets the text prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Returns the prompt if it should be sent.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }

    /// Checks the image count against the accepted range.
    pub fn validate(&self) -> Result<()> {
        let count = self.images.len();
        if !(MIN_IMAGES..=MAX_IMAGES).contains(&count) {
            return Err(JobClientError::InvalidRequest(format!(
                "expected {MIN_IMAGES} to {MAX_IMAGES} images, got {count}"
            )));
        }
        Ok(())
    }
}

/// Coarse classification of a job status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Accepted, not started.
    Pending,
    /// Being generated.
    Processing,
    /// Finished with a video.
    Done,
    /// Finished without a video.
    Failed,
    /// Not a status this client recognizes.
    Unknown,
}

impl JobState {
    /// Returns true for states after which the job no longer changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Job status exactly as the service reported it.
///
/// The raw string is kept so a parsed response serializes back unchanged;
/// [`JobStatus::state`] gives the classified view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobStatus(String);

impl JobStatus {
    /// Wraps a raw status string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw status string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the status, ignoring case.
    pub fn state(&self) -> JobState {
        match self.0.to_ascii_lowercase().as_str() {
            "pending" | "submitted" | "queued" => JobState::Pending,
            "processing" | "running" => JobState::Processing,
            "done" | "succeeded" | "success" | "completed" => JobState::Done,
            "failed" | "canceled" | "cancelled" | "error" => JobState::Failed,
            _ => JobState::Unknown,
        }
    }

    /// Returns true if the job will not change any more.
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response to a job submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedJob {
    /// Identifier used for later status queries.
    #[serde(rename = "task_id")]
    pub job_id: String,
    /// Status at submission time.
    pub status: JobStatus,
    /// Human-readable note from the service.
    ///
    /// The outer `Option` is `None` when the key was absent and the inner one
    /// when it was `null`; see [`SubmittedJob::message`].
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub message: Option<Option<String>>,
    /// Set when the service already produced the merged video.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub merged_video_url: Option<Option<String>>,
    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SubmittedJob {
    /// Returns the service's note, if it sent a non-null one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref()?.as_deref()
    }

    /// Returns the merged video URL, if it sent a non-null one.
    pub fn merged_video_url(&self) -> Option<&str> {
        self.merged_video_url.as_ref()?.as_deref()
    }
}

/// Point-in-time view of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusReport {
    /// Job identifier.
    #[serde(rename = "task_id")]
    pub job_id: String,
    /// Current status.
    #[serde(rename = "task_status")]
    pub status: JobStatus,
    /// Human-readable note from the service.
    ///
    /// Absent keys and `null` values are kept apart so the report
    /// serializes back exactly as received; see [`JobStatusReport::message`].
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub message: Option<Option<String>>,
    /// Location of the finished video, once there is one.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub video_url: Option<Option<String>>,
    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl JobStatusReport {
    /// Returns the classified status.
    pub fn state(&self) -> JobState {
        self.status.state()
    }

    /// Returns true if the job will not change any more.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the service's note, if it sent a non-null one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref()?.as_deref()
    }

    /// Returns the finished video's URL, if it sent a non-null one.
    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_ref()?.as_deref()
    }
}

/// Result of waiting for a job; the service blocks until it is terminal.
pub type JobCompletion = JobStatusReport;

/// A downloaded result video.
#[derive(Debug, Clone)]
#[must_use = "downloaded video should be saved or processed"]
pub struct DownloadedVideo {
    /// Raw video bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g., "video/mp4").
    pub mime_type: String,
    /// URL the video was fetched from.
    pub source_url: String,
}

impl DownloadedVideo {
    /// Returns the size of the video data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the video to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}
