#![warn(missing_docs)]
//! seqvid - client for a keyframe-sequence video generation service.
//!
//! The service turns 2 to 6 ordered images into one video. This crate wraps
//! its three job endpoints (submit, status, wait) and normalizes failures into
//! a single error type carrying the service's `detail` message.
//!
//! # Quick Start
//!
//! ```no_run
//! use seqvid::{ImageUpload, JobClient, JobService, JobSubmission};
//!
//! #[tokio::main]
//! async fn main() -> seqvid::Result<()> {
//!     let client = JobClient::builder()
//!         .base_url("http://localhost:8000/api")
//!         .build()?;
//!
//!     let submission = JobSubmission::new(vec![
//!         ImageUpload::from_path("first.jpg")?,
//!         ImageUpload::from_path("last.jpg")?,
//!     ])
//!     .with_prompt("a cat running");
//!
//!     let job = client.submit_job(&submission).await?;
//!     let done = client.wait_for_completion(&job.job_id).await?;
//!
//!     if let Some(url) = done.video_url() {
//!         client.download_video(url).await?.save("cat.mp4")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Polling
//!
//! [`JobService::job_status`] is a single query. For a client-side loop use
//! [`JobServiceExt::poll_until_terminal`]:
//!
//! ```no_run
//! use seqvid::{JobClientBuilder, JobServiceExt};
//! use std::time::Duration;
//!
//! # async fn example() -> seqvid::Result<()> {
//! let client = JobClientBuilder::from_env()?.build()?;
//! let report = client
//!     .poll_until_terminal("abc123", Duration::from_secs(5), Duration::from_secs(600))
//!     .await?;
//! println!("{}: {}", report.job_id, report.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `seqvid` command-line tool

mod config;
mod error;
pub mod job;

// Re-export error types at crate root
pub use error::{JobClientError, Result};

pub use config::{ClientConfig, BASE_URL_ENV, DEFAULT_BASE_URL};

pub use job::{
    DownloadedVideo, ImageFormat, ImageUpload, JobClient, JobClientBuilder, JobCompletion,
    JobService, JobServiceExt, JobState, JobStatus, JobStatusReport, JobSubmission, SubmittedJob,
    MAX_IMAGES, MIN_IMAGES,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{JobClientError, Result};
    pub use crate::job::{
        ImageUpload, JobClient, JobService, JobServiceExt, JobStatusReport, JobSubmission,
        SubmittedJob,
    };
}
