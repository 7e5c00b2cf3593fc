//! Video generation jobs.

mod client;
mod service;
mod types;

pub use client::{JobClient, JobClientBuilder};
pub use service::{JobService, JobServiceExt};
pub use types::{
    DownloadedVideo, ImageFormat, ImageUpload, JobCompletion, JobState, JobStatus,
    JobStatusReport, JobSubmission, SubmittedJob, MAX_IMAGES, MIN_IMAGES,
};
