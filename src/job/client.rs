//! HTTP implementation of [`JobService`].

use crate::config::ClientConfig;
use crate::error::{api_error, JobClientError, Result};
use crate::job::service::JobService;
use crate::job::types::{
    DownloadedVideo, JobCompletion, JobStatusReport, JobSubmission, SubmittedJob,
};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const SUBMIT_FAILED: &str = "job submission failed";
const STATUS_FAILED: &str = "status query failed";
const WAIT_FAILED: &str = "wait for completion failed";
const HEALTH_FAILED: &str = "health check failed";
const DOWNLOAD_FAILED: &str = "video download failed";

/// Builder for [`JobClient`].
#[derive(Debug, Clone, Default)]
pub struct JobClientBuilder {
    base_url: Option<String>,
    config: Option<ClientConfig>,
    http_client: Option<reqwest::Client>,
}

impl JobClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the configuration in the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new().config(ClientConfig::from_env()?))
    }

    /// Sets the service base URL (e.g. `http://localhost:8000/api`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Uses an already validated configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses a preconfigured HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the client. An explicit base URL wins over a config.
    pub fn build(self) -> Result<JobClient> {
        let config = match (self.base_url, self.config) {
            (Some(url), _) => ClientConfig::new(&url)?,
            (None, Some(config)) => config,
            (None, None) => ClientConfig::default(),
        };

        Ok(JobClient {
            client: self.http_client.unwrap_or_default(),
            config,
        })
    }
}

/// Client for the sequence video generation service.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct JobClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl JobClient {
    /// Creates a new `JobClientBuilder`.
    pub fn builder() -> JobClientBuilder {
        JobClientBuilder::new()
    }

    /// Creates a client for the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &Url {
        self.config.base_url()
    }

    /// Downloads a result video.
    ///
    /// Relative URLs such as `/uploads/abc123.mp4` are resolved against the
    /// base URL's origin.
    pub async fn download_video(&self, video_url: &str) -> Result<DownloadedVideo> {
        let url = self.resolve(video_url)?;
        tracing::debug!(%url, "downloading video");

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, DOWNLOAD_FAILED).await);
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("video/mp4")
            .to_string();
        let data = response.bytes().await?.to_vec();

        Ok(DownloadedVideo {
            data,
            mime_type,
            source_url: url.to_string(),
        })
    }

    /// Appends path segments to the base URL, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url().clone();
        url.path_segments_mut()
            .map_err(|()| JobClientError::Config("base URL cannot carry paths".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn resolve(&self, reference: &str) -> Result<Url> {
        self.config.base_url().join(reference).map_err(|e| {
            JobClientError::InvalidRequest(format!("invalid video URL {reference:?}: {e}"))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, default_error: &str) -> Result<T> {
        tracing::debug!(%url, "sending request");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "received response");
        if !status.is_success() {
            return Err(api_error(response, default_error).await);
        }

        Ok(response.json().await?)
    }
}

fn check_job_id(job_id: &str) -> Result<()> {
    if job_id.trim().is_empty() {
        return Err(JobClientError::InvalidRequest("job id is empty".into()));
    }
    Ok(())
}

#[async_trait]
impl JobService for JobClient {
    async fn submit_job(&self, submission: &JobSubmission) -> Result<SubmittedJob> {
        submission.validate()?;

        let mut form = reqwest::multipart::Form::new();
        for image in &submission.images {
            let part = reqwest::multipart::Part::bytes(image.data.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)
                .map_err(|e| JobClientError::InvalidRequest(e.to_string()))?;
            form = form.part("files", part);
        }
        if let Some(prompt) = submission.prompt() {
            form = form.text("prompt", prompt.to_string());
        }

        let url = self.endpoint(&["v1", "generate-sequence"])?;
        tracing::debug!(
            %url,
            images = submission.images.len(),
            has_prompt = submission.prompt().is_some(),
            "submitting job"
        );

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(response, SUBMIT_FAILED).await);
        }

        let job: SubmittedJob = response.json().await?;
        tracing::debug!(job_id = %job.job_id, status = %job.status, "job submitted");
        Ok(job)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport> {
        check_job_id(job_id)?;
        let url = self.endpoint(&["v1", "status", job_id])?;
        self.get_json(url, STATUS_FAILED).await
    }

    async fn wait_for_completion(&self, job_id: &str) -> Result<JobCompletion> {
        check_job_id(job_id)?;
        let url = self.endpoint(&["v1", "wait", job_id])?;
        tracing::debug!(job_id = %job_id, "waiting for job completion");
        self.get_json(url, WAIT_FAILED).await
    }

    async fn health_check(&self) -> Result<()> {
        let url = self.resolve("/health")?;
        let health: HealthResponse = self.get_json(url, HEALTH_FAILED).await?;

        if health.status == "healthy" {
            Ok(())
        } else {
            Err(JobClientError::Api {
                status: 503,
                message: format!("service reported status {:?}", health.status),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> JobClient {
        JobClient::builder().base_url(base).build().unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let client = JobClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api");
    }

    #[test]
    fn test_builder_explicit_url_wins_over_config() {
        let config = ClientConfig::new("http://10.0.0.1:8000/api").unwrap();
        let client = JobClient::builder()
            .config(config.clone())
            .base_url("http://127.0.0.1:3000/api")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:3000/api");

        let client = JobClient::builder().config(config).build().unwrap();
        assert_eq!(client.base_url().as_str(), "http://10.0.0.1:8000/api");
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let result = JobClient::builder().base_url("/api").build();
        assert!(matches!(result, Err(JobClientError::Config(_))));
    }

    #[test]
    fn test_endpoint_paths() {
        let client = client("http://localhost:8000/api");
        assert_eq!(
            client.endpoint(&["v1", "generate-sequence"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/generate-sequence"
        );

        let trailing = self::client("http://localhost:8000/api/");
        assert_eq!(
            trailing.endpoint(&["v1", "status", "abc123"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/status/abc123"
        );
    }

    #[test]
    fn test_endpoint_encodes_job_id() {
        let client = client("http://localhost:8000/api");
        assert_eq!(
            client.endpoint(&["v1", "wait", "a/b c"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/wait/a%2Fb%20c"
        );
    }

    #[test]
    fn test_resolve_video_urls() {
        let client = client("http://localhost:8000/api");
        assert_eq!(
            client.resolve("/uploads/abc123.mp4").unwrap().as_str(),
            "http://localhost:8000/uploads/abc123.mp4"
        );
        assert_eq!(
            client
                .resolve("https://cdn.example.com/v/abc123.mp4")
                .unwrap()
                .as_str(),
            "https://cdn.example.com/v/abc123.mp4"
        );
        assert_eq!(
            client.resolve("/health").unwrap().as_str(),
            "http://localhost:8000/health"
        );
    }

    #[tokio::test]
    async fn test_empty_job_id_rejected() {
        let client = client("http://localhost:8000/api");
        assert!(matches!(
            client.job_status("").await,
            Err(JobClientError::InvalidRequest(_))
        ));
        assert!(matches!(
            client.wait_for_completion("  ").await,
            Err(JobClientError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_image_count_without_network() {
        // Port 9 (discard) is never contacted: validation fails first.
        let client = client("http://127.0.0.1:9/api");
        let submission = JobSubmission::new(vec![crate::job::types::ImageUpload::new(
            vec![0xFF, 0xD8, 0xFF],
            "only.jpg",
        )]);
        assert!(matches!(
            client.submit_job(&submission).await,
            Err(JobClientError::InvalidRequest(_))
        ));
    }
}
