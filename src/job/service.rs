//! Job service trait and caller-side utilities.

use crate::error::{JobClientError, Result};
use crate::job::types::{JobCompletion, JobStatusReport, JobSubmission, SubmittedJob};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Operations offered by a video generation job service.
#[async_trait]
pub trait JobService: Send + Sync {
    /// Submits an image sequence for video generation.
    async fn submit_job(&self, submission: &JobSubmission) -> Result<SubmittedJob>;

    /// Queries the current status of a job once.
    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport>;

    /// Asks the service to answer only once the job is terminal.
    async fn wait_for_completion(&self, job_id: &str) -> Result<JobCompletion>;

    /// Checks that the service is up.
    async fn health_check(&self) -> Result<()>;
}

/// Polling helpers built on [`JobService::job_status`].
#[async_trait]
pub trait JobServiceExt: JobService {
    /// Queries the job every `interval` until it is terminal.
    ///
    /// Query errors are returned as-is; nothing is retried.
    async fn poll_until_terminal(
        &self,
        job_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<JobStatusReport> {
        let start = Instant::now();

        loop {
            let report = self.job_status(job_id).await?;
            if report.is_terminal() {
                return Ok(report);
            }

            if start.elapsed().saturating_add(interval) > timeout {
                return Err(JobClientError::Timeout(timeout));
            }

            tracing::debug!(
                job_id = %job_id,
                status = %report.status,
                elapsed_secs = start.elapsed().as_secs(),
                "job still running"
            );
            tokio::time::sleep(interval).await;
        }
    }
}

impl<T: JobService> JobServiceExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::types::JobStatus;
    use std::sync::Mutex;

    /// Replays a fixed list of statuses, repeating the last one.
    struct ScriptedService {
        statuses: Mutex<Vec<&'static str>>,
        calls: Mutex<u32>,
    }

    impl ScriptedService {
        fn new(statuses: &[&'static str]) -> Self {
            let mut statuses = statuses.to_vec();
            statuses.reverse();
            Self {
                statuses: Mutex::new(statuses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl JobService for ScriptedService {
        async fn submit_job(&self, _submission: &JobSubmission) -> Result<SubmittedJob> {
            Err(JobClientError::InvalidRequest("not scripted".into()))
        }

        async fn job_status(&self, job_id: &str) -> Result<JobStatusReport> {
            *self.calls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.pop().unwrap()
            } else {
                statuses[0]
            };
            if status == "error" {
                return Err(JobClientError::Api {
                    status: 404,
                    message: "task not found".into(),
                });
            }
            Ok(JobStatusReport {
                job_id: job_id.to_string(),
                status: JobStatus::new(status),
                message: None,
                video_url: None,
                extra: Default::default(),
            })
        }

        async fn wait_for_completion(&self, job_id: &str) -> Result<JobCompletion> {
            self.job_status(job_id).await
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_poll_returns_first_terminal_report() {
        let service = ScriptedService::new(&["PENDING", "RUNNING", "SUCCEEDED", "RUNNING"]);
        let report = service
            .poll_until_terminal("abc123", Duration::from_millis(1), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(report.status.as_str(), "SUCCEEDED");
        assert_eq!(service.calls(), 3);
    }

    #[tokio::test]
    async fn test_poll_times_out() {
        let service = ScriptedService::new(&["RUNNING"]);
        let err = service
            .poll_until_terminal(
                "abc123",
                Duration::from_millis(10),
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, JobClientError::Timeout(t) if t == Duration::from_millis(50)));
        assert!(service.calls() >= 1);
    }

    #[tokio::test]
    async fn test_poll_huge_interval_times_out_without_overflow() {
        let service = ScriptedService::new(&["RUNNING"]);
        let err = service
            .poll_until_terminal("abc123", Duration::MAX, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, JobClientError::Timeout(_)));
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_poll_does_not_retry_errors() {
        let service = ScriptedService::new(&["error", "SUCCEEDED"]);
        let err = service
            .poll_until_terminal("abc123", Duration::from_millis(1), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "task not found");
        assert_eq!(service.calls(), 1);
    }
}
