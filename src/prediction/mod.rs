//! Prediction orchestration: submit, poll, and wait for remote jobs.
//!
//! The remote generation provider tracks each generation as a prediction
//! job with an opaque id and a five-state lifecycle:
//!
//! ```text
//! starting -> processing -> { succeeded | failed | canceled }
//! ```
//!
//! [`PredictionJob`] snapshots are only ever produced by provider reads;
//! nothing else mutates them. [`wait_for_terminal`] owns the poll loop and
//! deliberately leaves the remote job running on timeout — a caller that
//! wants provider-side work stopped must call `cancel` itself.

mod http;

pub use http::HttpGenerationProvider;

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::request::ProviderInput;
use crate::retry::{RetryPolicy, with_retry};
use crate::{MuninnError, Result};

/// Lifecycle state of a remote prediction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl JobStatus {
    /// Whether the state machine has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// Snapshot of a remote prediction job.
///
/// Created at submission, refreshed by polling reads, and never mutated
/// by any other component. Terminal once `status.is_terminal()`.
#[derive(Debug, Clone)]
pub struct PredictionJob {
    /// Opaque provider-assigned id.
    pub id: String,
    pub status: JobStatus,
    /// Provider output in whatever shape the model family produces.
    pub raw_output: Option<Value>,
    /// Provider-reported failure text.
    pub error: Option<String>,
    pub created_at: SystemTime,
    pub completed_at: Option<SystemTime>,
}

impl PredictionJob {
    /// Wall-clock generation duration, when the job has completed.
    pub fn duration(&self) -> Option<Duration> {
        self.completed_at
            .and_then(|done| done.duration_since(self.created_at).ok())
    }
}

/// External asynchronous generation service.
///
/// Implementations self-report transport failures as [`MuninnError`]
/// values; retry policy is applied by the callers, not here.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Submit a shaped payload. Returns the job in `Starting` state.
    async fn submit(&self, input: &ProviderInput) -> Result<PredictionJob>;

    /// Read the current job snapshot. One external call.
    async fn poll(&self, job_id: &str) -> Result<PredictionJob>;

    /// Best-effort remote cancellation. No-op if already terminal.
    async fn cancel(&self, job_id: &str) -> Result<()>;
}

/// Poll until the job reaches a terminal state or `max_wait` elapses.
///
/// Each poll call runs under the shared retry policy; retry exhaustion
/// surfaces to the caller, who decides whether to keep polling or abort.
/// The full `max_wait` budget is spent before giving up: when less than a
/// full interval remains, the loop sleeps the remainder and polls one
/// final time at the deadline. On timeout this returns
/// [`MuninnError::Timeout`] and leaves the remote job running — late
/// results are discarded, not reconciled.
pub async fn wait_for_terminal(
    provider: &dyn GenerationProvider,
    job_id: &str,
    poll_interval: Duration,
    max_wait: Duration,
    retry: &RetryPolicy,
) -> Result<PredictionJob> {
    let started = Instant::now();
    loop {
        let job = with_retry(retry, "poll", || provider.poll(job_id)).await?;
        debug!(
            job_id,
            status = ?job.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "polled prediction"
        );
        if job.status.is_terminal() {
            return Ok(job);
        }
        let elapsed = started.elapsed();
        if elapsed >= max_wait {
            return Err(MuninnError::Timeout { waited: elapsed });
        }
        tokio::time::sleep(poll_interval.min(max_wait - elapsed)).await;
    }
}
