//! The end-to-end generation pipeline.
//!
//! Ties the stages together for one request:
//! describe → normalize → submit → poll to terminal → extract asset URLs
//! → persist each asset in order → assemble the metadata record.
//!
//! Each request runs as an independent unit of work; many may run
//! concurrently without coordination since they touch disjoint jobs and
//! records. Hard failures are unknown model, validation, submission
//! failure, poll timeout, a failed or canceled job, and zero extracted
//! assets — persistence degradation is reported in the record, never as
//! an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::instrument;

use crate::catalog::ModelCatalog;
use crate::output::extract_asset_urls;
use crate::prediction::{GenerationProvider, JobStatus, wait_for_terminal};
use crate::record::GenerationRecord;
use crate::request::{GenerationRequest, normalize};
use crate::retry::{RetryPolicy, with_retry};
use crate::storage::{PersistContext, persist};
use crate::telemetry;
use crate::{MuninnError, Result};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

/// One configured generation pipeline.
///
/// Build with [`Pipeline::builder()`]; all collaborators are injected,
/// so tests swap in fakes for the provider and the stores.
pub struct Pipeline {
    provider: Arc<dyn GenerationProvider>,
    catalog: ModelCatalog,
    persist_ctx: PersistContext,
    retry: RetryPolicy,
    poll_interval: Duration,
    max_wait: Duration,
}

impl Pipeline {
    /// Start building a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Run one generation request to completion.
    #[instrument(skip(self, request), fields(model = %request.model_id))]
    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationRecord> {
        let start = Instant::now();
        let result = self.run_stages(request).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "model" => request.model_id.clone(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "model" => request.model_id.clone(),
        )
        .record(start.elapsed().as_secs_f64());
        result
    }

    async fn run_stages(&self, request: &GenerationRequest) -> Result<GenerationRecord> {
        let descriptor = self
            .catalog
            .describe(&request.model_id)
            .ok_or_else(|| MuninnError::ModelNotFound(request.model_id.clone()))?;
        let input = normalize(descriptor, request).map_err(MuninnError::Validation)?;

        let job = with_retry(&self.retry, "submit", || self.provider.submit(&input)).await?;
        let job = wait_for_terminal(
            self.provider.as_ref(),
            &job.id,
            self.poll_interval,
            self.max_wait,
            &self.retry,
        )
        .await?;

        match job.status {
            JobStatus::Succeeded => {}
            JobStatus::Failed => {
                return Err(MuninnError::JobFailed {
                    id: job.id,
                    message: job
                        .error
                        .unwrap_or_else(|| "provider reported no error detail".into()),
                });
            }
            JobStatus::Canceled => return Err(MuninnError::Canceled { id: job.id }),
            JobStatus::Starting | JobStatus::Processing => {
                unreachable!("wait_for_terminal returned a non-terminal job")
            }
        }

        let output = job.raw_output.clone().unwrap_or(Value::Null);
        let assets = extract_asset_urls(&output);
        if assets.is_empty() {
            return Err(MuninnError::NoAssets);
        }

        // Sequential within the job: records come out in normalizer order.
        let mut records = Vec::with_capacity(assets.len());
        for asset in &assets {
            records.push(persist(asset, &self.persist_ctx).await?);
        }

        Ok(GenerationRecord::assemble(descriptor, request, &job, records))
    }

    /// Advisory remote cancellation.
    ///
    /// Does not abort any in-flight [`Pipeline::run`] poll loop — callers
    /// must stop polling on their own cancellation signal.
    pub async fn cancel(&self, job_id: &str) -> Result<()> {
        self.provider.cancel(job_id).await
    }

    /// The model catalog this pipeline validates against.
    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    provider: Option<Arc<dyn GenerationProvider>>,
    catalog: Option<ModelCatalog>,
    persist_ctx: Option<PersistContext>,
    retry: Option<RetryPolicy>,
    poll_interval: Option<Duration>,
    max_wait: Option<Duration>,
}

impl PipelineBuilder {
    /// Set the generation provider (required).
    pub fn provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model catalog. Defaults to [`ModelCatalog::builtin()`].
    pub fn catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the persistence context (required).
    pub fn persist_context(mut self, ctx: PersistContext) -> Self {
        self.persist_ctx = Some(ctx);
        self
    }

    /// Set the retry policy for submit and poll calls.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Set the delay between status polls. Default: 1s.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the maximum time to wait for a terminal state. Default: 300s.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<Pipeline> {
        let provider = self
            .provider
            .ok_or_else(|| MuninnError::Configuration("no generation provider set".into()))?;
        let persist_ctx = self
            .persist_ctx
            .ok_or_else(|| MuninnError::Configuration("no persist context set".into()))?;
        Ok(Pipeline {
            provider,
            catalog: self.catalog.unwrap_or_else(ModelCatalog::builtin),
            persist_ctx,
            retry: self.retry.unwrap_or_default(),
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            max_wait: self.max_wait.unwrap_or(DEFAULT_MAX_WAIT),
        })
    }
}
