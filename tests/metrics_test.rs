//! Metrics integration tests.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use muninn::telemetry;
use muninn::{
    GenerationProvider, GenerationRequest, JobStatus, MuninnError, ObjectStore, PersistContext,
    Pipeline, PredictionJob, ProviderInput, Result, RetryPolicy, StoredObject, TrustedDomains,
    UploadMetadata, with_fallback, with_retry,
};

// ============================================================================
// Fakes
// ============================================================================

struct FailingProvider;

#[async_trait]
impl GenerationProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn submit(&self, _input: &ProviderInput) -> Result<PredictionJob> {
        Ok(PredictionJob {
            id: "job-1".into(),
            status: JobStatus::Failed,
            raw_output: None,
            error: Some("boom".into()),
            created_at: SystemTime::now(),
            completed_at: Some(SystemTime::now()),
        })
    }

    async fn poll(&self, _job_id: &str) -> Result<PredictionJob> {
        self.submit(&ProviderInput {
            provider_ref: String::new(),
            payload: serde_json::Map::new(),
        })
        .await
    }

    async fn cancel(&self, _job_id: &str) -> Result<()> {
        Ok(())
    }
}

struct NullStore;

#[async_trait]
impl ObjectStore for NullStore {
    fn name(&self) -> &str {
        "null"
    }

    async fn upload(&self, _bytes: &[u8], metadata: &UploadMetadata) -> Result<StoredObject> {
        Ok(StoredObject {
            url: format!("https://null.store/{}", metadata.file_name),
            id: "null-obj".into(),
        })
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Ok(())
    }
}

fn failing_pipeline() -> Pipeline {
    let ctx = PersistContext::new(
        Arc::new(NullStore),
        Arc::new(NullStore),
        TrustedDomains::new(["127.0.0.1"]),
    );
    Pipeline::builder()
        .provider(Arc::new(FailingProvider))
        .persist_context(ctx)
        .poll_interval(Duration::from_millis(1))
        .build()
        .unwrap()
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn pipeline_run_records_request_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                failing_pipeline()
                    .run(&GenerationRequest::new("fast-image").param("prompt", "a cat"))
                    .await
            })
        })
    });
    assert!(matches!(result, Err(MuninnError::JobFailed { .. })));

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_total(&snapshot, telemetry::REQUESTS_TOTAL),
        1,
        "expected 1 request counter"
    );
    assert!(
        has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn retries_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let policy = RetryPolicy::new()
        .max_attempts(3)
        .base_delay(Duration::from_millis(1));
    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                with_retry(&policy, "test-op", || async {
                    Err::<(), _>(MuninnError::Http("connection refused".into()))
                })
                .await
            })
        })
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::RETRIES_TOTAL), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn fallbacks_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                with_fallback(
                    || async { Err::<&str, _>(MuninnError::Http("refused".into())) },
                    || async { Ok("fallback") },
                    "test-op",
                )
                .await
            })
        })
    });
    assert_eq!(result.unwrap(), "fallback");

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::FALLBACKS_TOTAL), 1);
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let result = failing_pipeline()
        .run(&GenerationRequest::new("fast-image").param("prompt", "a cat"))
        .await;
    assert!(result.is_err());
}
