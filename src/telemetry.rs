//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation` — pipeline stage (e.g. "submit", "poll", "upload")
//! - `model` — catalog model id
//! - `provider` — storage provider name, or "none"
//! - `status` — outcome: "ok" or "error"

/// Total generation requests run through the pipeline.
///
/// Labels: `model`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "muninn_requests_total";

/// End-to-end pipeline duration in seconds.
///
/// Labels: `model`.
pub const REQUEST_DURATION_SECONDS: &str = "muninn_request_duration_seconds";

/// Total retryable failures seen by the retry executor.
///
/// Labels: `operation`.
pub const RETRIES_TOTAL: &str = "muninn_retries_total";

/// Total primary-to-fallback switches.
///
/// Labels: `operation`.
pub const FALLBACKS_TOTAL: &str = "muninn_fallbacks_total";

/// Total bytes downloaded from generation providers.
pub const DOWNLOADED_BYTES_TOTAL: &str = "muninn_downloaded_bytes_total";

/// Total bytes persisted to object storage.
///
/// Labels: `provider`.
pub const PERSISTED_BYTES_TOTAL: &str = "muninn_persisted_bytes_total";
