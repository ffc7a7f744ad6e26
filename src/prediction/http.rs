//! HTTP client for a Replicate-style prediction API.
//!
//! Endpoints:
//! - `POST {base}/v1/predictions` — submit
//! - `GET  {base}/v1/predictions/{id}` — poll
//! - `POST {base}/v1/predictions/{id}/cancel` — cancel
//!
//! 4xx responses are input/configuration errors and never retried; 5xx
//! and transport failures classify as transient and go through the shared
//! retry executor at the call sites.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenerationProvider, JobStatus, PredictionJob};
use crate::request::ProviderInput;
use crate::{MuninnError, Result};

const DEFAULT_BASE_URL: &str = "https://api.replicate.com";

/// Client for an asynchronous prediction-style generation API.
#[derive(Clone)]
pub struct HttpGenerationProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl HttpGenerationProvider {
    /// Create a provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a provider with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into(),
        }
    }

    async fn read_job(&self, response: reqwest::Response) -> Result<PredictionJob> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MuninnError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let wire: PredictionWire = response
            .json()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;
        Ok(wire.into_job())
    }
}

#[async_trait]
impl GenerationProvider for HttpGenerationProvider {
    fn name(&self) -> &str {
        "http-prediction"
    }

    async fn submit(&self, input: &ProviderInput) -> Result<PredictionJob> {
        let url = format!("{}/v1/predictions", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&SubmitRequest {
                version: &input.provider_ref,
                input: input.to_json(),
            })
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;
        self.read_job(response).await
    }

    async fn poll(&self, job_id: &str) -> Result<PredictionJob> {
        let url = format!("{}/v1/predictions/{}", self.base_url, job_id);
        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;
        self.read_job(response).await
    }

    async fn cancel(&self, job_id: &str) -> Result<()> {
        let url = format!("{}/v1/predictions/{}/cancel", self.base_url, job_id);
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;
        // Advisory only: a 4xx here means the job is already terminal or
        // unknown, which is a successful no-op from the caller's view.
        let status = response.status();
        if status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(MuninnError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    version: &'a str,
    input: Value,
}

/// Wire shape of a prediction resource.
#[derive(Deserialize)]
struct PredictionWire {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl PredictionWire {
    fn into_job(self) -> PredictionJob {
        let status = match self.status.as_str() {
            "starting" => JobStatus::Starting,
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            "canceled" => JobStatus::Canceled,
            // "processing" and anything the provider adds later
            _ => JobStatus::Processing,
        };
        // The provider's own timestamps span the real generation time;
        // local clocks only fill in when the wire omits them.
        let created_at = self
            .created_at
            .map(SystemTime::from)
            .unwrap_or_else(SystemTime::now);
        let completed_at = self
            .completed_at
            .map(SystemTime::from)
            .or_else(|| status.is_terminal().then(SystemTime::now));
        PredictionJob {
            id: self.id,
            status,
            raw_output: self.output,
            error: self.error,
            created_at,
            completed_at,
        }
    }
}
