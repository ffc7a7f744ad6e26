//! Metadata record assembly for the external relational sink.
//!
//! The pipeline's sole obligation toward the sink is a flat record built
//! from the persisted assets plus generation metadata. The sink's schema
//! is out of scope; this is the hand-off shape.

use std::time::{Duration, SystemTime};

use serde_json::Value;

use crate::catalog::ModelDescriptor;
use crate::prediction::PredictionJob;
use crate::request::GenerationRequest;
use crate::storage::AssetRecord;

/// Flat metadata record for one completed generation.
#[derive(Debug, Clone)]
pub struct GenerationRecord {
    pub model_id: String,
    pub prompt: String,
    pub assets: Vec<AssetRecord>,
    /// Estimated cost in the provider's currency unit.
    pub cost_estimate: f64,
    /// Wall-clock time the remote job took.
    pub generation_duration: Duration,
    pub created_at: SystemTime,
}

impl GenerationRecord {
    /// Assemble a record from the pipeline's outputs.
    ///
    /// Per-second pricing is charged on produced media length, so the
    /// requested `duration` parameter (not the job's wall-clock time) feeds
    /// the cost estimate. When the caller omitted it, the model's declared
    /// default is what the provider generates and what gets charged.
    pub fn assemble(
        descriptor: &ModelDescriptor,
        request: &GenerationRequest,
        job: &PredictionJob,
        assets: Vec<AssetRecord>,
    ) -> Self {
        let media_seconds = request
            .raw_params
            .get("duration")
            .and_then(Value::as_f64)
            .or_else(|| {
                descriptor
                    .parameter_spec("duration")
                    .and_then(|spec| spec.default.as_ref())
                    .and_then(Value::as_f64)
            })
            .unwrap_or(0.0);
        let cost_estimate = descriptor.estimate_cost(assets.len(), media_seconds);
        Self {
            model_id: descriptor.id.clone(),
            prompt: request.prompt().unwrap_or_default().to_string(),
            assets,
            cost_estimate,
            generation_duration: job.duration().unwrap_or_default(),
            created_at: SystemTime::now(),
        }
    }

    /// Whether every asset was durably stored.
    pub fn fully_persistent(&self) -> bool {
        self.assets.iter().all(|a| a.persistent)
    }
}
