//! Request normalization: generic requests to provider-specific payloads.
//!
//! A [`GenerationRequest`] names a catalog model and carries mode-agnostic
//! options. [`normalize`] merges those options over the model's declared
//! defaults, validates the result against the schema, and translates
//! accepted keys through the per-model quirk tables into the payload shape
//! the remote provider expects.
//!
//! Normalization is deterministic and side-effect free: the same
//! `(descriptor, request)` pair always yields the same payload or the same
//! error set.

pub mod quirks;

use std::fmt;

use serde_json::{Map, Value};

use crate::catalog::{ModelDescriptor, ParameterKind, ParameterSpec};

/// A mode-agnostic generation request, created by the caller.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Catalog model id.
    pub model_id: String,
    /// Caller-supplied parameters, keyed by external name.
    pub raw_params: Map<String, Value>,
    /// Source URLs for image-conditioned models.
    pub image_inputs: Vec<String>,
}

impl GenerationRequest {
    /// Create a request for the given model.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Self::default()
        }
    }

    /// Set a parameter by external name.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.raw_params.insert(name.into(), value.into());
        self
    }

    /// Append an image input URL.
    pub fn image_input(mut self, url: impl Into<String>) -> Self {
        self.image_inputs.push(url.into());
        self
    }

    /// The prompt parameter, when present.
    pub fn prompt(&self) -> Option<&str> {
        self.raw_params.get("prompt").and_then(Value::as_str)
    }
}

/// A single schema violation found during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// External name of the offending parameter.
    pub param: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.param, self.reason)
    }
}

/// Fully-shaped payload ready for submission to the generation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderInput {
    /// Opaque model handle the provider understands.
    pub provider_ref: String,
    /// Provider-keyed input fields.
    pub payload: Map<String, Value>,
}

impl ProviderInput {
    /// The payload as a JSON value.
    pub fn to_json(&self) -> Value {
        Value::Object(self.payload.clone())
    }
}

/// Normalize a request against a model descriptor.
///
/// Merges `request.raw_params` over declared defaults (request wins),
/// validates every key (type, range, enum membership, required presence,
/// model-specific prohibitions), then renames accepted keys through
/// [`quirks::for_model`]. Fails fast with the complete error set — no
/// partial payload is ever produced.
pub fn normalize(
    descriptor: &ModelDescriptor,
    request: &GenerationRequest,
) -> Result<ProviderInput, Vec<ValidationError>> {
    let quirks = quirks::for_model(&descriptor.id);
    let mut errors = Vec::new();

    // Defaults first, request values on top. Forbidden parameters never
    // default in, so they only appear when the caller sent them.
    let mut merged: Map<String, Value> = Map::new();
    for spec in &descriptor.parameters {
        if quirks.forbids(&spec.name) {
            continue;
        }
        if let Some(default) = &spec.default {
            merged.insert(spec.name.clone(), default.clone());
        }
    }
    for (name, value) in &request.raw_params {
        merged.insert(name.clone(), value.clone());
    }

    for (name, value) in &merged {
        let Some(spec) = descriptor.parameter_spec(name) else {
            errors.push(ValidationError::new(name, "unknown parameter"));
            continue;
        };
        if quirks.forbids(name) {
            errors.push(ValidationError::new(
                name,
                format!("not supported by model '{}'", descriptor.id),
            ));
            continue;
        }
        if let Some(reason) = check_value(spec, value, &quirks) {
            errors.push(ValidationError::new(name, reason));
        }
    }

    for spec in &descriptor.parameters {
        if spec.required && !merged.contains_key(&spec.name) {
            errors.push(ValidationError::new(
                &spec.name,
                "required parameter is missing",
            ));
        }
    }

    check_image_inputs(descriptor, request, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut payload = Map::new();
    for (name, value) in merged {
        payload.insert(quirks.provider_name(&name).to_string(), value);
    }
    if !request.image_inputs.is_empty() {
        let value = if request.image_inputs.len() == 1 {
            Value::String(request.image_inputs[0].clone())
        } else {
            Value::Array(
                request
                    .image_inputs
                    .iter()
                    .map(|u| Value::String(u.clone()))
                    .collect(),
            )
        };
        payload.insert(quirks.image_field.to_string(), value);
    }

    Ok(ProviderInput {
        provider_ref: descriptor.provider_ref.clone(),
        payload,
    })
}

/// Validate a single value against its spec. Returns the failure reason.
fn check_value(spec: &ParameterSpec, value: &Value, quirks: &quirks::ModelQuirks) -> Option<String> {
    match spec.kind {
        ParameterKind::Number => {
            if !value.is_number() {
                return Some("expected a number".into());
            }
            check_range(spec, value.as_f64()?, quirks)
        }
        ParameterKind::Integer => {
            if !value.is_i64() && !value.is_u64() {
                return Some("expected an integer".into());
            }
            check_range(spec, value.as_f64()?, quirks)
        }
        ParameterKind::String => {
            if !value.is_string() {
                return Some("expected a string".into());
            }
            None
        }
        ParameterKind::Boolean => {
            if !value.is_boolean() {
                return Some("expected a boolean".into());
            }
            None
        }
        ParameterKind::Enum => {
            let Some(s) = value.as_str() else {
                return Some("expected a string".into());
            };
            if spec.options.iter().any(|o| o == s) {
                None
            } else {
                Some(format!("must be one of: {}", spec.options.join(", ")))
            }
        }
    }
}

/// Range check using the quirk override when one is declared.
fn check_range(spec: &ParameterSpec, value: f64, quirks: &quirks::ModelQuirks) -> Option<String> {
    let (min, max) = match quirks.clamp_for(&spec.name) {
        Some((min, max)) => (Some(min), Some(max)),
        None => (spec.min, spec.max),
    };
    if let Some(min) = min
        && value < min
    {
        return Some(format!("must be at least {min}"));
    }
    if let Some(max) = max
        && value > max
    {
        return Some(format!("must be at most {max}"));
    }
    None
}

fn check_image_inputs(
    descriptor: &ModelDescriptor,
    request: &GenerationRequest,
    errors: &mut Vec<ValidationError>,
) {
    if request.image_inputs.is_empty() {
        return;
    }
    if !descriptor.supports_image_input {
        errors.push(ValidationError::new(
            "image_inputs",
            format!("model '{}' does not accept image inputs", descriptor.id),
        ));
    } else if request.image_inputs.len() > descriptor.max_image_inputs as usize {
        errors.push(ValidationError::new(
            "image_inputs",
            format!("at most {} image inputs allowed", descriptor.max_image_inputs),
        ));
    }
}
