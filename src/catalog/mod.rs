//! Model catalog: per-model parameter schemas and descriptors.
//!
//! The catalog is the static source of truth for which generation models
//! exist, which parameters each accepts (with types, ranges, and enum
//! options), and how each model is priced. Descriptors are built once at
//! process start and never mutated; lookup is a pure operation.
//!
//! Parameters carry a disclosure tier (basic/intermediate/advanced) as
//! metadata for consumers that progressively reveal controls. The pipeline
//! itself only uses tiers for validation completeness, never for behaviour.

mod builtin;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value type of a model parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Number,
    Integer,
    String,
    Boolean,
    /// String constrained to a fixed option set.
    Enum,
}

/// UI-disclosure tier for a parameter.
///
/// Purely metadata — the pipeline validates all tiers identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterTier {
    #[default]
    Basic,
    Intermediate,
    Advanced,
}

/// Schema for a single model parameter.
///
/// Built with the kind-specific constructors and chained setters:
///
/// ```rust
/// use muninn::catalog::{ParameterSpec, ParameterTier};
///
/// let spec = ParameterSpec::number("guidance")
///     .range(0.0, 10.0)
///     .default_value(3.0)
///     .tier(ParameterTier::Intermediate);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// External (caller-facing) parameter name.
    pub name: String,
    pub kind: ParameterKind,
    /// Default applied when the caller omits the parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Minimum allowed value (inclusive), numeric kinds only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum allowed value (inclusive), numeric kinds only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Step hint for numeric sliders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Legal values for `Enum` parameters.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
    /// Whether the parameter must be present after defaulting.
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub tier: ParameterTier,
}

impl ParameterSpec {
    fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            min: None,
            max: None,
            step: None,
            options: Vec::new(),
            required: false,
            tier: ParameterTier::default(),
        }
    }

    /// A floating-point parameter.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Number)
    }

    /// An integer parameter.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Integer)
    }

    /// A free-form string parameter.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::String)
    }

    /// A boolean parameter.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Boolean)
    }

    /// A string parameter constrained to `options`.
    pub fn enumeration<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = Self::new(name, ParameterKind::Enum);
        spec.options = options.into_iter().map(Into::into).collect();
        spec
    }

    /// Set the default value.
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the inclusive `[min, max]` range.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Set the step hint.
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the disclosure tier.
    pub fn tier(mut self, tier: ParameterTier) -> Self {
        self.tier = tier;
        self
    }
}

/// Category of media a model produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Image,
    Video,
    Upscale,
}

/// Pricing model for cost estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pricing {
    /// Flat price per produced asset (images, upscales).
    PerAsset(f64),
    /// Price per second of produced media (video).
    PerSecond(f64),
}

impl Pricing {
    /// Estimate the cost of a generation in the provider's currency unit.
    ///
    /// `duration_seconds` is only consulted for per-second pricing.
    pub fn estimate(&self, asset_count: usize, duration_seconds: f64) -> f64 {
        match self {
            Self::PerAsset(price) => price * asset_count as f64,
            Self::PerSecond(price) => price * duration_seconds,
        }
    }
}

/// Immutable description of one supported model.
///
/// Invariant: `supports_image_input == false` implies `max_image_inputs == 0`;
/// enforced by the constructor (`image_input()` is the only way to raise the
/// cap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Catalog id callers use (e.g. `"fast-image"`).
    pub id: String,
    /// Opaque handle the remote generation provider understands.
    pub provider_ref: String,
    pub category: ModelCategory,
    pub supports_image_input: bool,
    pub max_image_inputs: u32,
    pub pricing: Pricing,
    pub parameters: Vec<ParameterSpec>,
}

impl ModelDescriptor {
    /// Create a descriptor with no image inputs and no parameters.
    pub fn new(
        id: impl Into<String>,
        provider_ref: impl Into<String>,
        category: ModelCategory,
        pricing: Pricing,
    ) -> Self {
        Self {
            id: id.into(),
            provider_ref: provider_ref.into(),
            category,
            supports_image_input: false,
            max_image_inputs: 0,
            pricing,
            parameters: Vec::new(),
        }
    }

    /// Enable image inputs with the given cap.
    pub fn image_input(mut self, max_inputs: u32) -> Self {
        self.supports_image_input = max_inputs > 0;
        self.max_image_inputs = max_inputs;
        self
    }

    /// Append a parameter spec.
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Look up a parameter spec by external name.
    pub fn parameter_spec(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Estimate generation cost for the produced assets.
    pub fn estimate_cost(&self, asset_count: usize, duration_seconds: f64) -> f64 {
        self.pricing.estimate(asset_count, duration_seconds)
    }
}

/// Registry of model descriptors with pure lookup.
///
/// Construct once (typically via [`ModelCatalog::builtin()`]) and share by
/// reference. Lookup has no side effects and no failure mode beyond "not
/// found".
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: BTreeMap<String, ModelDescriptor>,
}

impl ModelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in model set.
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    /// Register a descriptor. Replaces any existing entry with the same id.
    pub fn register(&mut self, descriptor: ModelDescriptor) {
        self.models.insert(descriptor.id.clone(), descriptor);
    }

    /// Look up a model descriptor by id.
    pub fn describe(&self, model_id: &str) -> Option<&ModelDescriptor> {
        self.models.get(model_id)
    }

    /// All registered model ids, sorted.
    pub fn model_ids(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// Descriptors in a given category, sorted by id.
    pub fn models_in_category(&self, category: ModelCategory) -> Vec<&ModelDescriptor> {
        self.models
            .values()
            .filter(|m| m.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_builder_sets_fields() {
        let spec = ParameterSpec::number("guidance")
            .range(0.0, 10.0)
            .default_value(3.0)
            .tier(ParameterTier::Intermediate);
        assert_eq!(spec.kind, ParameterKind::Number);
        assert_eq!(spec.min, Some(0.0));
        assert_eq!(spec.max, Some(10.0));
        assert_eq!(spec.default, Some(serde_json::json!(3.0)));
        assert!(!spec.required);
    }

    #[test]
    fn enumeration_collects_options() {
        let spec = ParameterSpec::enumeration("aspect_ratio", ["1:1", "16:9"]);
        assert_eq!(spec.kind, ParameterKind::Enum);
        assert_eq!(spec.options, vec!["1:1", "16:9"]);
    }

    #[test]
    fn descriptor_image_input_invariant() {
        let plain = ModelDescriptor::new(
            "m",
            "ref/m",
            ModelCategory::Image,
            Pricing::PerAsset(0.01),
        );
        assert!(!plain.supports_image_input);
        assert_eq!(plain.max_image_inputs, 0);

        let with_inputs = plain.clone().image_input(2);
        assert!(with_inputs.supports_image_input);
        assert_eq!(with_inputs.max_image_inputs, 2);

        // A zero cap keeps the invariant rather than flagging support.
        let zero = plain.image_input(0);
        assert!(!zero.supports_image_input);
    }

    #[test]
    fn pricing_estimates() {
        assert_eq!(Pricing::PerAsset(0.05).estimate(4, 99.0), 0.2);
        assert_eq!(Pricing::PerSecond(0.1).estimate(4, 10.0), 1.0);
    }

    #[test]
    fn register_replaces_existing() {
        let mut catalog = ModelCatalog::new();
        catalog.register(ModelDescriptor::new(
            "m",
            "ref/v1",
            ModelCategory::Image,
            Pricing::PerAsset(0.01),
        ));
        catalog.register(ModelDescriptor::new(
            "m",
            "ref/v2",
            ModelCategory::Image,
            Pricing::PerAsset(0.01),
        ));
        assert_eq!(catalog.describe("m").unwrap().provider_ref, "ref/v2");
    }
}
