use muninn::{GenerationRequest, ModelCatalog, normalize};
use serde_json::json;

fn catalog() -> ModelCatalog {
    ModelCatalog::builtin()
}

#[test]
fn normalize_is_deterministic() {
    let catalog = catalog();
    let descriptor = catalog.describe("flux-dev").unwrap();
    let request = GenerationRequest::new("flux-dev")
        .param("prompt", "a lighthouse at dusk")
        .param("guidance", 4.5)
        .param("steps", 30);

    let first = normalize(descriptor, &request).unwrap();
    let second = normalize(descriptor, &request).unwrap();
    assert_eq!(
        serde_json::to_string(&first.to_json()).unwrap(),
        serde_json::to_string(&second.to_json()).unwrap()
    );
}

#[test]
fn every_required_param_is_reported_by_name() {
    let catalog = catalog();
    for id in catalog.model_ids() {
        let descriptor = catalog.describe(id).unwrap();
        let required: Vec<_> = descriptor
            .parameters
            .iter()
            .filter(|p| p.required && p.default.is_none())
            .collect();
        if required.is_empty() {
            continue;
        }
        let errors = normalize(descriptor, &GenerationRequest::new(id)).unwrap_err();
        for spec in required {
            assert!(
                errors.iter().any(|e| e.param == spec.name),
                "{id}: missing error for required param {}",
                spec.name
            );
        }
    }
}

#[test]
fn type_mismatches_are_rejected() {
    let catalog = catalog();
    let descriptor = catalog.describe("fast-image").unwrap();
    let request = GenerationRequest::new("fast-image")
        .param("prompt", "a cat")
        .param("outputs", "two")
        .param("guidance", true);
    let errors = normalize(descriptor, &request).unwrap_err();
    assert!(errors.iter().any(|e| e.param == "outputs"));
    assert!(errors.iter().any(|e| e.param == "guidance"));
}

#[test]
fn out_of_range_and_bad_enum_values() {
    let catalog = catalog();
    let descriptor = catalog.describe("fast-image").unwrap();
    let request = GenerationRequest::new("fast-image")
        .param("prompt", "a cat")
        .param("outputs", 9)
        .param("aspect_ratio", "2:1");
    let errors = normalize(descriptor, &request).unwrap_err();
    assert!(errors.iter().any(|e| e.param == "outputs"));
    assert!(
        errors
            .iter()
            .any(|e| e.param == "aspect_ratio" && e.reason.contains("one of"))
    );
}

#[test]
fn no_partial_payload_on_failure() {
    let catalog = catalog();
    let descriptor = catalog.describe("fast-image").unwrap();
    // One good param, one bad: the whole request is rejected.
    let request = GenerationRequest::new("fast-image")
        .param("prompt", "a cat")
        .param("outputs", 99);
    assert!(normalize(descriptor, &request).is_err());
}

#[test]
fn renames_follow_the_model_quirk_table() {
    let catalog = catalog();

    // flux-dev renames guidance → guidance_scale
    let descriptor = catalog.describe("flux-dev").unwrap();
    let input = normalize(
        descriptor,
        &GenerationRequest::new("flux-dev")
            .param("prompt", "x")
            .param("guidance", 2.0),
    )
    .unwrap();
    assert_eq!(input.payload["guidance_scale"], json!(2.0));
    assert!(!input.payload.contains_key("guidance"));

    // fast-image keeps guidance under its external name
    let descriptor = catalog.describe("fast-image").unwrap();
    let input = normalize(
        descriptor,
        &GenerationRequest::new("fast-image")
            .param("prompt", "x")
            .param("guidance", 2.0),
    )
    .unwrap();
    assert_eq!(input.payload["guidance"], json!(2.0));
}

#[test]
fn provider_ref_comes_from_descriptor() {
    let catalog = catalog();
    let descriptor = catalog.describe("fast-image").unwrap();
    let input = normalize(
        descriptor,
        &GenerationRequest::new("fast-image").param("prompt", "x"),
    )
    .unwrap();
    assert_eq!(input.provider_ref, descriptor.provider_ref);
}

#[test]
fn schnell_guidance_is_rejected_as_unsupported() {
    let catalog = catalog();
    let descriptor = catalog.describe("flux-schnell").unwrap();
    let errors = normalize(
        descriptor,
        &GenerationRequest::new("flux-schnell")
            .param("prompt", "x")
            .param("guidance", 5.0),
    )
    .unwrap_err();
    // Declared in the schema, forbidden by the model's quirk table.
    assert!(
        errors
            .iter()
            .any(|e| e.param == "guidance" && e.reason == "not supported by model 'flux-schnell'")
    );

    // When not requested, the forbidden parameter never defaults into the
    // payload either.
    let input = normalize(
        descriptor,
        &GenerationRequest::new("flux-schnell").param("prompt", "x"),
    )
    .unwrap();
    assert!(!input.payload.contains_key("guidance"));
}

#[test]
fn unknown_parameter_is_an_error() {
    let catalog = catalog();
    let descriptor = catalog.describe("fast-image").unwrap();
    let errors = normalize(
        descriptor,
        &GenerationRequest::new("fast-image")
            .param("prompt", "x")
            .param("negative_prompt", "y"),
    )
    .unwrap_err();
    assert!(errors.iter().any(|e| e.param == "negative_prompt"));
}
