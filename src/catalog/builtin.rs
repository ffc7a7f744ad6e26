//! Built-in model descriptors.
//!
//! One entry per supported model. Ranges and option sets mirror what the
//! remote provider actually accepts; the per-model field renames live in
//! [`crate::request::quirks`], not here.

use super::{ModelCatalog, ModelCategory, ModelDescriptor, ParameterSpec, ParameterTier, Pricing};

const ASPECT_RATIOS: [&str; 5] = ["1:1", "16:9", "9:16", "4:3", "3:4"];
const OUTPUT_FORMATS: [&str; 3] = ["webp", "jpg", "png"];

pub(super) fn catalog() -> ModelCatalog {
    let mut catalog = ModelCatalog::new();
    catalog.register(fast_image());
    catalog.register(flux_dev());
    catalog.register(flux_schnell());
    catalog.register(wan_video());
    catalog.register(clarity_upscale());
    catalog
}

/// Low-latency image model for previews and drafts.
fn fast_image() -> ModelDescriptor {
    ModelDescriptor::new(
        "fast-image",
        "prunaai/flux-fast",
        ModelCategory::Image,
        Pricing::PerAsset(0.003),
    )
    .parameter(ParameterSpec::string("prompt").required())
    .parameter(
        ParameterSpec::integer("outputs")
            .range(1.0, 4.0)
            .default_value(1),
    )
    .parameter(
        ParameterSpec::enumeration("aspect_ratio", ASPECT_RATIOS)
            .default_value("1:1")
            .tier(ParameterTier::Intermediate),
    )
    .parameter(
        ParameterSpec::number("guidance")
            .range(0.0, 10.0)
            .default_value(3.0)
            .tier(ParameterTier::Intermediate),
    )
    .parameter(
        ParameterSpec::integer("steps")
            .range(1.0, 12.0)
            .default_value(4)
            .tier(ParameterTier::Advanced),
    )
    .parameter(ParameterSpec::integer("seed").tier(ParameterTier::Advanced))
}

fn flux_dev() -> ModelDescriptor {
    ModelDescriptor::new(
        "flux-dev",
        "black-forest-labs/flux-dev",
        ModelCategory::Image,
        Pricing::PerAsset(0.025),
    )
    .image_input(1)
    .parameter(ParameterSpec::string("prompt").required())
    .parameter(
        ParameterSpec::integer("outputs")
            .range(1.0, 4.0)
            .default_value(1),
    )
    .parameter(
        ParameterSpec::enumeration("aspect_ratio", ASPECT_RATIOS)
            .default_value("1:1")
            .tier(ParameterTier::Intermediate),
    )
    .parameter(
        ParameterSpec::number("guidance")
            .range(0.0, 10.0)
            .default_value(3.0)
            .step(0.1)
            .tier(ParameterTier::Intermediate),
    )
    .parameter(
        ParameterSpec::integer("steps")
            .range(1.0, 50.0)
            .default_value(28)
            .tier(ParameterTier::Advanced),
    )
    .parameter(
        ParameterSpec::enumeration("output_format", OUTPUT_FORMATS)
            .default_value("webp")
            .tier(ParameterTier::Advanced),
    )
    .parameter(ParameterSpec::integer("seed").tier(ParameterTier::Advanced))
}

/// Distilled flux variant: no guidance control, step count capped at 4.
///
/// The schema is the family-generic one; the guidance prohibition and the
/// narrow step band are enforced in the quirk table so this descriptor
/// stays interchangeable with the rest of the flux family.
fn flux_schnell() -> ModelDescriptor {
    ModelDescriptor::new(
        "flux-schnell",
        "black-forest-labs/flux-schnell",
        ModelCategory::Image,
        Pricing::PerAsset(0.003),
    )
    .parameter(ParameterSpec::string("prompt").required())
    .parameter(
        ParameterSpec::integer("outputs")
            .range(1.0, 4.0)
            .default_value(1),
    )
    .parameter(
        ParameterSpec::enumeration("aspect_ratio", ASPECT_RATIOS)
            .default_value("1:1")
            .tier(ParameterTier::Intermediate),
    )
    .parameter(
        ParameterSpec::number("guidance")
            .range(0.0, 10.0)
            .default_value(3.0)
            .tier(ParameterTier::Intermediate),
    )
    .parameter(
        ParameterSpec::integer("steps")
            .range(1.0, 50.0)
            .default_value(4)
            .tier(ParameterTier::Advanced),
    )
    .parameter(ParameterSpec::integer("seed").tier(ParameterTier::Advanced))
}

/// Text- and image-to-video model, priced per second of output.
fn wan_video() -> ModelDescriptor {
    ModelDescriptor::new(
        "wan-video",
        "wan-video/wan-2.1-t2v",
        ModelCategory::Video,
        Pricing::PerSecond(0.05),
    )
    .image_input(1)
    .parameter(ParameterSpec::string("prompt").required())
    .parameter(
        ParameterSpec::integer("duration")
            .range(1.0, 10.0)
            .default_value(5),
    )
    .parameter(
        ParameterSpec::enumeration("resolution", ["480p", "720p"])
            .default_value("480p")
            .tier(ParameterTier::Intermediate),
    )
    .parameter(
        ParameterSpec::integer("fps")
            .range(8.0, 30.0)
            .default_value(16)
            .tier(ParameterTier::Advanced),
    )
    .parameter(ParameterSpec::integer("seed").tier(ParameterTier::Advanced))
}

/// Image upscaler. Takes exactly one image input; the prompt is optional
/// creative steering, not a requirement.
fn clarity_upscale() -> ModelDescriptor {
    ModelDescriptor::new(
        "clarity-upscale",
        "philz1337x/clarity-upscaler",
        ModelCategory::Upscale,
        Pricing::PerAsset(0.012),
    )
    .image_input(1)
    .parameter(ParameterSpec::string("prompt"))
    .parameter(
        ParameterSpec::number("scale")
            .range(1.0, 4.0)
            .default_value(2.0),
    )
    .parameter(
        ParameterSpec::number("creativity")
            .range(0.0, 1.0)
            .default_value(0.35)
            .step(0.05)
            .tier(ParameterTier::Intermediate),
    )
    .parameter(ParameterSpec::integer("seed").tier(ParameterTier::Advanced))
}
