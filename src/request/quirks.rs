//! Per-model translation tables for provider payload shaping.
//!
//! All "this model needs it *this* way" knowledge lives here and nowhere
//! else: external-to-provider field renames, parameters a model family
//! forbids outright, and range overrides narrower than the generic schema.
//! The normalizer consults these tables uniformly, so adding a model never
//! touches pipeline logic.

/// Declarative quirk table for one model.
///
/// `rename` maps external parameter names to the provider's field names.
/// `forbid` lists external names that must be rejected for this model even
/// though the generic option exists elsewhere in the family. `clamp`
/// overrides the declared `[min, max]` with a narrower legal band.
#[derive(Debug, Clone, Copy)]
pub struct ModelQuirks {
    pub rename: &'static [(&'static str, &'static str)],
    pub forbid: &'static [&'static str],
    pub clamp: &'static [(&'static str, f64, f64)],
    /// Provider field that receives image inputs.
    pub image_field: &'static str,
}

impl ModelQuirks {
    pub const NONE: ModelQuirks = ModelQuirks {
        rename: &[],
        forbid: &[],
        clamp: &[],
        image_field: "image",
    };

    /// Provider-side field name for an external parameter name.
    pub fn provider_name<'a>(&self, external: &'a str) -> &'a str {
        self.rename
            .iter()
            .find(|(from, _)| *from == external)
            .map(|(_, to)| *to)
            .unwrap_or(external)
    }

    /// Whether this model rejects the parameter outright.
    pub fn forbids(&self, external: &str) -> bool {
        self.forbid.contains(&external)
    }

    /// Range override for a parameter, if one exists.
    pub fn clamp_for(&self, external: &str) -> Option<(f64, f64)> {
        self.clamp
            .iter()
            .find(|(name, _, _)| *name == external)
            .map(|(_, min, max)| (*min, *max))
    }
}

/// Quirk table lookup by model id.
///
/// Models without an entry get [`ModelQuirks::NONE`]: external names pass
/// through unchanged and image inputs land in `"image"`.
pub fn for_model(model_id: &str) -> ModelQuirks {
    match model_id {
        "fast-image" => ModelQuirks {
            rename: &[
                ("outputs", "num_outputs"),
                ("steps", "num_inference_steps"),
            ],
            forbid: &[],
            clamp: &[],
            image_field: "image",
        },
        "flux-dev" => ModelQuirks {
            rename: &[
                ("outputs", "num_outputs"),
                ("guidance", "guidance_scale"),
                ("steps", "num_inference_steps"),
            ],
            forbid: &[],
            clamp: &[],
            image_field: "image_prompt",
        },
        // The distilled variant takes no guidance at all and only accepts
        // 1-4 inference steps.
        "flux-schnell" => ModelQuirks {
            rename: &[
                ("outputs", "num_outputs"),
                ("steps", "num_inference_steps"),
            ],
            forbid: &["guidance"],
            clamp: &[("steps", 1.0, 4.0)],
            image_field: "image",
        },
        "wan-video" => ModelQuirks {
            rename: &[
                ("duration", "duration_seconds"),
                ("fps", "frames_per_second"),
            ],
            forbid: &[],
            clamp: &[],
            image_field: "start_image",
        },
        "clarity-upscale" => ModelQuirks {
            rename: &[("scale", "scale_factor")],
            forbid: &[],
            clamp: &[],
            image_field: "image",
        },
        _ => ModelQuirks::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model_gets_passthrough() {
        let quirks = for_model("no-such-model");
        assert_eq!(quirks.provider_name("guidance"), "guidance");
        assert!(!quirks.forbids("guidance"));
        assert!(quirks.clamp_for("steps").is_none());
        assert_eq!(quirks.image_field, "image");
    }

    #[test]
    fn flux_dev_renames_guidance() {
        let quirks = for_model("flux-dev");
        assert_eq!(quirks.provider_name("guidance"), "guidance_scale");
        assert_eq!(quirks.provider_name("prompt"), "prompt");
    }

    #[test]
    fn schnell_forbids_guidance_and_clamps_steps() {
        let quirks = for_model("flux-schnell");
        assert!(quirks.forbids("guidance"));
        assert_eq!(quirks.clamp_for("steps"), Some((1.0, 4.0)));
    }

    #[test]
    fn video_routes_image_to_start_frame() {
        assert_eq!(for_model("wan-video").image_field, "start_image");
    }
}
