//! Output normalization: provider output shapes to a flat URL list.
//!
//! Generation providers return their output as a bare string, an array,
//! or an object keyed by any of several conventional names depending on
//! model family. [`extract_asset_urls`] is a total function over all
//! shapes seen in the wild; an unrecognized shape yields an empty list,
//! which callers must treat as a hard "no assets produced" failure rather
//! than silently dropping.

use serde_json::Value;

/// Canonical reference to a single produced asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// The provider's (possibly short-lived) URL for the asset.
    pub original_url: String,
}

impl AssetRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            original_url: url.into(),
        }
    }
}

/// Object keys probed in priority order. First key that yields any URL wins.
const OUTPUT_KEYS: [&str; 7] = ["url", "urls", "video", "image", "images", "files", "output"];

/// Extract an ordered list of asset URLs from a provider's raw output.
///
/// - string → one-element list (if non-empty)
/// - array → non-empty strings, order preserved
/// - object → fixed key priority, then a last-resort scan of all values
///   for strings starting with `http` or `data:` (order unspecified —
///   callers must not rely on it for multi-asset ordering)
/// - anything else → empty list
pub fn extract_asset_urls(raw_output: &Value) -> Vec<AssetRef> {
    match raw_output {
        Value::String(_) | Value::Array(_) => collect_urls(raw_output),
        Value::Object(map) => {
            for key in OUTPUT_KEYS {
                if let Some(value) = map.get(key) {
                    let found = collect_urls(value);
                    if !found.is_empty() {
                        return found;
                    }
                }
            }
            // Last-resort heuristic: any value that looks like a URL.
            map.values()
                .filter_map(Value::as_str)
                .filter(|s| s.starts_with("http") || s.starts_with("data:"))
                .map(AssetRef::new)
                .collect()
        }
        _ => Vec::new(),
    }
}

/// String and array cases, shared by the top level and object values.
fn collect_urls(value: &Value) -> Vec<AssetRef> {
    match value {
        Value::String(s) if !s.is_empty() => vec![AssetRef::new(s)],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(AssetRef::new)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn urls(value: Value) -> Vec<String> {
        extract_asset_urls(&value)
            .into_iter()
            .map(|a| a.original_url)
            .collect()
    }

    #[test]
    fn bare_string() {
        assert_eq!(urls(json!("https://x/a.png")), vec!["https://x/a.png"]);
        assert!(urls(json!("")).is_empty());
    }

    #[test]
    fn array_filters_empty_and_preserves_order() {
        assert_eq!(urls(json!(["a", "", "b"])), vec!["a", "b"]);
    }

    #[test]
    fn object_key_priority() {
        assert_eq!(urls(json!({"images": ["a", "b"]})), vec!["a", "b"]);
        // "url" beats "images"
        assert_eq!(
            urls(json!({"images": ["a"], "url": "winner"})),
            vec!["winner"]
        );
        // a present-but-empty key falls through to the next one
        assert_eq!(urls(json!({"url": "", "images": ["a"]})), vec!["a"]);
    }

    #[test]
    fn object_heuristic_scan() {
        let found = urls(json!({"thumbnail_href": "https://x/t.png", "count": 2}));
        assert_eq!(found, vec!["https://x/t.png"]);
        let data = urls(json!({"payload": "data:image/png;base64,AAAA"}));
        assert_eq!(data, vec!["data:image/png;base64,AAAA"]);
    }

    #[test]
    fn unrecognized_shapes_yield_empty() {
        assert!(urls(json!(null)).is_empty());
        assert!(urls(json!(42)).is_empty());
        assert!(urls(json!({})).is_empty());
        assert!(urls(json!([])).is_empty());
        assert!(urls(json!({"status": "done"})).is_empty());
    }
}
