//! MIME type inference for downloaded assets.
//!
//! Extension lookup first, a HEAD probe of `Content-Type` second, opaque
//! binary as the final default. Inference never fails.

use reqwest::Client;
use tracing::debug;

/// Default for assets whose type cannot be determined.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Fixed extension → MIME table covering the media types the generation
/// providers actually produce.
const EXTENSION_TABLE: [(&str, &str); 18] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
    ("avif", "image/avif"),
    ("svg", "image/svg+xml"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
];

/// MIME type from the URL's file extension, if recognized.
///
/// Query strings and fragments are ignored; matching is case-insensitive.
pub fn mime_from_extension(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit('.').next()?;
    // No dot in the final path segment means no extension.
    if ext.len() == path.len() || ext.contains('/') {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Infer the MIME type of an asset URL.
///
/// Falls back to a HEAD request reading `Content-Type` when the extension
/// is unknown, and to [`OCTET_STREAM`] when that also fails. This function
/// never errors.
pub async fn infer_mime(url: &str, http: &Client) -> String {
    if let Some(mime) = mime_from_extension(url) {
        return mime.to_string();
    }
    match head_content_type(url, http).await {
        Some(mime) => mime,
        None => {
            debug!(url, "could not infer mime type, defaulting to octet-stream");
            OCTET_STREAM.to_string()
        }
    }
}

async fn head_content_type(url: &str, http: &Client) -> Option<String> {
    let response = http.head(url).send().await.ok()?;
    let value = response.headers().get(reqwest::header::CONTENT_TYPE)?;
    let mime = value.to_str().ok()?;
    // Strip parameters like "; charset=utf-8".
    let mime = mime.split(';').next()?.trim();
    (!mime.is_empty()).then(|| mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(
            mime_from_extension("https://x/a.png"),
            Some("image/png")
        );
        assert_eq!(
            mime_from_extension("https://x/clip.MP4"),
            Some("video/mp4")
        );
    }

    #[test]
    fn query_string_is_ignored() {
        assert_eq!(
            mime_from_extension("https://x/a.webp?expires=123&sig=abc"),
            Some("image/webp")
        );
    }

    #[test]
    fn unknown_or_missing_extension() {
        assert_eq!(mime_from_extension("https://x/asset"), None);
        assert_eq!(mime_from_extension("https://x/a.xyz"), None);
        assert_eq!(mime_from_extension("https://x.example.com/asset"), None);
    }
}
