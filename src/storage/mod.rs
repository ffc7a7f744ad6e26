//! Asset persistence: download, classify, and durably store assets.
//!
//! Provider URLs expire, so every produced asset is re-homed into a
//! persistent object store through a primary-then-fallback chain, each leg
//! wrapped by the shared retry executor. When every store is exhausted the
//! pipeline degrades gracefully: the caller gets an ephemeral record
//! pointing at the provider's own URL instead of an error.

mod error;
pub mod mime;
mod object;

pub use error::{StorageError, StorageErrorCode, classify};
pub use object::{HttpObjectStore, ObjectStore, StoredObject, UploadMetadata};

use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::{Client, Url};
use tracing::{debug, instrument, warn};

use crate::output::AssetRef;
use crate::retry::{RetryPolicy, with_fallback, with_retry};
use crate::telemetry;
use crate::{MuninnError, Result};

/// Default cap on a single asset download.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 512 * 1024 * 1024;

/// Which store ended up holding the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    Primary,
    Fallback,
    /// No store accepted the asset; only the provider's own URL remains.
    None,
}

/// Persistence outcome for one asset. Immutable once produced.
///
/// `persistent == false` means "ephemeral — the URL may expire", not an
/// error: both stores were exhausted and the original URL is all we have.
#[derive(Debug, Clone)]
pub struct AssetRecord {
    pub original_url: String,
    pub stored_url: String,
    pub provider: StorageProvider,
    pub persistent: bool,
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_seconds: Option<f64>,
    pub file_size_bytes: u64,
}

/// Allow-list of trusted asset source domains.
///
/// A host is trusted when it equals an entry or is a subdomain of one.
/// Static, read-only data — safe to share across jobs without locking.
#[derive(Debug, Clone, Default)]
pub struct TrustedDomains {
    domains: Vec<String>,
}

impl TrustedDomains {
    /// Build an allow-list from domain names.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether the host belongs to a trusted domain.
    pub fn allows(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    }
}

/// Externally-owned handle bundle for persistence.
///
/// Constructed once at process start and passed by reference; injecting
/// fake stores makes the orchestrator trivially testable.
#[derive(Clone)]
pub struct PersistContext {
    pub http: Client,
    pub primary: Arc<dyn ObjectStore>,
    pub fallback: Arc<dyn ObjectStore>,
    pub trusted: TrustedDomains,
    pub retry: RetryPolicy,
    pub max_download_bytes: u64,
}

impl PersistContext {
    /// Create a context with the default retry policy and download cap.
    pub fn new(
        primary: Arc<dyn ObjectStore>,
        fallback: Arc<dyn ObjectStore>,
        trusted: TrustedDomains,
    ) -> Self {
        Self {
            http: Client::new(),
            primary,
            fallback,
            trusted,
            retry: RetryPolicy::default(),
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
        }
    }

    /// Override the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the download size cap.
    pub fn max_download_bytes(mut self, cap: u64) -> Self {
        self.max_download_bytes = cap;
        self
    }
}

/// Persist one asset through the primary-then-fallback store chain.
///
/// The only hard failure is source-URL validation (untrusted domain or
/// non-http scheme), rejected before any network call with a
/// non-retryable `VALIDATION_ERROR`. Download and upload failures degrade
/// to an ephemeral record.
#[instrument(skip(asset, ctx), fields(url = %asset.original_url))]
pub async fn persist(asset: &AssetRef, ctx: &PersistContext) -> Result<AssetRecord> {
    let url = validate_source(&asset.original_url, &ctx.trusted)?;
    let file_name = file_name_from(&url);

    let bytes = match with_retry(&ctx.retry, "download", || {
        download(&asset.original_url, ctx)
    })
    .await
    {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "download failed, returning ephemeral record");
            return Ok(ephemeral_record(asset, 0));
        }
    };

    let mime_type = mime::infer_mime(&asset.original_url, &ctx.http).await;
    let metadata = UploadMetadata {
        file_name,
        mime_type: mime_type.clone(),
        size_bytes: bytes.len() as u64,
    };

    let primary = &ctx.primary;
    let fallback = &ctx.fallback;
    let retry = &ctx.retry;
    let stored = with_fallback(
        || async {
            let object = with_retry(retry, "upload-primary", || {
                primary.upload(&bytes, &metadata)
            })
            .await?;
            Ok((object, StorageProvider::Primary, primary.name().to_owned()))
        },
        || async {
            let object = with_retry(retry, "upload-fallback", || {
                fallback.upload(&bytes, &metadata)
            })
            .await?;
            Ok((object, StorageProvider::Fallback, fallback.name().to_owned()))
        },
        "persist-upload",
    )
    .await;

    match stored {
        Ok((object, provider, store_name)) => {
            metrics::counter!(telemetry::PERSISTED_BYTES_TOTAL,
                "provider" => store_name,
            )
            .increment(bytes.len() as u64);
            Ok(AssetRecord {
                original_url: asset.original_url.clone(),
                stored_url: object.url,
                provider,
                persistent: true,
                mime_type,
                width: None,
                height: None,
                duration_seconds: None,
                file_size_bytes: bytes.len() as u64,
            })
        }
        Err(e) => {
            warn!(error = %e, "all stores exhausted, returning ephemeral record");
            let mut record = ephemeral_record(asset, bytes.len() as u64);
            record.mime_type = mime_type;
            Ok(record)
        }
    }
}

/// Reject non-http schemes and hosts outside the allow-list, before any
/// network I/O happens.
fn validate_source(raw_url: &str, trusted: &TrustedDomains) -> Result<Url> {
    let reject = |reason: &str| {
        MuninnError::Storage(StorageError::new(
            StorageErrorCode::ValidationError,
            "persist",
            format!("{reason}: {raw_url}"),
        ))
    };
    let url = Url::parse(raw_url).map_err(|_| reject("unparseable source url"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(reject("source url must be http or https"));
    }
    let host = url.host_str().ok_or_else(|| reject("source url has no host"))?;
    if !trusted.allows(host) {
        return Err(reject("source host is not on the trusted domain list"));
    }
    Ok(url)
}

fn file_name_from(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("asset")
        .to_string()
}

fn ephemeral_record(asset: &AssetRef, file_size_bytes: u64) -> AssetRecord {
    AssetRecord {
        original_url: asset.original_url.clone(),
        stored_url: asset.original_url.clone(),
        provider: StorageProvider::None,
        persistent: false,
        mime_type: mime::mime_from_extension(&asset.original_url)
            .unwrap_or(mime::OCTET_STREAM)
            .to_string(),
        width: None,
        height: None,
        duration_seconds: None,
        file_size_bytes,
    }
}

/// Download the asset fully into memory, tracking a monotonically
/// increasing byte count and enforcing the size cap.
async fn download(url: &str, ctx: &PersistContext) -> Result<Vec<u8>> {
    let response = ctx
        .http
        .get(url)
        .send()
        .await
        .map_err(|e| MuninnError::Http(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(MuninnError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let mut bytes: Vec<u8> = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| MuninnError::Http(e.to_string()))?;
        if (bytes.len() + chunk.len()) as u64 > ctx.max_download_bytes {
            return Err(MuninnError::Storage(StorageError::new(
                StorageErrorCode::FileTooLarge,
                "download",
                format!("exceeds cap of {} bytes", ctx.max_download_bytes),
            )));
        }
        bytes.extend_from_slice(&chunk);
        metrics::counter!(telemetry::DOWNLOADED_BYTES_TOTAL).increment(chunk.len() as u64);
        debug!(url, bytes_downloaded = bytes.len(), "download progress");
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trusted_domains_match_exact_and_subdomains() {
        let trusted = TrustedDomains::new(["replicate.delivery", "cdn.example.com"]);
        assert!(trusted.allows("replicate.delivery"));
        assert!(trusted.allows("pbxt.replicate.delivery"));
        assert!(trusted.allows("CDN.EXAMPLE.COM"));
        assert!(!trusted.allows("evil-replicate.delivery"));
        assert!(!trusted.allows("example.com"));
    }

    #[test]
    fn validate_source_rejects_bad_inputs() {
        let trusted = TrustedDomains::new(["ok.example"]);
        assert!(validate_source("https://ok.example/a.png", &trusted).is_ok());
        for bad in [
            "ftp://ok.example/a.png",
            "https://other.example/a.png",
            "not a url",
        ] {
            let err = validate_source(bad, &trusted).unwrap_err();
            match err {
                MuninnError::Storage(e) => {
                    assert_eq!(e.code, StorageErrorCode::ValidationError);
                    assert!(!e.retryable);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn file_name_falls_back() {
        let url = Url::parse("https://x.example/").unwrap();
        assert_eq!(file_name_from(&url), "asset");
        let url = Url::parse("https://x.example/out/final.webp").unwrap();
        assert_eq!(file_name_from(&url), "final.webp");
    }
}
