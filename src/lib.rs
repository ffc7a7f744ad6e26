//! Muninn - Generation-and-persistence pipeline for AI media assets
//!
//! Muninn turns a generic generation request (prompt + options) into a
//! provider-specific payload, drives the remote prediction job to a
//! terminal state, normalizes the provider's heterogeneous output into a
//! flat list of asset URLs, and durably re-homes each asset into object
//! storage through a primary-then-fallback chain with shared retry and
//! error-classification policy.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use muninn::{
//!     GenerationRequest, HttpGenerationProvider, HttpObjectStore, PersistContext,
//!     Pipeline, TrustedDomains,
//! };
//!
//! #[tokio::main]
//! async fn main() -> muninn::Result<()> {
//!     let ctx = PersistContext::new(
//!         Arc::new(HttpObjectStore::new("bunny", "key-1", "https://storage.bunnycdn.com")),
//!         Arc::new(HttpObjectStore::new("r2", "key-2", "https://r2.example.com")),
//!         TrustedDomains::new(["replicate.delivery"]),
//!     );
//!     let pipeline = Pipeline::builder()
//!         .provider(Arc::new(HttpGenerationProvider::new("r8_your_key")))
//!         .persist_context(ctx)
//!         .build()?;
//!
//!     let record = pipeline
//!         .run(
//!             &GenerationRequest::new("fast-image")
//!                 .param("prompt", "a cat on a bicycle")
//!                 .param("outputs", 2),
//!         )
//!         .await?;
//!
//!     for asset in &record.assets {
//!         println!("{} (persistent: {})", asset.stored_url, asset.persistent);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prediction;
pub mod record;
pub mod request;
pub mod retry;
pub mod storage;
pub mod telemetry;

// Re-export main types at crate root
pub use error::{MuninnError, Result};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use retry::{RetryPolicy, with_fallback, with_retry};

// Re-export the types most callers touch
pub use catalog::{
    ModelCatalog, ModelCategory, ModelDescriptor, ParameterKind, ParameterSpec, ParameterTier,
    Pricing,
};
pub use output::{AssetRef, extract_asset_urls};
pub use prediction::{
    GenerationProvider, HttpGenerationProvider, JobStatus, PredictionJob, wait_for_terminal,
};
pub use record::GenerationRecord;
pub use request::{GenerationRequest, ProviderInput, ValidationError, normalize};
pub use storage::{
    AssetRecord, HttpObjectStore, ObjectStore, PersistContext, StorageError, StorageErrorCode,
    StorageProvider, StoredObject, TrustedDomains, UploadMetadata, classify, persist,
};
