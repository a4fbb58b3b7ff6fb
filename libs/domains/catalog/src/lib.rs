//! Catalog Domain
//!
//! Domain implementation for a product catalog backed by MongoDB, with an
//! image upload pipeline writing to a local media store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (multipart decoding, auth gates)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌──────────────┐
//! │   Service   │────▶│ ImagePipeline│  ← validate, resize, store files
//! └──────┬──────┘     └──────┬───────┘
//!        │                   │
//! ┌──────▼──────┐     ┌──────▼───────┐
//! │ Repositories│     │  FileStore   │  ← media root on local disk
//! └──────┬──────┘     └──────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← entities, DTOs
//! ```
//!
//! Products hold weak references (bare UUIDs) to author, category,
//! provider and publisher entities; the service resolves them at write
//! time and compensates stored image files when a request fails partway.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers::{self, AuthPolicy},
//!     image::{ImagePolicy, ImageProcessor},
//!     mongodb::{MongoProductRepository, MongoReferenceRepository},
//!     service::ProductService,
//!     storage::LocalFileStore,
//! };
//! use axum_helpers::{JwtConfig, TokenVerifier};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//!
//! let store = Arc::new(LocalFileStore::new("media"));
//! let service = ProductService::new(
//!     MongoProductRepository::new(&db),
//!     MongoReferenceRepository::new(&db),
//!     store.clone(),
//! );
//! let processor = ImageProcessor::new(ImagePolicy::default(), store);
//! let verifier = TokenVerifier::new(&JwtConfig::new("secret"));
//!
//! let router = handlers::router(service, processor, verifier, AuthPolicy::default());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod image;
pub mod models;
pub mod mongodb;
pub mod multipart;
pub mod repository;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult};
pub use handlers::{ApiDoc, AuthPolicy};
pub use image::{ImagePolicy, ImageProcessor, ImageUpload};
pub use models::{
    CreateProduct, CreateReference, ImageArtifact, Product, ProductFilter, ReferenceEntity,
    ReferenceKind, UpdateProduct,
};
pub use mongodb::{MongoProductRepository, MongoReferenceRepository};
pub use repository::{ProductRepository, ReferenceRepository};
pub use service::ProductService;
pub use storage::{FileStore, LocalFileStore};
