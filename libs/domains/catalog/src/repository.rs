use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{CreateReference, Product, ProductFilter, ReferenceEntity, ReferenceKind};

/// Repository trait for Product persistence
///
/// Defines the data access interface for products. Implementations can
/// use different storage backends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a fully built product record
    async fn insert(&self, product: Product) -> CatalogResult<Product>;

    /// Get a product by ID
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    /// List products matching a filter, newest first
    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>>;

    /// Replace an existing product record
    async fn replace(&self, product: Product) -> CatalogResult<Product>;

    /// Delete a product by ID, returning whether a record was removed
    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;

    /// Count products matching a filter
    async fn count(&self, filter: ProductFilter) -> CatalogResult<u64>;
}

/// Repository trait for the reference entity store
///
/// The product pipeline only reads it (existence checks); the
/// create/get/list surface exists for seeding and tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Check whether an entity of the given kind exists
    async fn exists(&self, kind: ReferenceKind, id: Uuid) -> CatalogResult<bool>;

    /// Get an entity by kind and ID
    async fn get(&self, kind: ReferenceKind, id: Uuid) -> CatalogResult<Option<ReferenceEntity>>;

    /// Create an entity of the given kind
    async fn create(
        &self,
        kind: ReferenceKind,
        input: CreateReference,
    ) -> CatalogResult<ReferenceEntity>;

    /// List all entities of the given kind
    async fn list(&self, kind: ReferenceKind) -> CatalogResult<Vec<ReferenceEntity>>;
}
