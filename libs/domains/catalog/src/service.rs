//! Product service - business logic layer
//!
//! Orchestrates validation, reference checks and persistence, and owns the
//! compensation steps that keep the file store consistent with the record
//! store: a request that fails after image files were written removes those
//! files again, so no persisted record ever points at missing files and no
//! files survive a failed request.

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CreateProduct, ImageArtifact, Product, ProductFilter, ReferenceKind, UpdateProduct,
};
use crate::repository::{ProductRepository, ReferenceRepository};
use crate::storage::FileStore;

pub struct ProductService<R: ProductRepository, E: ReferenceRepository> {
    products: Arc<R>,
    references: Arc<E>,
    files: Arc<dyn FileStore>,
}

impl<R: ProductRepository, E: ReferenceRepository> ProductService<R, E> {
    pub fn new(products: R, references: E, files: Arc<dyn FileStore>) -> Self {
        Self {
            products: Arc::new(products),
            references: Arc::new(references),
            files,
        }
    }

    /// List products with optional filters, newest first
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        self.products.list(filter).await
    }

    /// Count products matching a filter
    #[instrument(skip(self))]
    pub async fn count_products(&self, filter: ProductFilter) -> CatalogResult<u64> {
        self.products.count(filter).await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> CatalogResult<Product> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Create a product from validated fields and a stored image pair.
    ///
    /// All four references must resolve; any failure past this point
    /// removes the artifact files again.
    #[instrument(skip(self, input, artifact), fields(filename = %artifact.filename))]
    pub async fn create_product(
        &self,
        input: CreateProduct,
        artifact: ImageArtifact,
    ) -> CatalogResult<Product> {
        if let Err(e) = input.validate() {
            self.discard_artifact(&artifact).await;
            return Err(CatalogError::Validation(e.to_string()));
        }

        let refs = [
            (ReferenceKind::Author, input.author),
            (ReferenceKind::Category, input.category),
            (ReferenceKind::Provider, input.provider),
            (ReferenceKind::Publisher, input.publisher),
        ];
        if let Err(e) = self.ensure_references(&refs).await {
            self.discard_artifact(&artifact).await;
            return Err(e);
        }

        let product = Product::new(input, artifact.clone());
        match self.products.insert(product).await {
            Ok(created) => {
                tracing::info!(product_id = %created.id, "Product created");
                Ok(created)
            }
            Err(e) => {
                self.discard_artifact(&artifact).await;
                Err(e)
            }
        }
    }

    /// Apply a partial update, optionally replacing the image pair.
    ///
    /// A replaced image pair's previous files are removed after the record
    /// write succeeds; a failed write removes the new files instead.
    #[instrument(skip(self, input, artifact))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProduct,
        artifact: Option<ImageArtifact>,
    ) -> CatalogResult<Product> {
        if let Err(e) = input.validate() {
            self.discard_optional(&artifact).await;
            return Err(CatalogError::Validation(e.to_string()));
        }

        let existing = match self.products.get_by_id(id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                self.discard_optional(&artifact).await;
                return Err(CatalogError::NotFound(id));
            }
            Err(e) => {
                self.discard_optional(&artifact).await;
                return Err(e);
            }
        };

        if let Err(e) = self.ensure_references(&input.supplied_references()).await {
            self.discard_optional(&artifact).await;
            return Err(e);
        }

        let replaced = artifact.as_ref().map(|_| ImageArtifact {
            filename: existing.filename.clone(),
            thumb: existing.thumb.clone(),
        });

        let mut updated = existing;
        updated.apply_update(input, artifact.clone());

        match self.products.replace(updated).await {
            Ok(product) => {
                if let Some(old) = replaced {
                    self.discard_artifact(&old).await;
                }
                tracing::info!(product_id = %id, "Product updated");
                Ok(product)
            }
            Err(e) => {
                self.discard_optional(&artifact).await;
                Err(e)
            }
        }
    }

    /// Delete a product record. Image files are left in place.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> CatalogResult<()> {
        if !self.products.delete(id).await? {
            return Err(CatalogError::NotFound(id));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn ensure_references(&self, refs: &[(ReferenceKind, Uuid)]) -> CatalogResult<()> {
        for (kind, id) in refs {
            if !self.references.exists(*kind, *id).await? {
                return Err(CatalogError::ReferenceNotFound {
                    kind: *kind,
                    id: *id,
                });
            }
        }
        Ok(())
    }

    /// Best-effort removal of both artifact files
    async fn discard_artifact(&self, artifact: &ImageArtifact) {
        for name in [&artifact.filename, &artifact.thumb] {
            if let Err(e) = self.files.delete(name).await {
                tracing::warn!(file = %name, error = %e, "Failed to remove orphaned image file");
            }
        }
    }

    async fn discard_optional(&self, artifact: &Option<ImageArtifact>) {
        if let Some(artifact) = artifact {
            self.discard_artifact(artifact).await;
        }
    }
}

impl<R: ProductRepository, E: ReferenceRepository> Clone for ProductService<R, E> {
    fn clone(&self) -> Self {
        Self {
            products: Arc::clone(&self.products),
            references: Arc::clone(&self.references),
            files: Arc::clone(&self.files),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockProductRepository, MockReferenceRepository};
    use crate::storage::MockFileStore;

    fn sample_input() -> CreateProduct {
        CreateProduct {
            title: None,
            price: 12.5,
            description: "desc".to_string(),
            url: None,
            author: Uuid::now_v7(),
            category: Uuid::now_v7(),
            provider: Uuid::now_v7(),
            publisher: Uuid::now_v7(),
            stocks: 3,
        }
    }

    fn sample_artifact() -> ImageArtifact {
        ImageArtifact {
            filename: "f.png".to_string(),
            thumb: "thumb-f.png".to_string(),
        }
    }

    fn references_all_exist() -> MockReferenceRepository {
        let mut refs = MockReferenceRepository::new();
        refs.expect_exists().returning(|_, _| Ok(true));
        refs
    }

    fn untouched_store() -> Arc<MockFileStore> {
        // No expectations: any call fails the test
        Arc::new(MockFileStore::new())
    }

    #[tokio::test]
    async fn test_create_product_persists_when_references_resolve() {
        let mut products = MockProductRepository::new();
        products
            .expect_insert()
            .withf(|p| p.filename == "f.png" && p.thumb == "thumb-f.png")
            .returning(|p| Ok(p));

        let service = ProductService::new(products, references_all_exist(), untouched_store());
        let created = service
            .create_product(sample_input(), sample_artifact())
            .await
            .unwrap();

        assert_eq!(created.price, 12.5);
        assert_eq!(created.filename, "f.png");
    }

    #[tokio::test]
    async fn test_create_product_dangling_reference_removes_files() {
        let products = MockProductRepository::new();

        let mut refs = MockReferenceRepository::new();
        refs.expect_exists()
            .returning(|kind, _| Ok(kind != ReferenceKind::Category));

        let mut store = MockFileStore::new();
        store.expect_delete().times(2).returning(|_| Ok(()));

        let service = ProductService::new(products, refs, Arc::new(store));
        let result = service.create_product(sample_input(), sample_artifact()).await;

        assert!(matches!(
            result,
            Err(CatalogError::ReferenceNotFound {
                kind: ReferenceKind::Category,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_product_persist_failure_removes_files() {
        let mut products = MockProductRepository::new();
        products
            .expect_insert()
            .returning(|_| Err(CatalogError::Database("write failed".to_string())));

        let mut store = MockFileStore::new();
        store.expect_delete().times(2).returning(|_| Ok(()));

        let service = ProductService::new(products, references_all_exist(), Arc::new(store));
        let result = service.create_product(sample_input(), sample_artifact()).await;

        assert!(matches!(result, Err(CatalogError::Database(_))));
    }

    #[tokio::test]
    async fn test_create_product_invalid_input_removes_files() {
        let mut store = MockFileStore::new();
        store.expect_delete().times(2).returning(|_| Ok(()));

        let service = ProductService::new(
            MockProductRepository::new(),
            MockReferenceRepository::new(),
            Arc::new(store),
        );

        let input = CreateProduct {
            stocks: -1,
            ..sample_input()
        };
        let result = service.create_product(input, sample_artifact()).await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_product_unknown_id_removes_new_files() {
        let mut products = MockProductRepository::new();
        products.expect_get_by_id().returning(|_| Ok(None));

        let mut store = MockFileStore::new();
        store.expect_delete().times(2).returning(|_| Ok(()));

        let service = ProductService::new(products, MockReferenceRepository::new(), Arc::new(store));
        let result = service
            .update_product(
                Uuid::now_v7(),
                UpdateProduct::default(),
                Some(sample_artifact()),
            )
            .await;

        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_without_artifact_preserves_image_names() {
        let existing = Product::new(sample_input(), sample_artifact());
        let existing_clone = existing.clone();

        let mut products = MockProductRepository::new();
        products
            .expect_get_by_id()
            .returning(move |_| Ok(Some(existing_clone.clone())));
        products
            .expect_replace()
            .withf(|p| p.filename == "f.png" && p.thumb == "thumb-f.png" && p.price == 99.0)
            .returning(|p| Ok(p));

        let service =
            ProductService::new(products, references_all_exist(), untouched_store());
        let updated = service
            .update_product(
                existing.id,
                UpdateProduct {
                    price: Some(99.0),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.filename, "f.png");
    }

    #[tokio::test]
    async fn test_update_with_artifact_removes_previous_files() {
        let existing = Product::new(sample_input(), sample_artifact());
        let id = existing.id;
        let existing_clone = existing.clone();

        let mut products = MockProductRepository::new();
        products
            .expect_get_by_id()
            .returning(move |_| Ok(Some(existing_clone.clone())));
        products
            .expect_replace()
            .withf(|p| p.filename == "g.jpg" && p.thumb == "thumb-g.jpg")
            .returning(|p| Ok(p));

        let mut store = MockFileStore::new();
        store
            .expect_delete()
            .withf(|name| name == "f.png" || name == "thumb-f.png")
            .times(2)
            .returning(|_| Ok(()));

        let service = ProductService::new(products, references_all_exist(), Arc::new(store));
        let updated = service
            .update_product(
                id,
                UpdateProduct::default(),
                Some(ImageArtifact {
                    filename: "g.jpg".to_string(),
                    thumb: "thumb-g.jpg".to_string(),
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated.filename, "g.jpg");
    }

    #[tokio::test]
    async fn test_count_products_passes_filter_through() {
        let mut products = MockProductRepository::new();
        products
            .expect_count()
            .withf(|f| f.category.is_some())
            .returning(|_| Ok(7));

        let service = ProductService::new(
            products,
            MockReferenceRepository::new(),
            untouched_store(),
        );
        let count = service
            .count_products(ProductFilter {
                category: Some(Uuid::now_v7()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_delete_product_missing_id_is_not_found() {
        let mut products = MockProductRepository::new();
        products.expect_delete().returning(|_| Ok(false));

        let service = ProductService::new(
            products,
            MockReferenceRepository::new(),
            untouched_store(),
        );
        let result = service.delete_product(Uuid::now_v7()).await;

        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_product_keeps_files() {
        let mut products = MockProductRepository::new();
        products.expect_delete().returning(|_| Ok(true));

        // File store must not be touched on delete
        let service = ProductService::new(
            products,
            MockReferenceRepository::new(),
            untouched_store(),
        );
        service.delete_product(Uuid::now_v7()).await.unwrap();
    }
}
