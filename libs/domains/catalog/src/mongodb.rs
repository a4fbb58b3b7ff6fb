//! MongoDB implementations of the catalog repositories

use async_trait::async_trait;
use mongodb::{
    bson::{doc, to_bson, Bson},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{
    CreateReference, Product, ProductFilter, ReferenceEntity, ReferenceKind,
};
use crate::repository::{ProductRepository, ReferenceRepository};

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Product>("products");
        Self { collection }
    }

    /// Create a repository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Product>(collection_name);
        Self { collection }
    }

    /// Initialize indexes for the listing and filter paths
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            // Listing is newest-first
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "author": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_author".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "provider": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_provider".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "publisher": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_publisher".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }

    /// Build a MongoDB filter document from ProductFilter
    fn build_filter(filter: &ProductFilter) -> mongodb::bson::Document {
        let mut doc = doc! {};

        if let Some(author) = filter.author {
            doc.insert("author", to_bson(&author).unwrap_or(Bson::Null));
        }
        if let Some(category) = filter.category {
            doc.insert("category", to_bson(&category).unwrap_or(Bson::Null));
        }
        if let Some(provider) = filter.provider {
            doc.insert("provider", to_bson(&provider).unwrap_or(Bson::Null));
        }
        if let Some(publisher) = filter.publisher {
            doc.insert("publisher", to_bson(&publisher).unwrap_or(Bson::Null));
        }

        doc
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn insert(&self, product: Product) -> CatalogResult<Product> {
        self.collection.insert_one(&product).await?;
        tracing::info!(product_id = %product.id, "Product inserted");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let product = self.collection.find_one(filter).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        use futures_util::TryStreamExt;

        let mongo_filter = Self::build_filter(&filter);

        let options = mongodb::options::FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self
            .collection
            .find(mongo_filter)
            .with_options(options)
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn replace(&self, product: Product) -> CatalogResult<Product> {
        let filter = doc! { "_id": to_bson(&product.id).unwrap_or(Bson::Null) };
        self.collection.replace_one(filter, &product).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: ProductFilter) -> CatalogResult<u64> {
        let mongo_filter = Self::build_filter(&filter);
        let count = self.collection.count_documents(mongo_filter).await?;
        Ok(count)
    }
}

/// MongoDB implementation of the ReferenceRepository.
///
/// Each [`ReferenceKind`] maps to its own collection.
pub struct MongoReferenceRepository {
    db: Database,
}

impl MongoReferenceRepository {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    fn collection(&self, kind: ReferenceKind) -> Collection<ReferenceEntity> {
        self.db.collection::<ReferenceEntity>(kind.collection_name())
    }
}

#[async_trait]
impl ReferenceRepository for MongoReferenceRepository {
    #[instrument(skip(self))]
    async fn exists(&self, kind: ReferenceKind, id: Uuid) -> CatalogResult<bool> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let count = self.collection(kind).count_documents(filter).await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn get(&self, kind: ReferenceKind, id: Uuid) -> CatalogResult<Option<ReferenceEntity>> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let entity = self.collection(kind).find_one(filter).await?;
        Ok(entity)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create(
        &self,
        kind: ReferenceKind,
        input: CreateReference,
    ) -> CatalogResult<ReferenceEntity> {
        let entity = ReferenceEntity::new(input);
        self.collection(kind).insert_one(&entity).await?;
        tracing::info!(entity_id = %entity.id, %kind, "Reference entity created");
        Ok(entity)
    }

    #[instrument(skip(self))]
    async fn list(&self, kind: ReferenceKind) -> CatalogResult<Vec<ReferenceEntity>> {
        use futures_util::TryStreamExt;

        let options = mongodb::options::FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self
            .collection(kind)
            .find(doc! {})
            .with_options(options)
            .await?;
        let entities: Vec<ReferenceEntity> = cursor.try_collect().await?;

        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let filter = ProductFilter::default();
        let doc = MongoProductRepository::build_filter(&filter);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_category() {
        let filter = ProductFilter {
            category: Some(Uuid::now_v7()),
            ..Default::default()
        };
        let doc = MongoProductRepository::build_filter(&filter);
        assert!(doc.contains_key("category"));
        assert!(!doc.contains_key("author"));
    }

    #[test]
    fn test_build_filter_combines_references() {
        let filter = ProductFilter {
            author: Some(Uuid::now_v7()),
            publisher: Some(Uuid::now_v7()),
            ..Default::default()
        };
        let doc = MongoProductRepository::build_filter(&filter);
        assert!(doc.contains_key("author"));
        assert!(doc.contains_key("publisher"));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_build_filter_ignores_pagination() {
        let filter = ProductFilter {
            limit: 10,
            offset: 20,
            ..Default::default()
        };
        let doc = MongoProductRepository::build_filter(&filter);
        assert!(doc.is_empty());
    }
}
