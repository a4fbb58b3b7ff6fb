use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Kind of reference entity a product points at.
///
/// Selects the MongoDB collection the entity lives in. References are
/// weak: products store bare identifiers, nothing is embedded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceKind {
    Author,
    Category,
    Provider,
    Publisher,
}

impl ReferenceKind {
    /// All kinds a product references, in document field order.
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::Author,
        ReferenceKind::Category,
        ReferenceKind::Provider,
        ReferenceKind::Publisher,
    ];

    pub fn collection_name(&self) -> &'static str {
        match self {
            ReferenceKind::Author => "authors",
            ReferenceKind::Category => "categories",
            ReferenceKind::Provider => "providers",
            ReferenceKind::Publisher => "publishers",
        }
    }
}

/// Reference entity (author, category, provider or publisher)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferenceEntity {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a reference entity
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReference {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

impl ReferenceEntity {
    pub fn new(input: CreateReference) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Derived image pair produced by the upload pipeline.
///
/// `filename` is the stored original, `thumb` the resized thumbnail.
/// Both are file names under the media root, never paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageArtifact {
    pub filename: String,
    pub thumb: String,
}

/// Product entity - represents a product stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Stored image file name derived from the upload
    pub filename: String,
    /// Optional display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub price: f64,
    pub description: String,
    /// Optional source url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Thumbnail file name derived from the upload
    pub thumb: String,
    /// Weak reference into the `authors` collection
    pub author: Uuid,
    /// Weak reference into the `categories` collection
    pub category: Uuid,
    /// Weak reference into the `providers` collection
    pub provider: Uuid,
    /// Weak reference into the `publishers` collection
    pub publisher: Uuid,
    /// Stock quantity
    pub stocks: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product (scalar multipart fields)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(length(min = 1))]
    pub description: String,
    pub url: Option<String>,
    pub author: Uuid,
    pub category: Uuid,
    pub provider: Uuid,
    pub publisher: Uuid,
    #[validate(range(min = 0))]
    pub stocks: i32,
}

/// DTO for partially updating a product (scalar multipart fields)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub url: Option<String>,
    pub author: Option<Uuid>,
    pub category: Option<Uuid>,
    pub provider: Option<Uuid>,
    pub publisher: Option<Uuid>,
    #[validate(range(min = 0))]
    pub stocks: Option<i32>,
}

impl UpdateProduct {
    /// Reference ids supplied in this update, paired with their kind.
    pub fn supplied_references(&self) -> Vec<(ReferenceKind, Uuid)> {
        let mut refs = Vec::new();
        if let Some(id) = self.author {
            refs.push((ReferenceKind::Author, id));
        }
        if let Some(id) = self.category {
            refs.push((ReferenceKind::Category, id));
        }
        if let Some(id) = self.provider {
            refs.push((ReferenceKind::Provider, id));
        }
        if let Some(id) = self.publisher {
            refs.push((ReferenceKind::Publisher, id));
        }
        refs
    }
}

/// Query filters for listing products
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ProductFilter {
    /// Filter by author id
    pub author: Option<Uuid>,
    /// Filter by category id
    pub category: Option<Uuid>,
    /// Filter by provider id
    pub provider: Option<Uuid>,
    /// Filter by publisher id
    pub publisher: Option<Uuid>,
    /// Maximum number of results
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Number of results to skip
    #[serde(default)]
    pub offset: u64,
}

pub(crate) fn default_limit() -> i64 {
    50
}

impl Product {
    /// Create a new product from the create DTO and a processed image pair
    pub fn new(input: CreateProduct, artifact: ImageArtifact) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            filename: artifact.filename,
            title: input.title,
            price: input.price,
            description: input.description,
            url: input.url,
            thumb: artifact.thumb,
            author: input.author,
            category: input.category,
            provider: input.provider,
            publisher: input.publisher,
            stocks: input.stocks,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Absent fields keep their current value;
    /// without a new artifact the stored filename/thumb are preserved.
    pub fn apply_update(&mut self, update: UpdateProduct, artifact: Option<ImageArtifact>) {
        if let Some(title) = update.title {
            self.title = Some(title);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(url) = update.url {
            self.url = Some(url);
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(provider) = update.provider {
            self.provider = provider;
        }
        if let Some(publisher) = update.publisher {
            self.publisher = publisher;
        }
        if let Some(stocks) = update.stocks {
            self.stocks = stocks;
        }
        if let Some(artifact) = artifact {
            self.filename = artifact.filename;
            self.thumb = artifact.thumb;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create() -> CreateProduct {
        CreateProduct {
            title: Some("Widget".to_string()),
            price: 9.99,
            description: "A widget".to_string(),
            url: None,
            author: Uuid::now_v7(),
            category: Uuid::now_v7(),
            provider: Uuid::now_v7(),
            publisher: Uuid::now_v7(),
            stocks: 5,
        }
    }

    fn sample_artifact() -> ImageArtifact {
        ImageArtifact {
            filename: "a.png".to_string(),
            thumb: "thumb-a.png".to_string(),
        }
    }

    #[test]
    fn test_apply_update_without_artifact_preserves_image_names() {
        let mut product = Product::new(sample_create(), sample_artifact());
        product.apply_update(
            UpdateProduct {
                price: Some(19.99),
                ..Default::default()
            },
            None,
        );
        assert_eq!(product.price, 19.99);
        assert_eq!(product.filename, "a.png");
        assert_eq!(product.thumb, "thumb-a.png");
    }

    #[test]
    fn test_apply_update_with_artifact_replaces_image_names() {
        let mut product = Product::new(sample_create(), sample_artifact());
        product.apply_update(
            UpdateProduct::default(),
            Some(ImageArtifact {
                filename: "b.jpg".to_string(),
                thumb: "thumb-b.jpg".to_string(),
            }),
        );
        assert_eq!(product.filename, "b.jpg");
        assert_eq!(product.thumb, "thumb-b.jpg");
    }

    #[test]
    fn test_supplied_references_only_lists_present_ids() {
        let author = Uuid::now_v7();
        let update = UpdateProduct {
            author: Some(author),
            ..Default::default()
        };
        assert_eq!(
            update.supplied_references(),
            vec![(ReferenceKind::Author, author)]
        );
        assert!(UpdateProduct::default().supplied_references().is_empty());
    }

    #[test]
    fn test_create_product_rejects_negative_price() {
        use validator::Validate;
        let input = CreateProduct {
            price: -1.0,
            ..sample_create()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_reference_kind_collection_names() {
        assert_eq!(ReferenceKind::Author.collection_name(), "authors");
        assert_eq!(ReferenceKind::Category.collection_name(), "categories");
        assert_eq!(ReferenceKind::Provider.collection_name(), "providers");
        assert_eq!(ReferenceKind::Publisher.collection_name(), "publishers");
    }
}
