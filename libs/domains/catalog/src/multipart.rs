//! Multipart decoding for the product write endpoints.
//!
//! The wire format is `multipart/form-data` with scalar text fields and a
//! single image part named `imageUrl`.

use axum::extract::Multipart;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::image::ImageUpload;
use crate::models::{CreateProduct, UpdateProduct};

/// Name of the image part in product write requests
pub const IMAGE_FIELD: &str = "imageUrl";

#[derive(Debug, Default)]
struct RawProductFields {
    title: Option<String>,
    price: Option<String>,
    description: Option<String>,
    url: Option<String>,
    author: Option<String>,
    category: Option<String>,
    provider: Option<String>,
    publisher: Option<String>,
    stocks: Option<String>,
}

impl RawProductFields {
    fn into_create(self) -> CatalogResult<CreateProduct> {
        Ok(CreateProduct {
            title: self.title,
            price: parse_f64(&require(self.price, "price")?, "price")?,
            description: require(self.description, "description")?,
            url: self.url,
            author: parse_uuid(&require(self.author, "author")?, "author")?,
            category: parse_uuid(&require(self.category, "category")?, "category")?,
            provider: parse_uuid(&require(self.provider, "provider")?, "provider")?,
            publisher: parse_uuid(&require(self.publisher, "publisher")?, "publisher")?,
            stocks: parse_i32(&require(self.stocks, "stocks")?, "stocks")?,
        })
    }

    fn into_update(self) -> CatalogResult<UpdateProduct> {
        Ok(UpdateProduct {
            title: self.title,
            price: self.price.map(|v| parse_f64(&v, "price")).transpose()?,
            description: self.description,
            url: self.url,
            author: self.author.map(|v| parse_uuid(&v, "author")).transpose()?,
            category: self.category.map(|v| parse_uuid(&v, "category")).transpose()?,
            provider: self.provider.map(|v| parse_uuid(&v, "provider")).transpose()?,
            publisher: self
                .publisher
                .map(|v| parse_uuid(&v, "publisher"))
                .transpose()?,
            stocks: self.stocks.map(|v| parse_i32(&v, "stocks")).transpose()?,
        })
    }
}

fn require(value: Option<String>, field: &str) -> CatalogResult<String> {
    value.ok_or_else(|| CatalogError::Validation(format!("Field '{field}' is required")))
}

fn parse_f64(value: &str, field: &str) -> CatalogResult<f64> {
    value
        .parse()
        .map_err(|_| CatalogError::Validation(format!("Field '{field}' must be a number")))
}

fn parse_i32(value: &str, field: &str) -> CatalogResult<i32> {
    value
        .parse()
        .map_err(|_| CatalogError::Validation(format!("Field '{field}' must be an integer")))
}

fn parse_uuid(value: &str, field: &str) -> CatalogResult<Uuid> {
    value
        .parse()
        .map_err(|_| CatalogError::Validation(format!("Field '{field}' must be a UUID")))
}

async fn collect(
    multipart: &mut Multipart,
) -> CatalogResult<(RawProductFields, Option<ImageUpload>)> {
    let mut fields = RawProductFields::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        CatalogError::Validation(format!("Malformed multipart request: {e}"))
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(|e| {
                CatalogError::Validation(format!("Failed to read image part: {e}"))
            })?;
            upload = Some(ImageUpload {
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let text = field.text().await.map_err(|e| {
            CatalogError::Validation(format!("Failed to read field '{name}': {e}"))
        })?;

        match name.as_str() {
            "title" => fields.title = Some(text),
            "price" => fields.price = Some(text),
            "description" => fields.description = Some(text),
            "url" => fields.url = Some(text),
            "author" => fields.author = Some(text),
            "category" => fields.category = Some(text),
            "provider" => fields.provider = Some(text),
            "publisher" => fields.publisher = Some(text),
            "stocks" => fields.stocks = Some(text),
            // Unknown fields are ignored
            _ => {}
        }
    }

    Ok((fields, upload))
}

/// Decode a create request: all required scalar fields plus the image part.
pub async fn parse_create(
    multipart: &mut Multipart,
) -> CatalogResult<(CreateProduct, ImageUpload)> {
    let (fields, upload) = collect(multipart).await?;
    let upload = upload.ok_or_else(|| {
        CatalogError::Validation(format!("Image field '{IMAGE_FIELD}' is required"))
    })?;
    Ok((fields.into_create()?, upload))
}

/// Decode an update request: any subset of scalar fields, image optional.
pub async fn parse_update(
    multipart: &mut Multipart,
) -> CatalogResult<(UpdateProduct, Option<ImageUpload>)> {
    let (fields, upload) = collect(multipart).await?;
    Ok((fields.into_update()?, upload))
}
