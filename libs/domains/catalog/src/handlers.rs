//! HTTP handlers for the catalog API

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use axum_helpers::{
    bearer_auth_middleware,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    TokenVerifier, UuidPath,
};
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::image::ImageProcessor;
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::multipart;
use crate::repository::{ProductRepository, ReferenceRepository};
use crate::service::ProductService;

/// Room for the scalar fields next to the image part
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// OpenAPI documentation for the catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, ProductFilter),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Whether routes beyond the write endpoints require a bearer token.
///
/// Create and update are always token-gated. Delete historically is not;
/// the flag exists so deployments can close that gap without a release.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthPolicy {
    pub protect_delete: bool,
}

/// Shared handler state: the service plus the image pipeline
pub struct CatalogState<R: ProductRepository, E: ReferenceRepository> {
    pub service: ProductService<R, E>,
    pub processor: ImageProcessor,
}

/// Create the products router with all HTTP endpoints.
///
/// Reads are public; create and update require a bearer token; the delete
/// gate follows [`AuthPolicy`].
pub fn router<R, E>(
    service: ProductService<R, E>,
    processor: ImageProcessor,
    verifier: TokenVerifier,
    policy: AuthPolicy,
) -> Router
where
    R: ProductRepository + 'static,
    E: ReferenceRepository + 'static,
{
    let body_limit = processor.policy().max_bytes + MULTIPART_OVERHEAD_BYTES;
    let state = Arc::new(CatalogState { service, processor });
    let auth = middleware::from_fn_with_state(verifier, bearer_auth_middleware);

    let public = Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product));

    let protected = Router::new()
        .route("/", post(create_product))
        .route("/{id}", patch(update_product))
        .route_layer(auth.clone());

    let mut delete_routes = Router::new().route("/{id}", delete(delete_product));
    if policy.protect_delete {
        delete_routes = delete_routes.route_layer(auth);
    }

    public
        .merge(protected)
        .merge(delete_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// List products with optional reference filters
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ProductFilter),
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository, E: ReferenceRepository>(
    State(state): State<Arc<CatalogState<R, E>>>,
    Query(filter): Query<ProductFilter>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = state.service.list_products(filter).await?;
    Ok(Json(products))
}

/// Create a new product from a multipart request with an image part
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body(content = CreateProduct, content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository, E: ReferenceRepository>(
    State(state): State<Arc<CatalogState<R, E>>>,
    mut parts: Multipart,
) -> CatalogResult<impl IntoResponse> {
    let (input, upload) = multipart::parse_create(&mut parts).await?;

    // Reject bad scalar fields before any file is written
    input
        .validate()
        .map_err(|e| CatalogError::Validation(e.to_string()))?;

    let artifact = state.processor.process(upload).await?;
    let product = state.service.create_product(input, artifact).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository, E: ReferenceRepository>(
    State(state): State<Arc<CatalogState<R, E>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Product>> {
    let product = state.service.get_product(id).await?;
    Ok(Json(product))
}

/// Partially update a product, optionally replacing its image
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(content = UpdateProduct, content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository, E: ReferenceRepository>(
    State(state): State<Arc<CatalogState<R, E>>>,
    UuidPath(id): UuidPath,
    mut parts: Multipart,
) -> CatalogResult<Json<Product>> {
    let (input, upload) = multipart::parse_update(&mut parts).await?;

    input
        .validate()
        .map_err(|e| CatalogError::Validation(e.to_string()))?;

    let artifact = match upload {
        Some(upload) => Some(state.processor.process(upload).await?),
        None => None,
    };

    let product = state.service.update_product(id, input, artifact).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository, E: ReferenceRepository>(
    State(state): State<Arc<CatalogState<R, E>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<impl IntoResponse> {
    state.service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
