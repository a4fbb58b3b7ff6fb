//! Products API routes

use axum::Router;
use axum_helpers::TokenVerifier;
use domain_catalog::{
    handlers, ImagePolicy, ImageProcessor, LocalFileStore, MongoProductRepository,
    MongoReferenceRepository, ProductService,
};
use std::sync::Arc;

use crate::state::AppState;

/// Create products router
pub fn router(state: &AppState, store: Arc<LocalFileStore>) -> Router {
    let service = ProductService::new(
        MongoProductRepository::new(&state.db),
        MongoReferenceRepository::new(&state.db),
        store.clone(),
    );

    let policy = ImagePolicy {
        max_bytes: state.config.media.max_upload_bytes,
        ..ImagePolicy::default()
    };
    let processor = ImageProcessor::new(policy, store);
    let verifier = TokenVerifier::new(&state.config.jwt);

    handlers::router(service, processor, verifier, state.config.auth_policy)
}

/// Initialize products indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    let repository = MongoProductRepository::new(&state.db);
    repository.init_indexes().await?;
    Ok(())
}
