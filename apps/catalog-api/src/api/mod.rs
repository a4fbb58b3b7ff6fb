//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use domain_catalog::LocalFileStore;
use std::sync::Arc;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState, store: Arc<LocalFileStore>) -> Router {
    Router::new()
        .nest("/v1/products", products::router(state, store))
        .merge(health::router(state.clone()))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    products::init_indexes(state).await
}
