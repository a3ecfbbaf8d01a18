pub mod handlers;

pub use handlers::{health_check, upload_boq, EstimateResponse};

use crate::service::EstimationService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 构建路由
pub fn build_router(service: Arc<EstimationService>, max_upload_bytes: usize) -> Router {
    let boq_routes = Router::new()
        .route("/api/projects/:project_id/boq/upload", post(upload_boq))
        .with_state(service);

    Router::new()
        .route("/health", get(health_check))
        .merge(boq_routes)
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(max_upload_bytes)))
}
