//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the shared inventory service
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `validation.rs`: field checks run before the service is called
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;
pub mod validation;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/v1", routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
