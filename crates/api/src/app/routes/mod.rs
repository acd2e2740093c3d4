use axum::Router;

pub mod drugs;
pub mod system;

/// Router for the versioned API.
pub fn router() -> Router {
    Router::new().nest("/drugs", drugs::router())
}
