use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use pharmatrack_core::{DrugId, PageRequest};
use pharmatrack_inventory::{DEFAULT_EXPIRING_WINDOW_DAYS, DEFAULT_LOW_STOCK_THRESHOLD};

use crate::app::services::AppServices;
use crate::app::{dto, errors, validation};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_drugs).post(create_drug))
        .route("/categories", get(get_categories))
        .route("/low-stock", get(get_low_stock))
        .route("/expiring-soon", get(get_expiring_soon))
        .route("/paged", get(list_drugs_paged))
        .route("/batch", post(batch_create_drugs))
        .route("/:id", get(get_drug).put(update_drug).delete(delete_drug))
}

fn parse_id(raw: &str) -> Result<DrugId, axum::response::Response> {
    raw.parse::<DrugId>().map_err(errors::invalid_id)
}

pub async fn list_drugs(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListDrugsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };

    let drugs = services.drugs();
    let result = if query.search.is_some() || query.category.is_some() {
        drugs
            .search_drugs(query.search.as_deref().unwrap_or(""), query.category.as_deref())
            .await
    } else {
        drugs.get_all_drugs().await
    };

    match result {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_categories(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.drugs().get_categories().await {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_low_stock(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::LowStockQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };

    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    match services.drugs().get_low_stock_drugs(threshold).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_expiring_soon(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ExpiringSoonQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };

    let days = query.days.unwrap_or(DEFAULT_EXPIRING_WINDOW_DAYS);
    match services.drugs().get_expiring_soon_drugs(days).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn list_drugs_paged(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::PagedDrugsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::invalid_pagination(e.body_text()),
    };

    let request = match PageRequest::from_optional(query.page, query.page_size) {
        Ok(r) => r,
        Err(e) => return errors::invalid_pagination(e.to_string()),
    };

    match services
        .drugs()
        .list_drugs_page(query.search.as_deref(), request)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(dto::PageResponse::from(page))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_drug(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.drugs().get_drug_by_id(id).await {
        Ok(drug) => (StatusCode::OK, Json(drug)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn create_drug(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateDrugRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    let input = match validation::validate_create(body) {
        Ok(v) => v,
        Err(detail) => return errors::validation_failed(detail),
    };

    match services.drugs().create_drug(input).await {
        Ok(drug) => {
            tracing::info!(id = %drug.id, sku = %drug.sku, "drug created");
            (StatusCode::CREATED, Json(drug)).into_response()
        }
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn batch_create_drugs(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Vec<dto::CreateDrugRequest>>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    let inputs = match validation::validate_batch(body) {
        Ok(v) => v,
        Err(detail) => return errors::validation_failed(detail),
    };

    match services.drugs().batch_create_drugs(inputs).await {
        Ok(created) => {
            tracing::info!(count = created.len(), "drug batch created");
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn update_drug(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateDrugRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    let patch = match validation::validate_update(body) {
        Ok(v) => v,
        Err(detail) => return errors::validation_failed(detail),
    };

    match services.drugs().update_drug(id, patch).await {
        Ok(drug) => (StatusCode::OK, Json(drug)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn delete_drug(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.drugs().delete_drug(id).await {
        Ok(ack) => {
            tracing::info!(id = %id, "drug deleted");
            (StatusCode::OK, Json(ack)).into_response()
        }
        Err(e) => errors::inventory_error_to_response(e),
    }
}
