use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    envelope::Envelope,
    error::{AppError, AppResult},
    record::Record,
    state::AppState,
};

/// Longest accepted `:id` path parameter, in characters.
pub const MAX_ID_LEN: usize = 256;

/// Fixed list served by `GET /items`.
pub const ITEMS: [&str; 3] = ["Item 1", "Item 2", "Item 3"];

/// Request body of create and update: `{"product": {...}}`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductPayload {
    #[serde(default)]
    pub product: Record,
}

pub async fn healthcheck() -> Envelope {
    Envelope::message("Server is running")
}

/// Answers paths that match no route.
pub async fn route_not_found() -> Envelope {
    Envelope::error(StatusCode::NOT_FOUND, "Route not found")
}

/// Answers known paths requested with an unsupported method.
pub async fn method_not_allowed() -> Envelope {
    Envelope::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub async fn list_items() -> Envelope<[&'static str; 3]> {
    Envelope::data(ITEMS)
}

pub async fn list_products(State(state): State<AppState>) -> Envelope<Vec<Record>> {
    Envelope::data(state.repo.list().await)
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> AppResult<Envelope<Record>> {
    let Json(payload) = payload.map_err(reject_body)?;

    let product = state
        .repo
        .create(payload.product)
        .await
        .map_err(|err| AppError::from_catalog(err, "Failed to save product"))?;

    info!(id = ?product.get("id"), "product created");
    Ok(Envelope::data(product).with_message("Product created"))
}

pub async fn update_product(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> AppResult<Envelope> {
    let id = product_id(id)?;
    let Json(payload) = payload.map_err(reject_body)?;

    state
        .repo
        .update(&id, payload.product)
        .await
        .map_err(|err| AppError::from_catalog(err, "Failed to save product"))?;

    info!(%id, "product updated");
    Ok(Envelope::message("Product updated"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<Envelope> {
    let id = product_id(id)?;

    state
        .repo
        .delete(&id)
        .await
        .map_err(|err| AppError::from_catalog(err, "Failed to save products"))?;

    info!(%id, "product deleted");
    Ok(Envelope::message("Product deleted"))
}

/// Extracts the `:id` path parameter, answering bad ids with an error envelope.
fn product_id(id: Result<Path<String>, PathRejection>) -> AppResult<String> {
    let Path(id) = id.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    validate_id(&id)?;
    Ok(id)
}

fn validate_id(id: &str) -> AppResult<()> {
    if id.chars().count() > MAX_ID_LEN {
        return Err(AppError::validation(format!(
            "Invalid id: must be at most {MAX_ID_LEN} characters"
        )));
    }
    Ok(())
}

fn reject_body(rejection: JsonRejection) -> AppError {
    AppError::validation(rejection.body_text())
}
