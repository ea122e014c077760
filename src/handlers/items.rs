use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};

use crate::{
    db,
    error::{AppError, AppResult},
    models::{Item, ItemPayload},
    AppState,
};

/// `Path` extractor whose rejection is rendered as a JSON `AppError`.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ItemPath<T>(pub T);

/// Decode a create/update body. The content type is not checked, only the JSON.
/// The body must be an object; serde would otherwise fill the fields from an array.
fn parse_payload(body: &[u8]) -> AppResult<ItemPayload> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_items(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<Item>>)> {
    let start = Instant::now();
    let mut conn = state.db.acquire().await?;
    let items = db::fetch_all_items(&mut conn).await?;

    debug!(
        count = items.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed items"
    );

    Ok((StatusCode::OK, Json(items)))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_item(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Item>)> {
    let payload = parse_payload(&body)?;

    let start = Instant::now();
    let mut conn = state.db.acquire().await?;
    let item = db::insert_item(&mut conn, &payload).await?;

    info!(
        id = item.id,
        name = item.name.as_deref().unwrap_or_default(),
        elapsed_ms = start.elapsed().as_millis(),
        "Created item"
    );

    Ok((StatusCode::CREATED, Json(item)))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_item(
    State(state): State<AppState>,
    ItemPath(id): ItemPath<i64>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Item>)> {
    let payload = parse_payload(&body)?;

    let mut conn = state.db.acquire().await?;
    let item = db::update_item(&mut conn, id, &payload).await?;

    info!(id = id, "Updated item");

    Ok((StatusCode::OK, Json(item)))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_item(
    State(state): State<AppState>,
    ItemPath(id): ItemPath<i64>,
) -> AppResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    let removed = db::delete_item(&mut conn, id).await?;

    info!(id = id, removed, "Deleted item");

    Ok(StatusCode::NO_CONTENT)
}
