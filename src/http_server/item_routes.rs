//! Item HTTP Routes
//!
//! One handler per operation. Each handler validates its input first,
//! then acquires a session, performs a single storage call and serializes
//! the result. The session is dropped when the handler returns.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::errors::{ApiError, ApiResult};
use crate::item::{parse_item_id, Item, ItemCreate, ListParams};
use crate::session::ItemStore;

// ==================
// Shared State
// ==================

/// State shared by item and health handlers
pub struct ItemsState {
    pub store: Arc<ItemStore>,
}

impl ItemsState {
    pub fn new(store: Arc<ItemStore>) -> Self {
        Self { store }
    }
}

// ==================
// Item Routes
// ==================

/// Create item routes. The collection is served with and without the
/// trailing slash.
pub fn item_routes(state: Arc<ItemsState>) -> Router {
    Router::new()
        .route("/items/", get(list_items_handler).post(create_item_handler))
        .route("/items", get(list_items_handler).post(create_item_handler))
        .route(
            "/items/:item_id",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        )
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn create_item_handler(
    State(state): State<Arc<ItemsState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let payload = ItemCreate::from_body(&body)?;

    let session = state.store.session();
    let item = session.create(&payload)?;

    Ok((StatusCode::CREATED, Json(item)))
}

async fn list_items_handler(
    State(state): State<Arc<ItemsState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Item>>> {
    let params = ListParams::from_query(&query)?;

    let session = state.store.session();
    let items = session.list(params)?;

    Ok(Json(items))
}

async fn get_item_handler(
    State(state): State<Arc<ItemsState>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Item>> {
    let id = parse_item_id(&raw_id)?;

    let session = state.store.session();
    let item = session.get(id)?.ok_or(ApiError::NotFound)?;

    Ok(Json(item))
}

async fn update_item_handler(
    State(state): State<Arc<ItemsState>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Item>> {
    let id = parse_item_id(&raw_id)?;
    let payload = ItemCreate::from_body(&body)?;

    let session = state.store.session();
    let item = session.update(id, &payload)?.ok_or(ApiError::NotFound)?;

    Ok(Json(item))
}

async fn delete_item_handler(
    State(state): State<Arc<ItemsState>>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_item_id(&raw_id)?;

    let session = state.store.session();
    if !session.delete(id)? {
        return Err(ApiError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
