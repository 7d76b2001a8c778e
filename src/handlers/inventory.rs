// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::role::{RequireRole, Seller},
    models::listing::{BulkUpdate, Listing, ListingFilter, StockUpdate},
};

// ---
// Handler: list_listings
// ---
#[utoipa::path(
    get,
    path = "/api/seller/listings",
    tag = "Inventory",
    params(ListingFilter),
    responses(
        (status = 200, description = "Seller's listings matching the filters", body = Vec<Listing>),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Caller is not a seller")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_listings(
    State(app_state): State<AppState>,
    seller: RequireRole<Seller>,
    Query(filter): Query<ListingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let listings = app_state
        .inventory_service
        .list_listings(seller.user().id, &filter)
        .await?;

    Ok((StatusCode::OK, Json(listings)))
}

// ---
// Handler: low_stock
// ---
#[utoipa::path(
    get,
    path = "/api/seller/low-stock",
    tag = "Inventory",
    responses(
        (status = 200, description = "Listings at or below their threshold, emptiest first", body = Vec<Listing>)
    ),
    security(("api_jwt" = []))
)]
pub async fn low_stock(
    State(app_state): State<AppState>,
    seller: RequireRole<Seller>,
) -> Result<impl IntoResponse, AppError> {
    let listings = app_state.inventory_service.low_stock(seller.user().id).await?;
    Ok((StatusCode::OK, Json(listings)))
}

// ---
// Handler: update_stock
// ---
#[utoipa::path(
    put,
    path = "/api/listings/{id}/stock",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body = StockUpdate,
    responses(
        (status = 200, description = "Listing with the new quantity", body = Listing),
        (status = 400, description = "Negative or oversized quantity"),
        (status = 403, description = "Caller is not a seller"),
        (status = 404, description = "No such listing for this seller")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_stock(
    State(app_state): State<AppState>,
    seller: RequireRole<Seller>,
    Path(listing_id): Path<Uuid>,
    Json(payload): Json<StockUpdate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let listing = app_state
        .inventory_service
        .update_stock(seller.user().id, listing_id, payload.quantity)
        .await?;

    Ok((StatusCode::OK, Json(listing)))
}

// ---
// Handler: bulk_update
// ---
#[utoipa::path(
    put,
    path = "/api/seller/listings/bulk",
    tag = "Inventory",
    request_body = BulkUpdate,
    responses(
        (status = 200, description = "Every patched listing; nothing is written if one patch fails", body = Vec<Listing>),
        (status = 400, description = "Empty selection or invalid value"),
        (status = 404, description = "A listing is missing or belongs to another seller")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_update(
    State(app_state): State<AppState>,
    seller: RequireRole<Seller>,
    Json(payload): Json<BulkUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let listings = app_state
        .inventory_service
        .bulk_update(seller.user().id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(listings)))
}
