// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        role::{RequireRole, Seller},
    },
    models::order::{Order, ShipmentDraft, TrackingEvent, TrackingSummary, TrackingUpdate},
};

#[utoipa::path(
    get,
    path = "/api/seller/orders",
    tag = "Orders",
    responses((status = 200, description = "Seller's orders, newest first", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn seller_orders(
    State(app_state): State<AppState>,
    seller: RequireRole<Seller>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.seller_orders(seller.user()).await?;
    Ok((StatusCode::OK, Json(orders)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, body = Order),
        (status = 404, description = "No such order for this caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.get_order(&user, order_id).await?;
    Ok((StatusCode::OK, Json(order)))
}

// --- Seller transitions ---

#[utoipa::path(
    post,
    path = "/api/orders/{id}/ship",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = ShipmentDraft,
    responses(
        (status = 200, description = "Order in `shipped` with its tracking details", body = Order),
        (status = 400, description = "Missing carrier or tracking number"),
        (status = 409, description = "Order cannot ship from its current status")
    ),
    security(("api_jwt" = []))
)]
pub async fn ship_order(
    State(app_state): State<AppState>,
    seller: RequireRole<Seller>,
    Path(order_id): Path<Uuid>,
    Json(draft): Json<ShipmentDraft>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .order_service
        .ship(seller.user(), order_id, &draft)
        .await?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/deliver",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, body = Order),
        (status = 409, description = "Order is not shipped")
    ),
    security(("api_jwt" = []))
)]
pub async fn deliver_order(
    State(app_state): State<AppState>,
    seller: RequireRole<Seller>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.deliver(seller.user(), order_id).await?;
    Ok((StatusCode::OK, Json(order)))
}

// --- Buyer ---

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, body = Order),
        (status = 409, description = "Order is already terminal")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_order(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.cancel(&user, order_id).await?;
    Ok((StatusCode::OK, Json(order)))
}

// --- Tracking ---

#[utoipa::path(
    get,
    path = "/api/orders/{id}/tracking",
    tag = "Tracking",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "Events newest first plus the derived progress", body = TrackingSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_tracking(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.order_service.tracking(&user, order_id).await?;
    Ok((StatusCode::OK, Json(summary)))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/tracking",
    tag = "Tracking",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = TrackingUpdate,
    responses(
        (status = 201, body = TrackingEvent),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Status change not allowed")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_tracking_event(
    State(app_state): State<AppState>,
    seller: RequireRole<Seller>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<TrackingUpdate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let event = app_state
        .order_service
        .add_tracking_event(seller.user(), order_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}
