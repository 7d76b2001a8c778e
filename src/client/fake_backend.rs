// src/client/fake_backend.rs

//! In-process stand-in for the market API, bound to `127.0.0.1:0`, used by the
//! client tests. Records every request it receives.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::{
    client::{api::ApiClient, config::ClientConfig},
    models::{
        listing::{BulkUpdate, Listing, StockUpdate},
        order::{Order, OrderStatus, Shipment},
    },
};

#[derive(Default)]
struct FakeState {
    listings: Mutex<Vec<Listing>>,
    orders: Mutex<Vec<Order>>,
    hits: Mutex<Vec<String>>,
    bodies: Mutex<Vec<Value>>,
}

pub(crate) struct FakeBackend {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());

        let app = Router::new()
            .route("/api/seller/listings", get(list_listings))
            .route("/api/seller/listings/bulk", put(bulk_update))
            .route("/api/seller/low-stock", get(low_stock))
            .route("/api/listings/{id}/stock", put(update_stock))
            .route("/api/seller/orders", get(list_orders))
            .route("/api/orders/{id}", get(get_order))
            .route("/api/orders/{id}/ship", post(ship_order))
            .route("/api/orders/{id}/deliver", post(deliver_order))
            .route("/api/empty", get(|| async { StatusCode::NO_CONTENT }))
            .route(
                "/api/boom",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "kaboom" }))) }),
            )
            .route(
                "/api/locked",
                get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid token" }))) }),
            )
            .route("/api/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend crashed");
        });

        Self { base_url: format!("http://{addr}"), state }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone()).with_timeout(5)
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.config()).expect("api client")
    }

    pub fn seed_listings(&self, listings: Vec<Listing>) {
        *self.state.listings.lock() = listings;
    }

    pub fn seed_orders(&self, orders: Vec<Order>) {
        *self.state.orders.lock() = orders;
    }

    /// `"METHOD /path"` for every request so far.
    pub fn hits(&self) -> Vec<String> {
        self.state.hits.lock().clone()
    }

    pub fn hits_for(&self, route: &str) -> usize {
        self.state.hits.lock().iter().filter(|hit| hit.as_str() == route).count()
    }

    /// JSON body of the most recent request that had one.
    pub fn last_body(&self) -> Option<Value> {
        self.state.bodies.lock().last().cloned()
    }
}

async fn record(State(state): State<Arc<FakeState>>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    state.hits.lock().push(format!("{} {}", parts.method, parts.uri.path()));
    if let Ok(json) = serde_json::from_slice::<Value>(&bytes) {
        state.bodies.lock().push(json);
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// --- Listings ---

async fn list_listings(State(state): State<Arc<FakeState>>) -> Json<Vec<Listing>> {
    Json(state.listings.lock().clone())
}

async fn low_stock(State(state): State<Arc<FakeState>>) -> Json<Vec<Listing>> {
    let mut low: Vec<Listing> = state
        .listings
        .lock()
        .iter()
        .filter(|l| l.stock_quantity <= l.low_stock_threshold)
        .cloned()
        .collect();
    low.sort_by_key(|l| l.stock_quantity);
    Json(low)
}

async fn update_stock(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockUpdate>,
) -> Response {
    let mut listings = state.listings.lock();
    match listings.iter_mut().find(|l| l.id == id) {
        Some(listing) => {
            listing.stock_quantity = payload.quantity as i32;
            Json(listing.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Listing not found" }))).into_response(),
    }
}

async fn bulk_update(State(state): State<Arc<FakeState>>, Json(payload): Json<BulkUpdate>) -> Json<Vec<Listing>> {
    let mut listings = state.listings.lock();
    let mut updated = Vec::new();
    for patch in &payload.updates {
        if let Some(listing) = listings.iter_mut().find(|l| l.id == patch.id) {
            if let Some(new_state) = patch.state {
                listing.state = new_state;
            }
            if let Some(threshold) = patch.low_stock_threshold {
                listing.low_stock_threshold = threshold;
            }
            updated.push(listing.clone());
        }
    }
    Json(updated)
}

// --- Orders ---

async fn list_orders(State(state): State<Arc<FakeState>>) -> Json<Vec<Order>> {
    Json(state.orders.lock().clone())
}

fn with_order(state: &FakeState, id: Uuid, change: impl FnOnce(&mut Order)) -> Response {
    let mut orders = state.orders.lock();
    match orders.iter_mut().find(|o| o.id == id) {
        Some(order) => {
            change(order);
            Json(order.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Order not found" }))).into_response(),
    }
}

async fn get_order(State(state): State<Arc<FakeState>>, Path(id): Path<Uuid>) -> Response {
    with_order(&state, id, |_| {})
}

async fn ship_order(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<Uuid>,
    Json(shipment): Json<Shipment>,
) -> Response {
    with_order(&state, id, |order| {
        order.status = OrderStatus::Shipped;
        order.carrier = Some(shipment.carrier);
        order.tracking_number = Some(shipment.tracking_number);
    })
}

async fn deliver_order(State(state): State<Arc<FakeState>>, Path(id): Path<Uuid>) -> Response {
    with_order(&state, id, |order| order.status = OrderStatus::Delivered)
}

async fn whoami(headers: HeaderMap) -> Json<Value> {
    let read = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
    Json(json!({
        "authorization": read(header::AUTHORIZATION),
        "cookie": read(header::COOKIE),
    }))
}
