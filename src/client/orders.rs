// src/client/orders.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    client::{
        api::ApiClient,
        cache::{QueryCache, QueryKey},
        error::ClientResult,
    },
    models::{
        order::{Order, OrderActions, OrderStatus, ShipmentDraft, TrackingEvent, TrackingSummary, TrackingUpdate},
        rules::RuleViolation,
    },
};

const SELLER_ORDERS_PATH: &str = "/api/seller/orders";

fn order_path(order_id: Uuid) -> String {
    format!("/api/orders/{order_id}")
}

/// Seller order management and buyer order tracking.
#[derive(Debug, Clone)]
pub struct OrderDesk {
    api: ApiClient,
    cache: Arc<QueryCache>,
}

impl OrderDesk {
    pub fn new(api: ApiClient, cache: Arc<QueryCache>) -> Self {
        Self { api, cache }
    }

    pub async fn orders(&self) -> ClientResult<Vec<Order>> {
        self.cache.fetch(&self.api, SELLER_ORDERS_PATH).await
    }

    pub async fn order(&self, order_id: Uuid) -> ClientResult<Order> {
        self.cache.fetch(&self.api, &order_path(order_id)).await
    }

    pub async fn tracking(&self, order_id: Uuid) -> ClientResult<TrackingSummary> {
        self.cache
            .fetch(&self.api, &format!("{}/tracking", order_path(order_id)))
            .await
    }

    pub fn actions(order: &Order) -> OrderActions {
        OrderActions::for_order(order)
    }

    /// Ships a paid order. Missing carrier or tracking number is caught here
    /// and nothing is sent.
    pub async fn ship(&self, order: &Order, draft: &ShipmentDraft) -> ClientResult<Order> {
        let shipment = draft.validate()?;
        if !order.can_ship() {
            return Err(RuleViolation::InvalidTransition { from: order.status, to: OrderStatus::Shipped }.into());
        }

        let shipped: Order = self
            .api
            .post(&format!("{}/ship", order_path(order.id)), &shipment)
            .await?;

        self.invalidate_order(order.id);
        tracing::info!(order_id = %order.id, carrier = %shipment.carrier, "order shipped");
        Ok(shipped)
    }

    pub async fn deliver(&self, order: &Order) -> ClientResult<Order> {
        if !order.can_mark_delivered() {
            return Err(RuleViolation::InvalidTransition { from: order.status, to: OrderStatus::Delivered }.into());
        }

        let delivered: Order = self
            .api
            .post_empty(&format!("{}/deliver", order_path(order.id)))
            .await?;

        self.invalidate_order(order.id);
        tracing::info!(order_id = %order.id, "order delivered");
        Ok(delivered)
    }

    /// Buyer-side cancellation of a non-terminal order.
    pub async fn cancel(&self, order: &Order) -> ClientResult<Order> {
        order.status.ensure_transition(OrderStatus::Cancelled)?;

        let cancelled: Order = self
            .api
            .post_empty(&format!("{}/cancel", order_path(order.id)))
            .await?;

        self.invalidate_order(order.id);
        Ok(cancelled)
    }

    pub async fn add_tracking_event(&self, order: &Order, update: &TrackingUpdate) -> ClientResult<TrackingEvent> {
        update.validate()?;
        update.check(order.status)?;

        let event: TrackingEvent = self
            .api
            .post(&format!("{}/tracking", order_path(order.id)), update)
            .await?;

        self.invalidate_order(order.id);
        Ok(event)
    }

    // Order detail and tracking share the `/api/orders/{id}` prefix.
    fn invalidate_order(&self, order_id: Uuid) {
        self.cache.invalidate(&QueryKey::from_path(SELLER_ORDERS_PATH));
        self.cache.invalidate(&QueryKey::from_path(&order_path(order_id)));
    }
}
