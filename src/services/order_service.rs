// src/services/order_service.rs

use std::sync::Arc;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NewTrackingEvent, OrderRepository},
    models::{
        auth::User,
        order::{Order, OrderStatus, Shipment, ShipmentDraft, TrackingEvent, TrackingSummary, TrackingUpdate},
        rules::RuleViolation,
    },
    services::notification_service::BuyerNotifier,
};

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    notifier: Arc<dyn BuyerNotifier>,
    pool: PgPool,
}

/// Who may touch an order in a given call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    Buyer,
    Seller,
    Either,
}

impl Party {
    // Someone else's order answers like a missing one.
    fn check(self, order: &Order, user: &User) -> Result<(), AppError> {
        let allowed = match self {
            Party::Buyer => order.buyer_id == user.id,
            Party::Seller => order.seller_id == user.id,
            Party::Either => order.buyer_id == user.id || order.seller_id == user.id,
        };
        if allowed {
            Ok(())
        } else {
            Err(AppError::OrderNotFound(order.id))
        }
    }
}

impl OrderService {
    pub fn new(order_repo: OrderRepository, notifier: Arc<dyn BuyerNotifier>, pool: PgPool) -> Self {
        Self { order_repo, notifier, pool }
    }

    /// Loads and row-locks an order for a write, checking who is asking.
    async fn load_order(
        &self,
        conn: &mut PgConnection,
        user: &User,
        order_id: Uuid,
        party: Party,
    ) -> Result<Order, AppError> {
        let order = self
            .order_repo
            .lock_by_id(conn, order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))?;
        party.check(&order, user)?;
        Ok(order)
    }

    async fn notify_shipped(&self, order: &Order) {
        // The shipment is already committed; a failed e-mail must not undo it.
        if let Err(e) = self.notifier.order_shipped(order).await {
            tracing::warn!(order_id = %order.id, error = %e, "buyer notification failed");
        }
    }

    // --- READS ---

    pub async fn seller_orders(&self, seller: &User) -> Result<Vec<Order>, AppError> {
        self.order_repo.list_by_seller(seller.id).await
    }

    pub async fn get_order(&self, user: &User, order_id: Uuid) -> Result<Order, AppError> {
        let order = self
            .order_repo
            .find_by_id(&self.pool, order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))?;
        Party::Either.check(&order, user)?;
        Ok(order)
    }

    pub async fn tracking(&self, user: &User, order_id: Uuid) -> Result<TrackingSummary, AppError> {
        let order = self.get_order(user, order_id).await?;
        let events = self.order_repo.list_events(order_id).await?;
        Ok(TrackingSummary::build(&order, events))
    }

    // --- SHIP ---
    pub async fn ship(&self, seller: &User, order_id: Uuid, draft: &ShipmentDraft) -> Result<Order, AppError> {
        let shipment = draft.validate()?;

        let mut tx = self.pool.begin().await?;
        let order = self.load_order(&mut tx, seller, order_id, Party::Seller).await?;

        // Same request again: answer with the current state, append nothing.
        if order.already_shipped_with(&shipment) {
            tracing::info!(%order_id, "ship re-submitted with identical details, nothing to do");
            return Ok(order);
        }
        if !order.can_ship() {
            return Err(RuleViolation::InvalidTransition { from: order.status, to: OrderStatus::Shipped }.into());
        }

        let shipped = self
            .move_order(&mut tx, &order, OrderStatus::Shipped, Some(&shipment))
            .await?;
        self.record_event(
            &mut tx,
            order_id,
            OrderStatus::Shipped,
            None,
            &format!("Shipped via {}", shipment.carrier),
            Some(&shipment),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(%order_id, carrier = %shipment.carrier, "order shipped");
        self.notify_shipped(&shipped).await;
        Ok(shipped)
    }

    // --- DELIVER ---
    pub async fn deliver(&self, seller: &User, order_id: Uuid) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;
        let order = self.load_order(&mut tx, seller, order_id, Party::Seller).await?;

        if !order.can_mark_delivered() {
            return Err(RuleViolation::InvalidTransition { from: order.status, to: OrderStatus::Delivered }.into());
        }

        let delivered = self.move_order(&mut tx, &order, OrderStatus::Delivered, None).await?;
        self.record_event(&mut tx, order_id, OrderStatus::Delivered, None, "Delivered", None)
            .await?;
        tx.commit().await?;

        tracing::info!(%order_id, "order delivered");
        Ok(delivered)
    }

    // --- CANCEL (buyer) ---
    pub async fn cancel(&self, buyer: &User, order_id: Uuid) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;
        let order = self.load_order(&mut tx, buyer, order_id, Party::Buyer).await?;

        order.status.ensure_transition(OrderStatus::Cancelled)?;

        let cancelled = self.move_order(&mut tx, &order, OrderStatus::Cancelled, None).await?;
        self.record_event(&mut tx, order_id, OrderStatus::Cancelled, None, "Cancelled by buyer", None)
            .await?;
        tx.commit().await?;

        tracing::info!(%order_id, from = %order.status, "order cancelled");
        Ok(cancelled)
    }

    // --- TRACKING UPDATE (seller) ---
    // Same status as the order: a note. Different status: a fulfilment step.
    pub async fn add_tracking_event(
        &self,
        seller: &User,
        order_id: Uuid,
        update: &TrackingUpdate,
    ) -> Result<TrackingEvent, AppError> {
        let mut tx = self.pool.begin().await?;
        let order = self.load_order(&mut tx, seller, order_id, Party::Seller).await?;
        let shipment = update.check(order.status)?;

        let moved = if update.status != order.status {
            Some(self.move_order(&mut tx, &order, update.status, shipment.as_ref()).await?)
        } else {
            None
        };

        let event = self
            .record_event(
                &mut tx,
                order_id,
                update.status,
                update.location.as_deref(),
                &update.description(),
                shipment.as_ref(),
            )
            .await?;
        tx.commit().await?;

        tracing::info!(%order_id, status = %update.status, transitioned = moved.is_some(), "tracking event added");
        if let Some(order) = moved.filter(|o| o.status == OrderStatus::Shipped) {
            self.notify_shipped(&order).await;
        }
        Ok(event)
    }

    async fn move_order(
        &self,
        conn: &mut PgConnection,
        order: &Order,
        to: OrderStatus,
        shipment: Option<&Shipment>,
    ) -> Result<Order, AppError> {
        self.order_repo
            .transition_status(conn, order.id, order.status, to, shipment)
            .await?
            .ok_or(AppError::StaleOrder(order.id))
    }

    async fn record_event(
        &self,
        conn: &mut PgConnection,
        order_id: Uuid,
        status: OrderStatus,
        location: Option<&str>,
        description: &str,
        shipment: Option<&Shipment>,
    ) -> Result<TrackingEvent, AppError> {
        let event = NewTrackingEvent {
            order_id,
            status,
            location,
            description,
            carrier: shipment.map(|s| s.carrier),
            tracking_number: shipment.map(|s| s.tracking_number.as_str()),
        };
        self.order_repo.insert_event(conn, &event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;

    use crate::{
        models::{auth::Role, order::Carrier},
        services::notification_service::LogMailer,
    };

    fn service(pool: &PgPool) -> OrderService {
        OrderService::new(
            OrderRepository::new(pool.clone()),
            Arc::new(LogMailer::new("orders@example.test")),
            pool.clone(),
        )
    }

    async fn seed_order(pool: &PgPool, status: OrderStatus) -> Order {
        sqlx::query_as::<_, Order>(
            "INSERT INTO orders (buyer_id, seller_id, status, total) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4())
        .bind(status)
        .bind(Decimal::new(6660, 2))
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn event_count(pool: &PgPool, order_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM tracking_events WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn seller_of(order: &Order) -> User {
        User { id: order.seller_id, role: Role::Seller }
    }

    fn buyer_of(order: &Order) -> User {
        User { id: order.buyer_id, role: Role::Buyer }
    }

    fn ups(number: &str) -> ShipmentDraft {
        ShipmentDraft::new(Some(Carrier::Ups), number)
    }

    #[sqlx::test]
    async fn shipping_twice_with_same_details_records_one_event(pool: PgPool) {
        let order = seed_order(&pool, OrderStatus::Paid).await;
        let orders = service(&pool);

        let first = orders.ship(&seller_of(&order), order.id, &ups("1Z999")).await.unwrap();
        let second = orders.ship(&seller_of(&order), order.id, &ups(" 1Z999 ")).await.unwrap();

        assert_eq!(first.status, OrderStatus::Shipped);
        assert!(first.shipped_at.is_some());
        assert_eq!(second, first);
        assert_eq!(event_count(&pool, order.id).await, 1);
    }

    #[sqlx::test]
    async fn reshipping_with_other_details_is_a_conflict(pool: PgPool) {
        let order = seed_order(&pool, OrderStatus::Paid).await;
        let orders = service(&pool);
        orders.ship(&seller_of(&order), order.id, &ups("1Z999")).await.unwrap();

        let err = orders.ship(&seller_of(&order), order.id, &ups("1Z000")).await.unwrap_err();
        assert!(matches!(err, AppError::Rule(RuleViolation::InvalidTransition { .. })));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(event_count(&pool, order.id).await, 1);
    }

    #[sqlx::test]
    async fn another_sellers_order_is_not_found(pool: PgPool) {
        let order = seed_order(&pool, OrderStatus::Paid).await;
        let stranger = User { id: Uuid::new_v4(), role: Role::Seller };

        let err = service(&pool).ship(&stranger, order.id, &ups("1Z999")).await.unwrap_err();
        assert!(matches!(err, AppError::OrderNotFound(id) if id == order.id));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn transition_from_an_outdated_snapshot_is_stale(pool: PgPool) {
        let snapshot = seed_order(&pool, OrderStatus::Paid).await;
        sqlx::query("UPDATE orders SET status = 'cancelled' WHERE id = $1")
            .bind(snapshot.id)
            .execute(&pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let err = service(&pool)
            .move_order(&mut conn, &snapshot, OrderStatus::Shipped, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StaleOrder(id) if id == snapshot.id));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[sqlx::test]
    async fn tracking_note_keeps_status_and_fulfilment_step_moves_it(pool: PgPool) {
        let order = seed_order(&pool, OrderStatus::Shipped).await;
        let orders = service(&pool);
        let seller = seller_of(&order);

        let note = TrackingUpdate {
            notes: Some("Cleared customs".into()),
            location: Some("Salem, MA".into()),
            ..TrackingUpdate::status(OrderStatus::Shipped)
        };
        let event = orders.add_tracking_event(&seller, order.id, &note).await.unwrap();
        assert_eq!(event.description, "Cleared customs");
        assert_eq!(orders.get_order(&seller, order.id).await.unwrap().status, OrderStatus::Shipped);

        orders
            .add_tracking_event(&seller, order.id, &TrackingUpdate::status(OrderStatus::Delivered))
            .await
            .unwrap();
        let delivered = orders.get_order(&seller, order.id).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert!(delivered.delivered_at.is_some());

        let summary = orders.tracking(&buyer_of(&order), order.id).await.unwrap();
        assert_eq!(summary.events.len(), 2);
        assert_eq!(summary.progress, 100);
    }

    #[sqlx::test]
    async fn sellers_cannot_cancel_or_mark_paid_through_tracking(pool: PgPool) {
        let orders = service(&pool);

        for (from, to) in [
            (OrderStatus::Paid, OrderStatus::Cancelled),
            (OrderStatus::Pending, OrderStatus::Paid),
        ] {
            let order = seed_order(&pool, from).await;
            let err = orders
                .add_tracking_event(&seller_of(&order), order.id, &TrackingUpdate::status(to))
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::Rule(RuleViolation::InvalidTransition { .. })), "{from} -> {to}");
            assert_eq!(orders.get_order(&seller_of(&order), order.id).await.unwrap().status, from);
            assert_eq!(event_count(&pool, order.id).await, 0);
        }
    }

    #[sqlx::test]
    async fn only_the_buyer_cancels(pool: PgPool) {
        let order = seed_order(&pool, OrderStatus::Paid).await;
        let orders = service(&pool);

        let err = orders.cancel(&seller_of(&order), order.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let cancelled = orders.cancel(&buyer_of(&order), order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(event_count(&pool, order.id).await, 1);
    }
}
