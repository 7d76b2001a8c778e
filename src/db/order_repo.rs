// src/db/order_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::order::{Carrier, Order, OrderStatus, Shipment, TrackingEvent},
};

/// Row to append to `tracking_events`.
#[derive(Debug, Clone)]
pub struct NewTrackingEvent<'a> {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub location: Option<&'a str>,
    pub description: &'a str,
    pub carrier: Option<Carrier>,
    pub tracking_number: Option<&'a str>,
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ORDERS
    // =========================================================================

    pub async fn list_by_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE seller_id = $1 ORDER BY created_at DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    /// Same as `find_by_id` but holds the row lock until the transaction ends,
    /// so two writers on one order run one after the other.
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    /// Moves the order from `from` to `to` only if it is still in `from`.
    /// Stamps `shipped_at`/`delivered_at` and records the shipment when given.
    /// `None` means the row was not in `from` any more.
    pub async fn transition_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        shipment: Option<&Shipment>,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $3,
                tracking_number = COALESCE($4, tracking_number),
                carrier = COALESCE($5, carrier),
                shipped_at = CASE WHEN $3 = 'shipped'::order_status THEN now() ELSE shipped_at END,
                delivered_at = CASE
                    WHEN $3 IN ('delivered'::order_status, 'fulfilled'::order_status) THEN now()
                    ELSE delivered_at
                END
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(shipment.map(|s| s.tracking_number.as_str()))
        .bind(shipment.map(|s| s.carrier))
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    // =========================================================================
    //  TRACKING EVENTS
    // =========================================================================

    pub async fn insert_event<'e, E>(
        &self,
        executor: E,
        event: &NewTrackingEvent<'_>,
    ) -> Result<TrackingEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let event = sqlx::query_as::<_, TrackingEvent>(
            r#"
            INSERT INTO tracking_events (order_id, status, location, description, carrier, tracking_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(event.order_id)
        .bind(event.status)
        .bind(event.location)
        .bind(event.description)
        .bind(event.carrier)
        .bind(event.tracking_number)
        .fetch_one(executor)
        .await?;
        Ok(event)
    }

    /// Newest first.
    pub async fn list_events(&self, order_id: Uuid) -> Result<Vec<TrackingEvent>, AppError> {
        let events = sqlx::query_as::<_, TrackingEvent>(
            "SELECT * FROM tracking_events WHERE order_id = $1 ORDER BY created_at DESC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }
}
