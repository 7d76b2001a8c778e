// src/models/order.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::rules::RuleViolation;

// --- Status ---

// Maps the `order_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Paid,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Fulfilled,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// The transition table. Terminal states have no way out.
    pub fn allowed_transitions(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Paid, Cancelled],
            Confirmed => &[Paid, Processing, Cancelled],
            Paid => &[Processing, Shipped, Cancelled],
            Processing => &[Shipped, Cancelled],
            Shipped => &[Delivered, Cancelled],
            Delivered | Fulfilled | Cancelled => &[],
        }
    }

    pub fn can_transition(self, to: OrderStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Seller-facing views show `fulfilled` as `delivered`.
    pub fn display_status(self) -> OrderStatus {
        match self {
            OrderStatus::Fulfilled => OrderStatus::Delivered,
            other => other,
        }
    }

    pub fn progress(self) -> u8 {
        progress_for(self.as_str())
    }

    /// Fails with `InvalidTransition` unless the table allows `self -> to`.
    pub fn ensure_transition(self, to: OrderStatus) -> Result<(), RuleViolation> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(RuleViolation::InvalidTransition { from: self, to })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Buyer progress bar percentage for a raw status literal. Unknown literals map to 0.
pub fn progress_for(status: &str) -> u8 {
    match status {
        "pending" => 0,
        "confirmed" => 25,
        "processing" => 50,
        "shipped" => 75,
        "delivered" => 100,
        "cancelled" => 0,
        _ => 0,
    }
}

// --- Carrier ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "carrier")]
pub enum Carrier {
    #[serde(rename = "USPS")]
    #[sqlx(rename = "USPS")]
    Usps,
    #[serde(rename = "UPS")]
    #[sqlx(rename = "UPS")]
    Ups,
    #[serde(rename = "FedEx")]
    #[sqlx(rename = "FedEx")]
    FedEx,
    #[serde(rename = "DHL")]
    #[sqlx(rename = "DHL")]
    Dhl,
    #[serde(rename = "Other")]
    #[sqlx(rename = "Other")]
    Other,
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Carrier::Usps => "USPS",
            Carrier::Ups => "UPS",
            Carrier::FedEx => "FedEx",
            Carrier::Dhl => "DHL",
            Carrier::Other => "Other",
        };
        f.write_str(name)
    }
}

// --- Order ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub listing_id: Uuid,
    pub title: String,
    #[schema(value_type = String, example = "66.60")]
    pub price: Decimal,
    pub quantity: i32,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub status: OrderStatus,
    #[schema(value_type = String, example = "133.20")]
    pub total: Decimal,
    #[sqlx(json)]
    pub items: Vec<OrderItem>,
    #[sqlx(json)]
    pub shipping_address: ShippingAddress,
    pub tracking_number: Option<String>,
    pub carrier: Option<Carrier>,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn can_ship(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    pub fn can_mark_delivered(&self) -> bool {
        self.status == OrderStatus::Shipped
    }

    pub fn can_cancel(&self) -> bool {
        !self.status.is_terminal()
    }

    /// True when this order was already shipped with exactly these details.
    pub fn already_shipped_with(&self, shipment: &Shipment) -> bool {
        self.status == OrderStatus::Shipped
            && self.carrier == Some(shipment.carrier)
            && self.tracking_number.as_deref() == Some(shipment.tracking_number.as_str())
    }
}

/// Which order actions the UI should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderActions {
    pub ship: bool,
    pub deliver: bool,
    pub cancel: bool,
}

impl OrderActions {
    pub fn for_order(order: &Order) -> Self {
        Self {
            ship: order.can_ship(),
            deliver: order.can_mark_delivered(),
            cancel: order.can_cancel(),
        }
    }
}

// --- Shipment ---

/// Ship form input exactly as the seller typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDraft {
    pub carrier: Option<Carrier>,
    #[serde(default)]
    pub tracking_number: String,
}

/// Ship details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub tracking_number: String,
    pub carrier: Carrier,
}

impl ShipmentDraft {
    pub fn new(carrier: Option<Carrier>, tracking_number: impl Into<String>) -> Self {
        Self { carrier, tracking_number: tracking_number.into() }
    }

    pub fn validate(&self) -> Result<Shipment, RuleViolation> {
        let carrier = self
            .carrier
            .ok_or(RuleViolation::MissingInformation("please select a carrier"))?;
        let tracking_number = self.tracking_number.trim();
        if tracking_number.is_empty() {
            return Err(RuleViolation::MissingInformation("please enter a tracking number"));
        }
        Ok(Shipment { tracking_number: tracking_number.to_string(), carrier })
    }
}

// --- Tracking ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub location: Option<String>,
    pub description: String,
    pub carrier: Option<Carrier>,
    pub tracking_number: Option<String>,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Statuses a seller may move an order into with a tracking update.
/// Payment and cancellation are not seller moves.
pub const SELLER_TRACKING_STATUSES: [OrderStatus; 3] =
    [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered];

/// Body of `POST /api/orders/{id}/tracking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdate {
    pub status: OrderStatus,
    #[validate(length(max = 500, message = "Notes are limited to 500 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[validate(length(max = 120))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Tracking number must be 1-64 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<Carrier>,
}

impl TrackingUpdate {
    pub fn status(status: OrderStatus) -> Self {
        Self { status, notes: None, location: None, tracking_number: None, carrier: None }
    }

    /// Checks the update against the order's current status and returns the
    /// shipment details it carries.
    ///
    /// Same status as the order: a note, always allowed. Otherwise the target
    /// must be on the fulfilment path and allowed by the transition table.
    /// Carrier and tracking number are required only when the update moves
    /// the order into `shipped`.
    pub fn check(&self, current: OrderStatus) -> Result<Option<Shipment>, RuleViolation> {
        let moves = self.status != current;
        if moves {
            if !SELLER_TRACKING_STATUSES.contains(&self.status) {
                return Err(RuleViolation::InvalidTransition { from: current, to: self.status });
            }
            current.ensure_transition(self.status)?;
        }

        let draft = ShipmentDraft::new(self.carrier, self.tracking_number.clone().unwrap_or_default());
        if moves && self.status == OrderStatus::Shipped {
            return draft.validate().map(Some);
        }
        Ok(draft.validate().ok())
    }

    pub fn description(&self) -> String {
        match self.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => notes.to_string(),
            _ => format!("Order {}", self.status),
        }
    }
}

/// What the buyer's tracking page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSummary {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub progress: u8,
    pub events: Vec<TrackingEvent>,
}

impl TrackingSummary {
    /// Newest event first; the newest event drives the progress bar, the order
    /// status is used while there are no events yet.
    pub fn build(order: &Order, mut events: Vec<TrackingEvent>) -> Self {
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let status = events.first().map(|e| e.status).unwrap_or(order.status);

        Self {
            order_id: order.id,
            status,
            progress: status.progress(),
            events,
        }
    }
}
