// src/services/notification_service.rs

use async_trait::async_trait;

use crate::{common::error::AppError, models::order::Order};

/// Tells buyers about changes to their orders.
#[async_trait]
pub trait BuyerNotifier: Send + Sync {
    async fn order_shipped(&self, order: &Order) -> Result<(), AppError>;
}

/// Stand-in for the e-mail provider: writes the message to the log.
#[derive(Debug, Clone)]
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self { sender: sender.into() }
    }
}

#[async_trait]
impl BuyerNotifier for LogMailer {
    async fn order_shipped(&self, order: &Order) -> Result<(), AppError> {
        let carrier = order.carrier.map(|c| c.to_string()).unwrap_or_default();
        tracing::info!(
            from = %self.sender,
            buyer_id = %order.buyer_id,
            order_id = %order.id,
            %carrier,
            tracking_number = order.tracking_number.as_deref().unwrap_or(""),
            "📦 shipment notification sent"
        );
        Ok(())
    }
}
