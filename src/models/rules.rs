// src/models/rules.rs

use thiserror::Error;

use crate::models::order::OrderStatus;

// Domain rule violations, shared by the API client (rejected before any
// request goes out) and by the server services (rejected before touching the DB).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("Missing information: {0}")]
    MissingInformation(&'static str),

    #[error("Cannot move order from '{from}' to '{to}'")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Stock quantity must be a non-negative integer (got {0})")]
    NegativeQuantity(i64),

    #[error("Low-stock threshold must be a non-negative integer (got {0})")]
    NegativeThreshold(i64),

    #[error("Stock quantity {0} is too large")]
    QuantityOverflow(i64),

    #[error("No listings selected")]
    EmptySelection,
}

impl RuleViolation {
    /// Short headline used by the UI toast.
    pub fn title(&self) -> &'static str {
        match self {
            RuleViolation::MissingInformation(_) => "Missing information",
            RuleViolation::InvalidTransition { .. } => "Action not available",
            RuleViolation::NegativeQuantity(_)
            | RuleViolation::NegativeThreshold(_)
            | RuleViolation::QuantityOverflow(_) => "Invalid quantity",
            RuleViolation::EmptySelection => "Nothing selected",
        }
    }
}

/// Checks a user-entered stock quantity and narrows it to the column type.
pub fn checked_quantity(quantity: i64) -> Result<i32, RuleViolation> {
    if quantity < 0 {
        return Err(RuleViolation::NegativeQuantity(quantity));
    }
    i32::try_from(quantity).map_err(|_| RuleViolation::QuantityOverflow(quantity))
}

pub fn checked_threshold(threshold: i64) -> Result<i32, RuleViolation> {
    if threshold < 0 {
        return Err(RuleViolation::NegativeThreshold(threshold));
    }
    i32::try_from(threshold).map_err(|_| RuleViolation::QuantityOverflow(threshold))
}
