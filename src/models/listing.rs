// src/models/listing.rs

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::rules::{checked_threshold, RuleViolation};

// --- Enums ---

// Maps the `listing_state` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "listing_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingState {
    Draft,
    Published,
    Suspended,
}

/// Derived from (stock, threshold), never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// `0` is out of stock, `1..=threshold` is low, anything above is in stock.
    /// Negative stock cannot be stored; it is treated as out of stock so the
    /// function stays total.
    pub fn classify(stock_quantity: i32, low_stock_threshold: i32) -> Self {
        if stock_quantity <= 0 {
            StockStatus::OutOfStock
        } else if stock_quantity <= low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- Listing ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: Uuid,
    pub name: String,
    pub stock_quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub sku: String,
    #[schema(value_type = String, example = "13.13")]
    pub price: Decimal,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub state: ListingState,
    #[sqlx(json)]
    #[serde(default)]
    pub variations: Vec<Variation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.stock_quantity, self.low_stock_threshold)
    }

    /// Variations share the parent's threshold.
    pub fn variation_status(&self, variation: &Variation) -> StockStatus {
        StockStatus::classify(variation.stock_quantity, self.low_stock_threshold)
    }

    pub fn variation_stock(&self) -> i64 {
        self.variations.iter().map(|v| i64::from(v.stock_quantity)).sum()
    }
}

// --- Filtering ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockFilter {
    #[default]
    All,
    Low,
    Out,
}

impl StockFilter {
    pub fn matches(self, status: StockStatus) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Low => status == StockStatus::LowStock,
            StockFilter::Out => status == StockStatus::OutOfStock,
        }
    }
}

/// Inventory table filters; every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct ListingFilter {
    /// Case-insensitive substring of the title or SKU.
    pub search: Option<String>,
    pub state: Option<ListingState>,
    pub stock: StockFilter,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        let text_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                listing.title.to_lowercase().contains(&needle)
                    || listing.sku.to_lowercase().contains(&needle)
            }
        };
        let state_ok = self.state.is_none_or(|state| listing.state == state);

        text_ok && state_ok && self.stock.matches(listing.stock_status())
    }

    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        listings.iter().filter(|l| self.matches(l)).collect()
    }
}

// --- Counters ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryCounters {
    pub total: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

impl InventoryCounters {
    /// Uses the same classification as `StockFilter`, so counts always agree with filtered rows.
    pub fn from_listings(listings: &[Listing]) -> Self {
        listings.iter().fold(Self::default(), |mut acc, listing| {
            acc.total += 1;
            match listing.stock_status() {
                StockStatus::InStock => acc.in_stock += 1,
                StockStatus::LowStock => acc.low_stock += 1,
                StockStatus::OutOfStock => acc.out_of_stock += 1,
            }
            acc
        })
    }
}

// --- Stock & bulk update payloads ---

/// Body of `PUT /api/listings/{id}/stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct StockUpdate {
    #[validate(range(min = 0, message = "Stock cannot be negative."))]
    pub quantity: i64,
}

/// The single field a bulk edit changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkField {
    State(ListingState),
    LowStockThreshold(i64),
}

/// One entry of a bulk update. Exactly one of the optional fields is set
/// when built through `BulkUpdate::uniform`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ListingState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i32>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.low_stock_threshold.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkUpdate {
    pub updates: Vec<ListingPatch>,
}

impl BulkUpdate {
    /// Same field/value for every selected listing, one patch per id.
    pub fn uniform(ids: &BTreeSet<Uuid>, field: BulkField) -> Result<Self, RuleViolation> {
        if ids.is_empty() {
            return Err(RuleViolation::EmptySelection);
        }

        let (state, low_stock_threshold) = match field {
            BulkField::State(state) => (Some(state), None),
            BulkField::LowStockThreshold(value) => (None, Some(checked_threshold(value)?)),
        };

        let updates = ids
            .iter()
            .map(|&id| ListingPatch { id, state, low_stock_threshold })
            .collect();
        Ok(Self { updates })
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.updates.iter().map(|p| p.id).collect()
    }
}
