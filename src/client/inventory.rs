// src/client/inventory.rs

use std::{collections::BTreeSet, sync::Arc};

use uuid::Uuid;

use crate::{
    client::{
        api::ApiClient,
        cache::{QueryCache, QueryKey},
        error::ClientResult,
    },
    models::{
        listing::{BulkField, BulkUpdate, InventoryCounters, Listing, ListingFilter, StockUpdate},
        rules::checked_quantity,
    },
};

const LISTINGS_PATH: &str = "/api/seller/listings";
const BULK_PATH: &str = "/api/seller/listings/bulk";
const LOW_STOCK_PATH: &str = "/api/seller/low-stock";

/// Listing ids ticked in the inventory table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<Uuid>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips one row. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn select_all<'a>(&mut self, listings: impl IntoIterator<Item = &'a Listing>) {
        self.ids.extend(listings.into_iter().map(|l| l.id));
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &BTreeSet<Uuid> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Table rows after filtering plus counters over the whole inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryOverview {
    pub rows: Vec<Listing>,
    pub counters: InventoryCounters,
}

#[derive(Debug, Clone)]
pub struct InventoryConsole {
    api: ApiClient,
    cache: Arc<QueryCache>,
}

impl InventoryConsole {
    pub fn new(api: ApiClient, cache: Arc<QueryCache>) -> Self {
        Self { api, cache }
    }

    pub async fn listings(&self) -> ClientResult<Vec<Listing>> {
        self.cache.fetch(&self.api, LISTINGS_PATH).await
    }

    pub async fn low_stock(&self) -> ClientResult<Vec<Listing>> {
        self.cache.fetch(&self.api, LOW_STOCK_PATH).await
    }

    pub async fn overview(&self, filter: &ListingFilter) -> ClientResult<InventoryOverview> {
        let listings = self.listings().await?;
        Ok(InventoryOverview {
            counters: InventoryCounters::from_listings(&listings),
            rows: filter.apply(&listings).into_iter().cloned().collect(),
        })
    }

    /// Sets the stock of one listing. Negative quantities never leave the client.
    pub async fn update_stock(&self, listing_id: Uuid, quantity: i64) -> ClientResult<Listing> {
        checked_quantity(quantity)?;

        let listing: Listing = self
            .api
            .put(&format!("/api/listings/{listing_id}/stock"), &StockUpdate { quantity })
            .await?;

        self.invalidate_listings();
        tracing::info!(%listing_id, quantity, "stock updated");
        Ok(listing)
    }

    /// Applies one field/value to every selected listing in a single request,
    /// then clears the selection. The selection is kept if the request fails.
    pub async fn bulk_update(&self, selection: &mut Selection, field: BulkField) -> ClientResult<Vec<Listing>> {
        let request = BulkUpdate::uniform(selection.ids(), field)?;

        let updated: Vec<Listing> = self.api.put(BULK_PATH, &request).await?;

        self.invalidate_listings();
        tracing::info!(count = updated.len(), "bulk update applied");
        selection.clear();
        Ok(updated)
    }

    fn invalidate_listings(&self) {
        self.cache.invalidate(&QueryKey::from_path(LISTINGS_PATH));
        self.cache.invalidate(&QueryKey::from_path(LOW_STOCK_PATH));
    }
}
