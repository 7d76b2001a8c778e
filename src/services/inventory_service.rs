// src/services/inventory_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ListingRepository,
    models::{
        listing::{BulkUpdate, Listing, ListingFilter},
        rules::{checked_quantity, RuleViolation},
    },
};

#[derive(Clone)]
pub struct InventoryService {
    listing_repo: ListingRepository,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(listing_repo: ListingRepository, pool: PgPool) -> Self {
        Self { listing_repo, pool }
    }

    pub async fn list_listings(&self, seller_id: Uuid, filter: &ListingFilter) -> Result<Vec<Listing>, AppError> {
        let listings = self.listing_repo.list_by_seller(seller_id).await?;
        Ok(listings.into_iter().filter(|l| filter.matches(l)).collect())
    }

    pub async fn low_stock(&self, seller_id: Uuid) -> Result<Vec<Listing>, AppError> {
        self.listing_repo.list_low_stock(seller_id).await
    }

    // --- SINGLE STOCK EDIT ---
    // Last write wins: concurrent editors are not detected.
    pub async fn update_stock(&self, seller_id: Uuid, listing_id: Uuid, quantity: i64) -> Result<Listing, AppError> {
        let quantity = checked_quantity(quantity)?;

        // Someone else's listing answers like a missing one.
        let listing = self
            .listing_repo
            .set_stock(&self.pool, listing_id, seller_id, quantity)
            .await?
            .ok_or(AppError::ListingNotFound(listing_id))?;

        tracing::info!(%listing_id, quantity, status = %listing.stock_status(), "stock updated");
        Ok(listing)
    }

    // --- BULK EDIT ---
    // All patches succeed or none do.
    pub async fn bulk_update(&self, seller_id: Uuid, bulk: &BulkUpdate) -> Result<Vec<Listing>, AppError> {
        if bulk.updates.is_empty() {
            return Err(RuleViolation::EmptySelection.into());
        }
        for patch in &bulk.updates {
            if patch.is_empty() {
                return Err(RuleViolation::MissingInformation("each update needs a field to change").into());
            }
            if let Some(threshold) = patch.low_stock_threshold.filter(|t| *t < 0) {
                return Err(RuleViolation::NegativeThreshold(i64::from(threshold)).into());
            }
        }

        let mut tx = self.pool.begin().await?;

        // 1. Every id must belong to the caller.
        let ids = bulk.ids();
        let owned = self.listing_repo.owned_ids(&mut *tx, seller_id, &ids).await?;
        if let Some(foreign) = ids.iter().find(|id| !owned.contains(id)) {
            return Err(AppError::ListingNotFound(*foreign));
        }

        // 2. Apply
        let mut updated = Vec::with_capacity(bulk.updates.len());
        for patch in &bulk.updates {
            updated.push(self.listing_repo.apply_patch(&mut *tx, seller_id, patch).await?);
        }

        tx.commit().await?;
        tracing::info!(%seller_id, count = updated.len(), "bulk listing update applied");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use axum::http::StatusCode;
    use rust_decimal::Decimal;

    use crate::models::listing::{BulkField, ListingState};

    fn service(pool: &PgPool) -> InventoryService {
        InventoryService::new(ListingRepository::new(pool.clone()), pool.clone())
    }

    async fn seed_listing(pool: &PgPool, seller_id: Uuid, sku: &str, stock: i32, threshold: i32) -> Listing {
        sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (seller_id, title, sku, price, stock_quantity, low_stock_threshold, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(seller_id)
        .bind(format!("Curio {sku}"))
        .bind(sku)
        .bind(Decimal::new(1313, 2))
        .bind(stock)
        .bind(threshold)
        .bind(ListingState::Published)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test]
    async fn bulk_update_with_a_foreign_listing_writes_nothing(pool: PgPool) {
        let seller = Uuid::new_v4();
        let own_a = seed_listing(&pool, seller, "JT-1", 4, 2).await;
        let own_b = seed_listing(&pool, seller, "TB-2", 1, 2).await;
        let foreign = seed_listing(&pool, Uuid::new_v4(), "WH-3", 0, 2).await;

        let ids: BTreeSet<Uuid> = [own_a.id, own_b.id, foreign.id].into_iter().collect();
        let bulk = BulkUpdate::uniform(&ids, BulkField::State(ListingState::Suspended)).unwrap();

        let err = service(&pool).bulk_update(seller, &bulk).await.unwrap_err();
        assert!(matches!(err, AppError::ListingNotFound(id) if id == foreign.id));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let listings = service(&pool).list_listings(seller, &ListingFilter::default()).await.unwrap();
        assert!(listings.iter().all(|l| l.state == ListingState::Published));
    }

    #[sqlx::test]
    async fn bulk_update_patches_every_owned_listing(pool: PgPool) {
        let seller = Uuid::new_v4();
        let a = seed_listing(&pool, seller, "JT-1", 4, 2).await;
        let b = seed_listing(&pool, seller, "TB-2", 1, 2).await;

        let ids: BTreeSet<Uuid> = [a.id, b.id].into_iter().collect();
        let bulk = BulkUpdate::uniform(&ids, BulkField::LowStockThreshold(5)).unwrap();

        let updated = service(&pool).bulk_update(seller, &bulk).await.unwrap();
        assert_eq!(updated.len(), 2);
        assert!(updated.iter().all(|l| l.low_stock_threshold == 5 && l.state == ListingState::Published));
    }

    #[sqlx::test]
    async fn stock_update_on_someone_elses_listing_is_not_found(pool: PgPool) {
        let foreign = seed_listing(&pool, Uuid::new_v4(), "WH-3", 3, 2).await;

        let err = service(&pool).update_stock(Uuid::new_v4(), foreign.id, 9).await.unwrap_err();
        assert!(matches!(err, AppError::ListingNotFound(id) if id == foreign.id));
    }

    #[sqlx::test]
    async fn stock_update_moves_listing_in_and_out_of_low_stock(pool: PgPool) {
        let seller = Uuid::new_v4();
        let jar = seed_listing(&pool, seller, "JT-1", 10, 2).await;
        seed_listing(&pool, seller, "TB-2", 2, 2).await;
        let inventory = service(&pool);

        inventory.update_stock(seller, jar.id, 0).await.unwrap();
        let low: Vec<String> = inventory.low_stock(seller).await.unwrap().into_iter().map(|l| l.sku).collect();
        assert_eq!(low, vec!["JT-1", "TB-2"]);

        let restocked = inventory.update_stock(seller, jar.id, 7).await.unwrap();
        assert_eq!(restocked.stock_quantity, 7);
        assert_eq!(inventory.low_stock(seller).await.unwrap().len(), 1);
    }
}
