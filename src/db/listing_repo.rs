// src/db/listing_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::listing::{Listing, ListingPatch},
};

#[derive(Clone)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Reads
    // ---
    // Plain reads go straight to the pool.

    pub async fn list_by_seller(&self, seller_id: Uuid) -> Result<Vec<Listing>, AppError> {
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE seller_id = $1 ORDER BY title ASC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    /// Low and out-of-stock listings, emptiest first.
    pub async fn list_low_stock(&self, seller_id: Uuid) -> Result<Vec<Listing>, AppError> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT * FROM listings
            WHERE seller_id = $1 AND stock_quantity <= low_stock_threshold
            ORDER BY stock_quantity ASC, title ASC
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    // ---
    // Writes
    // ---
    // These take an `Executor` so they can run inside a transaction.

    /// Overwrites the stock count. `None` when the listing does not exist or belongs to someone else.
    pub async fn set_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        seller_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Listing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET stock_quantity = $3, updated_at = now()
            WHERE id = $1 AND seller_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(seller_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;
        Ok(listing)
    }

    pub async fn owned_ids<'e, E>(
        &self,
        executor: E,
        seller_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owned = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM listings WHERE seller_id = $1 AND id = ANY($2)",
        )
        .bind(seller_id)
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(owned)
    }

    /// Applies the set fields of one patch; unset fields keep their value.
    pub async fn apply_patch<'e, E>(
        &self,
        executor: E,
        seller_id: Uuid,
        patch: &ListingPatch,
    ) -> Result<Listing, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET state = COALESCE($3, state),
                low_stock_threshold = COALESCE($4, low_stock_threshold),
                updated_at = now()
            WHERE id = $1 AND seller_id = $2
            RETURNING *
            "#,
        )
        .bind(patch.id)
        .bind(seller_id)
        .bind(patch.state)
        .bind(patch.low_stock_threshold)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ListingNotFound(patch.id))
    }
}
