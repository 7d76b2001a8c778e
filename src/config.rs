// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ListingRepository, OrderRepository},
    services::{
        auth::AuthService, inventory_service::InventoryService, notification_service::LogMailer,
        order_service::OrderService,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub notify_sender: String,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("invalid DB_MAX_CONNECTIONS '{raw}'"))?,
            None => 5,
        };
        let notify_sender = lookup("NOTIFY_SENDER").unwrap_or_else(|| "orders@oddities.market".to_string());

        Ok(Self { database_url, jwt_secret, bind_addr, db_max_connections, notify_sender })
    }
}

// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub inventory_service: InventoryService,
    pub order_service: OrderService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("failed to connect to the database")?;

        tracing::info!("✅ Database connection established");
        Ok(Self::from_pool(db_pool, config))
    }

    /// Wires repositories and services over an existing pool.
    pub fn from_pool(db_pool: PgPool, config: &Config) -> Self {
        // --- Dependency graph ---
        let listing_repo = ListingRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let notifier = Arc::new(LogMailer::new(config.notify_sender.clone()));

        Self {
            auth_service: AuthService::new(config.jwt_secret.clone()),
            inventory_service: InventoryService::new(listing_repo, db_pool.clone()),
            order_service: OrderService::new(order_repo, notifier, db_pool.clone()),
            db_pool,
        }
    }
}
