// src/client.rs

//! Seller/buyer API client: HTTP plumbing, query cache and the inventory and
//! order consoles built on top of them.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod inventory;
pub mod orders;

#[cfg(test)]
pub(crate) mod fake_backend;

pub use api::ApiClient;
pub use cache::{QueryCache, QueryKey};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, Disposition};
pub use inventory::{InventoryConsole, InventoryOverview, Selection};
pub use orders::OrderDesk;
