pub mod auth;
pub mod inventory_service;
pub mod notification_service;
pub mod order_service;
