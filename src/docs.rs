// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Inventory ---
        handlers::inventory::list_listings,
        handlers::inventory::low_stock,
        handlers::inventory::update_stock,
        handlers::inventory::bulk_update,

        // --- Orders ---
        handlers::orders::seller_orders,
        handlers::orders::get_order,
        handlers::orders::ship_order,
        handlers::orders::deliver_order,
        handlers::orders::cancel_order,

        // --- Tracking ---
        handlers::orders::get_tracking,
        handlers::orders::add_tracking_event,
    ),
    components(
        schemas(
            // --- Listings ---
            models::listing::ListingState,
            models::listing::StockStatus,
            models::listing::Variation,
            models::listing::Listing,
            models::listing::StockFilter,
            models::listing::InventoryCounters,
            models::listing::StockUpdate,
            models::listing::ListingPatch,
            models::listing::BulkUpdate,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::Carrier,
            models::order::OrderItem,
            models::order::ShippingAddress,
            models::order::Order,
            models::order::OrderActions,
            models::order::ShipmentDraft,
            models::order::Shipment,

            // --- Tracking ---
            models::order::TrackingEvent,
            models::order::TrackingUpdate,
            models::order::TrackingSummary,
        )
    ),
    tags(
        (name = "Inventory", description = "Seller listings, stock and bulk edits"),
        (name = "Orders", description = "Order lookup and status transitions"),
        (name = "Tracking", description = "Shipment tracking timeline")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
