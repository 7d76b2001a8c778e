pub mod listing_repo;
pub use listing_repo::ListingRepository;
pub mod order_repo;
pub use order_repo::{NewTrackingEvent, OrderRepository};
