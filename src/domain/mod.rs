//! Storefront domain: catalog items, pricing, cart and checkout.
pub mod aggregates;
pub mod events;
pub mod pricing;
pub mod transcript;
pub mod value_objects;
