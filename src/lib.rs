//! Snack bar storefront
//!
//! Menu browsing, a cart, and a checkout that hands the order to a messaging
//! app instead of a payment backend.
//!
//! ## Features
//! - Catalog of menu items with variations, add-ons and discounts
//! - Pricing of customized selections
//! - Cart with per-configuration lines
//! - Two-step checkout (details, payment) for dine-in, pickup and delivery
//! - Order transcript and Messenger deep link

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod handoff;
pub mod session;

use thiserror::Error;

pub use catalog::{Catalog, CatalogError};
pub use domain::aggregates::{CartError, CheckoutError};
pub use domain::pricing::SelectionError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("menu item {0} not found")]
    ItemNotFound(String),

    #[error("menu item {0} is sold out")]
    ItemUnavailable(String),

    #[error("checkout has not been started")]
    CheckoutNotStarted,

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
