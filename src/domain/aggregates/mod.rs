//! Aggregates module
pub mod menu_item;
pub mod cart;
pub mod checkout;

pub use menu_item::{AddOn, MenuItem, Variation};
pub use cart::{Cart, CartError, CartItem};
pub use checkout::{Checkout, CheckoutDetails, CheckoutError, CheckoutStep, CustomerInfo, Order, PaymentMethod, PickupTime, ServiceType};
