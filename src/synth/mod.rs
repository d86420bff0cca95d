//! Synthetic order generation.
//!
//! Turns a restaurant catalog into delivery-platform style order records:
//! - [`geo`]: addresses, phone numbers and points in the service area
//! - [`pricing`]: menu selection, tax, tip and fees
//! - [`order`]: full order composition and batch generation

pub mod geo;
pub mod order;
pub mod pricing;

pub use order::{generate_order, generate_orders, GenerationReport};
