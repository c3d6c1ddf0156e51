//! Products domain module: the tenant catalog and per-client listings.
//!
//! Pure domain logic: no IO, no HTTP, no storage. Pricing lives elsewhere.

pub mod client_product;
pub mod product;

pub use client_product::{ClientProduct, NewClientProduct};
pub use product::{NewProduct, Product};
