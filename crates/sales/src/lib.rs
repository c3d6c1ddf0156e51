//! Sales domain module: recorded sales and their delivery.
//!
//! Pure domain logic: no IO, no HTTP, no storage.

pub mod sale;

pub use sale::{NewSale, Sale, SaleStatus};
