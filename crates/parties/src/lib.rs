//! Parties domain module (clients of a tenant).
//!
//! Pure domain logic: no IO, no HTTP, no storage.

pub mod client;

pub use client::{Client, ContactInfo, NewClient};
