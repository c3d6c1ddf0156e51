//! Infrastructure layer: tenant-scoped storage and the user store.

pub mod db;
pub mod repository;
pub mod users;

pub use repository::{InMemoryTenantRepository, RepositoryError, TenantRepository};
pub use users::InMemoryUserStore;
