use axum::{Router, routing::get};

pub mod admin;
pub mod clients;
pub mod products;
pub mod sales;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/clients", clients::router())
        .nest("/products", products::router())
        .nest("/sales", sales::router())
        .nest("/admin", admin::router())
}
