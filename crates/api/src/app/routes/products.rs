use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{delete, post},
};

use tradedesk_auth::Policy;
use tradedesk_core::{Entity, ProductId};
use tradedesk_products::{NewProduct, Product};

use crate::app::dto::{CreateProductRequest, ListResponse};
use crate::app::errors::{ApiError, parse_id};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", delete(delete_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    authz::require(&services, &principal, Policy::StandardOnly).await?;

    let draft = NewProduct::new(body.name, body.description)?;
    let product = services.products.create_in(&tenant, draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<ListResponse<Product>>, ApiError> {
    authz::require(&services, &principal, Policy::StandardOrRestrictedExclusive).await?;

    let scope = tenant.require()?;
    Ok(Json(services.products.list(&scope).await?.into()))
}

/// Remove a product and every client listing of it.
pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authz::require(&services, &principal, Policy::StandardOnly).await?;

    let scope = tenant.require()?;
    let id: ProductId = parse_id(&id)?;
    services.products.delete(&scope, &id).await?;

    let listings = services
        .client_products
        .find(&scope, &|listing| listing.product_id() == id)
        .await?;
    for listing in listings {
        services.client_products.delete(&scope, listing.id()).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
