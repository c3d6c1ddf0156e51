use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;

use tradedesk_auth::{Policy, Role, SubRole};
use tradedesk_core::SaleId;
use tradedesk_sales::{NewSale, Sale};

use crate::app::dto::{CreateSaleRequest, ListResponse};
use crate::app::errors::{ApiError, parse_id};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sales).post(record_sale))
        .route("/:id/deliver", post(deliver_sale))
}

/// Restricted sellers see their own sales; everyone else admitted sees all of
/// the tenant's sales.
pub async fn list_sales(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<ListResponse<Sale>>, ApiError> {
    let authorized = authz::require(&services, &principal, Policy::ViewSales).await?;

    let scope = tenant.require()?;
    let user = authorized.user;
    let own_only = user.role == Role::Restricted && user.sub_role == Some(SubRole::Seller);

    let sales = services
        .sales
        .find(&scope, &|sale| !own_only || sale.seller_id() == user.id)
        .await?;
    Ok(Json(sales.into()))
}

/// Record a sale by the calling seller. Client and product must exist in the
/// caller's tenant.
pub async fn record_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    let authorized = authz::require(&services, &principal, Policy::SellerOrSellerCourier).await?;

    let scope = tenant.require()?;
    services.clients.get(&scope, &body.client_id).await?;
    services.products.get(&scope, &body.product_id).await?;

    let draft = NewSale::new(
        body.client_id,
        body.product_id,
        body.quantity,
        authorized.user.id,
        Utc::now(),
    )?;
    let sale = services.sales.create(&scope, draft).await?;
    tracing::info!(
        tenant_id = %scope.tenant_id(),
        seller_id = %authorized.user.id,
        quantity = body.quantity,
        "sale recorded"
    );
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn deliver_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    let authorized = authz::require_any(
        &services,
        &principal,
        &[Policy::StandardOrCourier, Policy::StandardOrSellerCourier],
    )
    .await?;

    let scope = tenant.require()?;
    let id: SaleId = parse_id(&id)?;
    let courier = authorized.user.id;
    let now = Utc::now();

    let sale = services
        .sales
        .update(&scope, &id, &mut |sale| sale.mark_delivered(courier, now))
        .await?;
    Ok(Json(sale))
}
