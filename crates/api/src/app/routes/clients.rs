use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};

use tradedesk_auth::Policy;
use tradedesk_core::{ClientId, Entity};
use tradedesk_parties::{Client, NewClient};
use tradedesk_products::{ClientProduct, NewClientProduct};

use crate::app::dto::{AssignProductRequest, CreateClientRequest, ListResponse, UpdateClientRequest};
use crate::app::errors::{ApiError, parse_id};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_client).get(list_clients))
        .route(
            "/:id",
            get(get_client).patch(update_client).delete(delete_client),
        )
        .route("/:id/products", post(assign_product).get(list_client_products))
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    authz::require(&services, &principal, Policy::StandardOnly).await?;

    let draft = NewClient::new(body.name, body.contact)?;
    let client = services.clients.create_in(&tenant, draft).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<ListResponse<Client>>, ApiError> {
    authz::require(&services, &principal, Policy::StandardOrRestrictedExclusive).await?;

    let scope = tenant.require()?;
    Ok(Json(services.clients.list(&scope).await?.into()))
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<Client>, ApiError> {
    authz::require(&services, &principal, Policy::StandardOrRestrictedExclusive).await?;

    let scope = tenant.require()?;
    let id: ClientId = parse_id(&id)?;
    Ok(Json(services.clients.get(&scope, &id).await?))
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<Json<Client>, ApiError> {
    authz::require(&services, &principal, Policy::StandardOnly).await?;

    let scope = tenant.require()?;
    let id: ClientId = parse_id(&id)?;
    let UpdateClientRequest {
        name,
        contact,
        deactivate,
    } = body;

    let client = services
        .clients
        .update(&scope, &id, &mut |client| {
            if let Some(name) = &name {
                client.rename(name.as_str())?;
            }
            if let Some(contact) = &contact {
                client.update_contact(contact.clone());
            }
            if deactivate {
                client.deactivate()?;
            }
            Ok(())
        })
        .await?;
    Ok(Json(client))
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authz::require(&services, &principal, Policy::StandardOnly).await?;

    let scope = tenant.require()?;
    let id: ClientId = parse_id(&id)?;

    let listings = services
        .client_products
        .find(&scope, &|listing| listing.client_id() == id)
        .await?;
    for listing in listings {
        services.client_products.delete(&scope, listing.id()).await?;
    }
    services.clients.delete(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Offer a product to a client. Both must exist in the caller's tenant.
pub async fn assign_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<AssignProductRequest>,
) -> Result<(StatusCode, Json<ClientProduct>), ApiError> {
    authz::require(&services, &principal, Policy::StandardOnly).await?;

    let scope = tenant.require()?;
    let client_id: ClientId = parse_id(&id)?;
    services.clients.get(&scope, &client_id).await?;
    services.products.get(&scope, &body.product_id).await?;

    let listing = services
        .client_products
        .create(
            &scope,
            NewClientProduct {
                client_id,
                product_id: body.product_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn list_client_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<ListResponse<ClientProduct>>, ApiError> {
    authz::require(&services, &principal, Policy::StandardOrRestrictedExclusive).await?;

    let scope = tenant.require()?;
    let client_id: ClientId = parse_id(&id)?;
    services.clients.get(&scope, &client_id).await?;

    let listings = services
        .client_products
        .find(&scope, &|listing| listing.client_id() == client_id)
        .await?;
    Ok(Json(listings.into()))
}
