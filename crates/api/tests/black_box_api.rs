use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use tradedesk_api::app::{AppServices, build_app};
use tradedesk_auth::{Role, SubRole, UserRecord};
use tradedesk_core::{TenantId, UserId};
use tradedesk_infra::InMemoryUserStore;

const SECRET: &str = "test-secret";

const SUPER: u64 = 1;
const STANDARD: u64 = 2;
const SELLER: u64 = 3;
const COURIER: u64 = 4;
const SELLER_COURIER: u64 = 5;
const INACTIVE: u64 = 6;
const OTHER_TENANT_STANDARD: u64 = 20;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let users = Arc::new(seeded_users());
        let services = AppServices::in_memory(users, Duration::from_secs(2));

        // Same router as prod, bound to an ephemeral port.
        let app = build_app(SECRET, services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn user(id: u64, tenant: u64, role: Role, sub_role: Option<SubRole>, active: bool) -> UserRecord {
    UserRecord {
        id: UserId::new(id).unwrap(),
        tenant_id: TenantId::new(tenant).unwrap(),
        role,
        sub_role,
        active,
    }
}

fn seeded_users() -> InMemoryUserStore {
    let store = InMemoryUserStore::new();
    store.upsert(user(SUPER, 1, Role::Super, None, true));
    store.upsert(user(STANDARD, 1, Role::Standard, None, true));
    store.upsert(user(SELLER, 1, Role::Restricted, Some(SubRole::Seller), true));
    store.upsert(user(COURIER, 1, Role::Restricted, Some(SubRole::Courier), true));
    store.upsert(user(SELLER_COURIER, 1, Role::Restricted, Some(SubRole::SellerCourier), true));
    store.upsert(user(INACTIVE, 1, Role::Standard, None, false));
    store.upsert(user(OTHER_TENANT_STANDARD, 2, Role::Standard, None, true));
    store
}

fn mint_jwt(secret: &str, subject: Option<u64>, tenant_id: Option<u64>) -> String {
    let now = Utc::now();
    let mut claims = json!({
        "iat": now.timestamp(),
        "exp": (now + ChronoDuration::minutes(10)).timestamp(),
    });
    if let Some(subject) = subject {
        claims["sub"] = json!(subject.to_string());
    }
    if let Some(tenant_id) = tenant_id {
        claims["tenant_id"] = json!(tenant_id);
    }

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn token(subject: u64, tenant_id: u64) -> String {
    mint_jwt(SECRET, Some(subject), Some(tenant_id))
}

async fn error_code(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

/// Create a client and a product as the tenant's standard user.
async fn seed_catalog(srv: &TestServer, standard: &str) -> (u64, u64) {
    let res = srv
        .post("/clients", standard, json!({ "name": "Acme" }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let client: Value = res.json().await.unwrap();

    let res = srv
        .post("/products", standard, json!({ "name": "Widget" }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let product: Value = res.json().await.unwrap();

    (client["id"].as_u64().unwrap(), product["id"].as_u64().unwrap())
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let forged = mint_jwt("another-secret", Some(STANDARD), Some(1));
    assert_eq!(srv.get("/whoami", &forged).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_without_subject_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let anonymous = mint_jwt(SECRET, None, Some(1));

    let res = srv.get("/whoami", &anonymous).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(res).await, "unauthorized");
}

#[tokio::test]
async fn whoami_reflects_the_stored_user() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/whoami", &token(SELLER_COURIER, 1)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user_id"], json!(SELLER_COURIER));
    assert_eq!(body["tenant_id"], json!(1));
    assert_eq!(body["role"], json!("restricted"));
    assert_eq!(body["sub_role"], json!("seller_courier"));
}

#[tokio::test]
async fn unknown_and_inactive_users_are_forbidden() {
    let srv = TestServer::spawn().await;

    for subject in [INACTIVE, 99] {
        let res = srv.get("/whoami", &token(subject, 1)).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_code(res).await, "forbidden");
    }
}

#[tokio::test]
async fn super_is_excluded_only_where_the_policy_says_so() {
    let srv = TestServer::spawn().await;
    let super_token = token(SUPER, 1);

    assert_eq!(srv.get("/whoami", &super_token).await.status(), StatusCode::OK);
    assert_eq!(srv.get("/clients", &super_token).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(srv.get("/sales", &super_token).await.status(), StatusCode::FORBIDDEN);

    let res = srv.get("/admin/policies", &super_token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 14);
    let exclusive = items
        .iter()
        .find(|p| p["name"] == "standard-or-restricted-exclusive")
        .unwrap();
    assert_eq!(exclusive["excludes_super"], json!(true));

    let res = srv.get("/admin/policies", &token(STANDARD, 1)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn standard_manages_clients_and_restricted_reads_them() {
    let srv = TestServer::spawn().await;
    let standard = token(STANDARD, 1);
    let seller = token(SELLER, 1);

    let res = srv
        .post(
            "/clients",
            &standard,
            json!({ "name": "Acme", "contact": { "email": "ops@acme.test" } }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["tenant_id"], json!(1));

    let res = srv.get("/clients", &seller).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let res = srv.post("/clients", &seller, json!({ "name": "Globex" })).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.post("/clients", &standard, json!({ "name": "ACME" })).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = srv.post("/clients", &standard, json!({ "name": "  " })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn other_tenants_rows_are_not_found() {
    let srv = TestServer::spawn().await;
    let (client_id, product_id) = seed_catalog(&srv, &token(STANDARD, 1)).await;
    let intruder = token(OTHER_TENANT_STANDARD, 2);

    let path = format!("/clients/{client_id}");
    assert_eq!(srv.get(&path, &intruder).await.status(), StatusCode::NOT_FOUND);

    let res = srv
        .client
        .patch(srv.url(&path))
        .bearer_auth(&intruder)
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .client
        .delete(srv.url(&path))
        .bearer_auth(&intruder)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .post(
            &format!("{path}/products"),
            &intruder,
            json!({ "product_id": product_id }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = srv.get("/clients", &intruder).await.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    let owner: Value = srv.get(&path, &token(STANDARD, 1)).await.json().await.unwrap();
    assert_eq!(owner["name"], json!("Acme"));
}

#[tokio::test]
async fn same_client_name_is_allowed_in_another_tenant() {
    let srv = TestServer::spawn().await;
    seed_catalog(&srv, &token(STANDARD, 1)).await;

    let res = srv
        .post("/clients", &token(OTHER_TENANT_STANDARD, 2), json!({ "name": "Acme" }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn missing_tenant_claim_fails_closed() {
    let srv = TestServer::spawn().await;
    let no_tenant = mint_jwt(SECRET, Some(STANDARD), None);

    let res = srv.post("/clients", &no_tenant, json!({ "name": "Acme" })).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(res).await, "internal_error");

    let body: Value = srv
        .get("/clients", &token(STANDARD, 1))
        .await
        .json()
        .await
        .unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sales_follow_sub_roles() {
    let srv = TestServer::spawn().await;
    let (client_id, product_id) = seed_catalog(&srv, &token(STANDARD, 1)).await;
    let sale = json!({ "client_id": client_id, "product_id": product_id, "quantity": 2 });

    let res = srv.post("/sales", &token(COURIER, 1), sale.clone()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = srv.post("/sales", &token(STANDARD, 1), sale.clone()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.post("/sales", &token(SELLER, 1), sale.clone()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["seller_id"], json!(SELLER));
    assert_eq!(created["status"], json!("pending"));
    let sale_id = created["id"].as_u64().unwrap();

    let res = srv.post("/sales", &token(SELLER_COURIER, 1), sale).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    // view-sales: standard and seller sub-roles, not couriers.
    assert_eq!(srv.get("/sales", &token(COURIER, 1)).await.status(), StatusCode::FORBIDDEN);
    let all: Value = srv
        .get("/sales", &token(SELLER_COURIER, 1))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(all["items"].as_array().unwrap().len(), 2);
    let own: Value = srv.get("/sales", &token(SELLER, 1)).await.json().await.unwrap();
    assert_eq!(own["items"].as_array().unwrap().len(), 1);

    let deliver = format!("/sales/{sale_id}/deliver");
    let res = srv.post(&deliver, &token(SELLER, 1), json!({})).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.post(&deliver, &token(COURIER, 1), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let delivered: Value = res.json().await.unwrap();
    assert_eq!(delivered["status"], json!("delivered"));
    assert_eq!(delivered["delivered_by"], json!(COURIER));

    let res = srv.post(&deliver, &token(SELLER_COURIER, 1), json!({})).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn sale_cannot_reference_another_tenants_product() {
    let srv = TestServer::spawn().await;
    let (client_id, _) = seed_catalog(&srv, &token(STANDARD, 1)).await;

    let res = srv
        .post("/products", &token(OTHER_TENANT_STANDARD, 2), json!({ "name": "Gadget" }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let foreign: Value = res.json().await.unwrap();

    let res = srv
        .post(
            "/sales",
            &token(SELLER, 1),
            json!({ "client_id": client_id, "product_id": foreign["id"], "quantity": 1 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = srv.get("/sales", &token(STANDARD, 1)).await.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn products_can_be_listed_for_a_client() {
    let srv = TestServer::spawn().await;
    let standard = token(STANDARD, 1);
    let (client_id, product_id) = seed_catalog(&srv, &standard).await;

    let path = format!("/clients/{client_id}/products");
    let res = srv.post(&path, &standard, json!({ "product_id": product_id })).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = srv.post(&path, &standard, json!({ "product_id": product_id })).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let listed: Value = srv.get(&path, &token(COURIER, 1)).await.json().await.unwrap();
    assert_eq!(listed["items"][0]["product_id"], json!(product_id));

    let res = srv
        .client
        .delete(srv.url(&format!("/products/{product_id}")))
        .bearer_auth(&standard)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let listed: Value = srv.get(&path, &standard).await.json().await.unwrap();
    assert!(listed["items"].as_array().unwrap().is_empty());
}
