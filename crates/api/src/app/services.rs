use std::sync::Arc;
use std::time::Duration;

use tradedesk_auth::{Authorizer, TracingAuditSink, UserStore};
use tradedesk_infra::{InMemoryTenantRepository, TenantRepository};
use tradedesk_parties::Client;
use tradedesk_products::{ClientProduct, Product};
use tradedesk_sales::Sale;

/// Everything a handler needs: the policy guard and tenant-scoped storage.
#[derive(Clone)]
pub struct AppServices {
    pub authorizer: Authorizer,
    pub clients: Arc<dyn TenantRepository<Client>>,
    pub products: Arc<dyn TenantRepository<Product>>,
    pub client_products: Arc<dyn TenantRepository<ClientProduct>>,
    pub sales: Arc<dyn TenantRepository<Sale>>,
}

impl AppServices {
    /// In-memory storage for all entities; decisions audited through `tracing`.
    pub fn in_memory(users: Arc<dyn UserStore>, lookup_timeout: Duration) -> Self {
        let authorizer = Authorizer::new(users, Arc::new(TracingAuditSink))
            .with_lookup_timeout(lookup_timeout);

        Self {
            authorizer,
            clients: Arc::new(InMemoryTenantRepository::<Client>::new()),
            products: Arc::new(InMemoryTenantRepository::<Product>::new()),
            client_products: Arc::new(InMemoryTenantRepository::<ClientProduct>::new()),
            sales: Arc::new(InMemoryTenantRepository::<Sale>::new()),
        }
    }

    /// Swap the client store (e.g. for the Postgres adapter).
    pub fn with_clients(mut self, clients: Arc<dyn TenantRepository<Client>>) -> Self {
        self.clients = clients;
        self
    }
}
