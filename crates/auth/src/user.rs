//! User record as seen by the authorization core (read-only).
//!
//! Users are provisioned and edited elsewhere; this crate only reads them,
//! once per request, through [`UserStore`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradedesk_core::{TenantId, UserId};

use crate::{Role, SubRole};

/// The fields authorization depends on.
///
/// `sub_role` is meaningful only for [`Role::Restricted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub role: Role,
    pub sub_role: Option<SubRole>,
    pub active: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user store unavailable: {0}")]
    Unavailable(String),

    #[error("user record {id} is corrupt: {reason}")]
    Corrupt { id: UserId, reason: String },
}

/// External user store.
///
/// A single lookup by subject id, not filtered by tenant: the user must be
/// resolvable before any tenant context exists. Implementations must not
/// cache across requests.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        (**self).get_by_id(id).await
    }
}
