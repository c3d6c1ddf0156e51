//! Entity traits: identity + tenant ownership.

use crate::id::TenantId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that belongs to exactly one tenant.
///
/// The tenant id is stamped once, when the entity is built from its draft, and
/// is never reassigned afterwards. Storage adapters filter every read, update
/// and delete by it.
pub trait TenantOwned: Entity + Send + Sync + 'static {
    /// Caller-supplied fields for a new entity (everything except id and tenant).
    type Draft: Send;

    /// Build the entity from a draft, stamping its id and owning tenant.
    fn from_draft(id: Self::Id, tenant_id: TenantId, draft: Self::Draft) -> Self;

    /// Owning tenant.
    fn tenant_id(&self) -> TenantId;

    /// Natural key that must be unique within the owning tenant, if any.
    ///
    /// Uniqueness is always evaluated as `(tenant_id, natural_key)`; the same
    /// key may exist under any number of other tenants.
    fn natural_key(&self) -> Option<String> {
        None
    }
}
