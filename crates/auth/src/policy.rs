//! Fixed, named authorization policies.
//!
//! The set is closed at compile time. Each [`Policy`] maps to one immutable
//! [`PolicyRequirement`], built once per process and shared by every request.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Role, SubRole};

/// Named policy identifiers.
///
/// The kebab-case names are stable and used in logs and the admin listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    SuperOnly,
    StandardOnly,
    SuperOrStandard,
    RestrictedOnly,
    /// Every role, super included.
    StandardOrRestricted,
    /// Standard and restricted; super explicitly excluded.
    StandardOrRestrictedExclusive,
    SellerOnly,
    CourierOnly,
    SellerCourierOnly,
    StandardOrSeller,
    StandardOrCourier,
    StandardOrSellerCourier,
    SellerOrSellerCourier,
    /// Standard, sellers and seller-couriers. Never pure couriers.
    ViewSales,
}

impl Policy {
    pub const COUNT: usize = 14;

    /// All policies, in declaration order.
    pub const ALL: [Policy; Policy::COUNT] = [
        Policy::SuperOnly,
        Policy::StandardOnly,
        Policy::SuperOrStandard,
        Policy::RestrictedOnly,
        Policy::StandardOrRestricted,
        Policy::StandardOrRestrictedExclusive,
        Policy::SellerOnly,
        Policy::CourierOnly,
        Policy::SellerCourierOnly,
        Policy::StandardOrSeller,
        Policy::StandardOrCourier,
        Policy::StandardOrSellerCourier,
        Policy::SellerOrSellerCourier,
        Policy::ViewSales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::SuperOnly => "super-only",
            Policy::StandardOnly => "standard-only",
            Policy::SuperOrStandard => "super-or-standard",
            Policy::RestrictedOnly => "restricted-only",
            Policy::StandardOrRestricted => "standard-or-restricted",
            Policy::StandardOrRestrictedExclusive => "standard-or-restricted-exclusive",
            Policy::SellerOnly => "seller-only",
            Policy::CourierOnly => "courier-only",
            Policy::SellerCourierOnly => "seller-courier-only",
            Policy::StandardOrSeller => "standard-or-seller",
            Policy::StandardOrCourier => "standard-or-courier",
            Policy::StandardOrSellerCourier => "standard-or-seller-courier",
            Policy::SellerOrSellerCourier => "seller-or-seller-courier",
            Policy::ViewSales => "view-sales",
        }
    }

    /// Requirement from the process-wide registry.
    pub fn requirement(&self) -> &'static PolicyRequirement {
        PolicyRegistry::global().get(*self)
    }
}

impl core::fmt::Display for Policy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown policy '{0}'")]
pub struct UnknownPolicy(pub String);

impl FromStr for Policy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

/// Immutable requirement behind a policy.
///
/// `excludes_super` is an explicit flag rather than something inferred from
/// the shape of `allowed_roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRequirement {
    allowed_roles: BTreeSet<Role>,
    allowed_sub_roles: Option<BTreeSet<SubRole>>,
    excludes_super: bool,
}

impl PolicyRequirement {
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        let allowed_roles: BTreeSet<Role> = roles.into_iter().collect();
        debug_assert!(!allowed_roles.is_empty(), "a policy must allow at least one role");
        Self {
            allowed_roles,
            allowed_sub_roles: None,
            excludes_super: false,
        }
    }

    /// Restrict restricted-role users to these sub-roles. An empty set means
    /// no restriction.
    pub fn with_sub_roles(mut self, sub_roles: impl IntoIterator<Item = SubRole>) -> Self {
        let set: BTreeSet<SubRole> = sub_roles.into_iter().collect();
        self.allowed_sub_roles = (!set.is_empty()).then_some(set);
        self
    }

    pub fn excluding_super(mut self) -> Self {
        self.excludes_super = true;
        self
    }

    pub fn allowed_roles(&self) -> &BTreeSet<Role> {
        &self.allowed_roles
    }

    pub fn allowed_sub_roles(&self) -> Option<&BTreeSet<SubRole>> {
        self.allowed_sub_roles.as_ref()
    }

    pub fn excludes_super(&self) -> bool {
        self.excludes_super
    }

    /// Role-membership test.
    ///
    /// Super is an implicit superset of standard + restricted: it passes when
    /// listed, or when both subordinate roles are listed. Exclusion is decided
    /// afterwards by the evaluator.
    pub fn admits_role(&self, role: Role) -> bool {
        if self.allowed_roles.contains(&role) {
            return true;
        }
        role == Role::Super
            && self.allowed_roles.contains(&Role::Standard)
            && self.allowed_roles.contains(&Role::Restricted)
    }

    /// Whether `allowed_roles` is exactly {standard, restricted}.
    pub fn has_exclusive_shape(&self) -> bool {
        self.allowed_roles.len() == 2
            && self.allowed_roles.contains(&Role::Standard)
            && self.allowed_roles.contains(&Role::Restricted)
    }
}

/// Static mapping from every [`Policy`] to its requirement.
#[derive(Debug)]
pub struct PolicyRegistry {
    requirements: [PolicyRequirement; Policy::COUNT],
}

static REGISTRY: LazyLock<PolicyRegistry> = LazyLock::new(PolicyRegistry::builtin);

impl PolicyRegistry {
    /// Process-wide registry, built on first use and never mutated.
    pub fn global() -> &'static PolicyRegistry {
        &REGISTRY
    }

    fn builtin() -> Self {
        Self {
            requirements: Policy::ALL.map(builtin_requirement),
        }
    }

    pub fn get(&self, policy: Policy) -> &PolicyRequirement {
        &self.requirements[policy as usize]
    }

    pub fn entries(&self) -> impl Iterator<Item = (Policy, &PolicyRequirement)> {
        Policy::ALL.into_iter().zip(self.requirements.iter())
    }
}

fn builtin_requirement(policy: Policy) -> PolicyRequirement {
    use Role::{Restricted, Standard, Super};
    use SubRole::{Courier, Seller, SellerCourier};

    match policy {
        Policy::SuperOnly => PolicyRequirement::roles([Super]),
        Policy::StandardOnly => PolicyRequirement::roles([Standard]),
        Policy::SuperOrStandard => PolicyRequirement::roles([Super, Standard]),
        Policy::RestrictedOnly => PolicyRequirement::roles([Restricted]),
        Policy::StandardOrRestricted => PolicyRequirement::roles([Super, Standard, Restricted]),
        Policy::StandardOrRestrictedExclusive => {
            PolicyRequirement::roles([Standard, Restricted]).excluding_super()
        }
        Policy::SellerOnly => PolicyRequirement::roles([Restricted]).with_sub_roles([Seller]),
        Policy::CourierOnly => PolicyRequirement::roles([Restricted]).with_sub_roles([Courier]),
        Policy::SellerCourierOnly => {
            PolicyRequirement::roles([Restricted]).with_sub_roles([SellerCourier])
        }
        Policy::StandardOrSeller => PolicyRequirement::roles([Standard, Restricted])
            .with_sub_roles([Seller])
            .excluding_super(),
        Policy::StandardOrCourier => PolicyRequirement::roles([Standard, Restricted])
            .with_sub_roles([Courier])
            .excluding_super(),
        Policy::StandardOrSellerCourier => PolicyRequirement::roles([Standard, Restricted])
            .with_sub_roles([SellerCourier])
            .excluding_super(),
        Policy::SellerOrSellerCourier => {
            PolicyRequirement::roles([Restricted]).with_sub_roles([Seller, SellerCourier])
        }
        Policy::ViewSales => PolicyRequirement::roles([Standard, Restricted])
            .with_sub_roles([Seller, SellerCourier])
            .excluding_super(),
    }
}
