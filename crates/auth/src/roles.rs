use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tradedesk_core::DomainError;

/// Top-level access tier of a user.
///
/// - `Super`: platform administrator. Implicitly covers the other tiers unless a
///   policy explicitly excludes it.
/// - `Standard`: business owner/manager inside a tenant.
/// - `Restricted`: employee; further narrowed by a [`SubRole`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Super,
    Standard,
    Restricted,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Super, Role::Standard, Role::Restricted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Super => "super",
            Role::Standard => "standard",
            Role::Restricted => "restricted",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "super" => Ok(Role::Super),
            "standard" => Ok(Role::Standard),
            "restricted" => Ok(Role::Restricted),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Specialization of a [`Role::Restricted`] user.
///
/// Ignored for every other role, even when stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubRole {
    /// Records sales.
    Seller,
    /// Delivers sales.
    Courier,
    /// Both sells and delivers.
    SellerCourier,
}

impl SubRole {
    pub const ALL: [SubRole; 3] = [SubRole::Seller, SubRole::Courier, SubRole::SellerCourier];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubRole::Seller => "seller",
            SubRole::Courier => "courier",
            SubRole::SellerCourier => "seller_courier",
        }
    }
}

impl core::fmt::Display for SubRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seller" => Ok(SubRole::Seller),
            "courier" => Ok(SubRole::Courier),
            "seller_courier" => Ok(SubRole::SellerCourier),
            other => Err(DomainError::validation(format!("unknown sub-role '{other}'"))),
        }
    }
}
