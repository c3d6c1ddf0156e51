//! Strongly-typed identifiers used across the domain.
//!
//! Every identifier is a positive integer. Zero and negative values are
//! rejected at parse/conversion time, so a constructed id is always usable as
//! a storage key.

use core::num::NonZeroU64;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Common interface of the positive-integer identifiers.
///
/// Storage adapters use this to allocate ids without knowing the concrete type.
pub trait NumericId: Copy + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync + 'static {
    fn from_raw(value: NonZeroU64) -> Self;

    fn get(&self) -> u64;
}

/// Identifier of a tenant (multi-tenant boundary).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(NonZeroU64);

/// Identifier of a user (the token subject).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(NonZeroU64);

/// Identifier of a client (customer of a tenant).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(NonZeroU64);

/// Identifier of a product in a tenant's catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(NonZeroU64);

/// Identifier of a (client, product) listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientProductId(NonZeroU64);

/// Identifier of a sale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleId(NonZeroU64);

macro_rules! impl_numeric_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Returns `None` for zero.
            pub fn new(value: u64) -> Option<Self> {
                NonZeroU64::new(value).map(Self)
            }

            pub fn get(&self) -> u64 {
                self.0.get()
            }

            /// Signed representation used by SQL `BIGINT` columns.
            pub fn to_i64(&self) -> Result<i64, DomainError> {
                i64::try_from(self.0.get())
                    .map_err(|_| DomainError::invalid_id(format!("{}: out of range", $name)))
            }
        }

        impl NumericId for $t {
            fn from_raw(value: NonZeroU64) -> Self {
                Self(value)
            }

            fn get(&self) -> u64 {
                self.0.get()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0.get()
            }
        }

        impl TryFrom<u64> for $t {
            type Error = DomainError;

            fn try_from(value: u64) -> Result<Self, Self::Error> {
                Self::new(value)
                    .ok_or_else(|| DomainError::invalid_id(format!("{}: must be positive", $name)))
            }
        }

        impl TryFrom<i64> for $t {
            type Error = DomainError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                let value = u64::try_from(value)
                    .map_err(|_| DomainError::invalid_id(format!("{}: must be positive", $name)))?;
                Self::try_from(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::try_from(value)
            }
        }
    };
}

impl_numeric_id!(TenantId, "TenantId");
impl_numeric_id!(UserId, "UserId");
impl_numeric_id!(ClientId, "ClientId");
impl_numeric_id!(ProductId, "ProductId");
impl_numeric_id!(ClientProductId, "ClientProductId");
impl_numeric_id!(SaleId, "SaleId");
