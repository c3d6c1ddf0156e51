use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Claim set of a token whose signature has already been verified.
///
/// Kept as a loose name → JSON value map: the identity and tenant resolvers
/// decide which claims they read and how strictly they parse them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifiedClaims(BTreeMap<String, Value>);

impl VerifiedClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and service tokens.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// `iat` as seconds since the epoch.
    pub fn issued_at(&self) -> Option<i64> {
        self.get("iat").and_then(Value::as_i64)
    }

    /// `exp` as seconds since the epoch.
    pub fn expires_at(&self) -> Option<i64> {
        self.get("exp").and_then(Value::as_i64)
    }
}

impl From<BTreeMap<String, Value>> for VerifiedClaims {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self(value)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token is missing the '{0}' claim")]
    MissingClaim(&'static str),

    #[error("malformed or unverifiable token: {0}")]
    Malformed(String),
}

/// Deterministically validate the `iat`/`exp` window of a claim set.
pub fn validate_time_window(claims: &VerifiedClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let issued_at = claims
        .issued_at()
        .ok_or(TokenValidationError::MissingClaim("iat"))?;
    let expires_at = claims
        .expires_at()
        .ok_or(TokenValidationError::MissingClaim("exp"))?;
    let now = now.timestamp();

    if expires_at <= issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Transport-side token verification.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedClaims, TokenValidationError>;
}

/// HMAC-SHA256 token validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window is checked against the caller-supplied clock instead.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<VerifiedClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;
        validate_time_window(&data.claims, now)?;
        Ok(data.claims)
    }
}
