//! Bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the account id, role and account kind.
//! Expiry is checked against the injected clock rather than the system time,
//! so tests can run against a fixed instant.

use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use clientdesk_core::environment::Clock;
use clientdesk_core::{Account, AccountKind, Actor, Role};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    /// Account role.
    pub role: Role,
    /// Client or administrative account.
    pub kind: AccountKind,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    /// The caller identified by these claims.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub.clone(), self.role)
    }
}

/// A signed token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// When it stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Issues and checks bearer tokens.
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for `account`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if encoding fails.
    fn issue(&self, account: &Account) -> Result<IssuedToken>;

    /// Decode and check a token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] for bad signatures or malformed tokens
    /// - [`AuthError::TokenExpired`] once `exp` has passed
    fn verify(&self, token: &str) -> Result<Claims>;
}

/// HS256 JWT issuer.
#[derive(Clone)]
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtIssuer {
    /// Create an issuer signing with `secret`.
    #[must_use]
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, account: &Account) -> Result<IssuedToken> {
        let now = self.clock.now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: account.id.clone(),
            role: account.role,
            kind: account.kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AuthError::InvalidToken
            })?
            .claims;
        if claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}
