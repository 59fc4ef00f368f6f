//! Client and administrative accounts.

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account-kind discriminator carried in bearer tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Customer of the business.
    Client,
    /// Staff member.
    Admin,
}

impl AccountKind {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Admin => "admin",
        }
    }
}

/// Authorization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Regular client.
    Client,
    /// Staff with back-office access.
    Admin,
    /// Staff who can create other admins.
    SuperAdmin,
}

impl Role {
    /// Back-office access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Admin => "admin",
            Self::SuperAdmin => "super-admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A login identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Document id, the token subject.
    pub id: String,
    /// Client or admin.
    pub kind: AccountKind,
    /// Authorization role.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Lowercased login email.
    pub email: String,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Disabled accounts cannot log in.
    pub active: bool,
    /// SHA-256 of the outstanding reset token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token_hash: Option<String>,
    /// Reset token expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document for Account {
    const COLLECTION: &'static str = "accounts";

    fn id(&self) -> &str {
        &self.id
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Account id from the bearer token.
    pub account_id: String,
    /// Role from the bearer token.
    pub role: Role,
}

impl Actor {
    /// Create an actor.
    #[must_use]
    pub fn new(account_id: impl Into<String>, role: Role) -> Self {
        Self {
            account_id: account_id.into(),
            role,
        }
    }

    /// Whether the caller has administrative rights.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Owners and admins may access a record.
    #[must_use]
    pub fn can_access(&self, owner_id: &str) -> bool {
        self.is_admin() || self.account_id == owner_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super-admin\"");
        assert!(Role::SuperAdmin.is_admin());
        assert!(!Role::Client.is_admin());
    }

    #[test]
    fn owners_and_admins_have_access() {
        assert!(Actor::new("a1", Role::Client).can_access("a1"));
        assert!(!Actor::new("a1", Role::Client).can_access("a2"));
        assert!(Actor::new("root", Role::Admin).can_access("a2"));
    }
}
