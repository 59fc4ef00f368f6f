//! Request bodies and public account views.

use chrono::{DateTime, Utc};
use clientdesk_core::{Account, AccountKind, Role};
use serde::{Deserialize, Serialize};

/// `POST /auth/signup`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    /// Display name.
    pub name: Option<String>,
    /// Login email.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

/// `POST /auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Option<String>,
}

/// `POST /auth/reset-password`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordRequest {
    /// Account email.
    pub email: Option<String>,
}

/// `POST /auth/update-password`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// Token from the reset link.
    pub token: Option<String>,
    /// New plain-text password.
    #[serde(alias = "newPassword")]
    pub password: Option<String>,
}

/// `POST /admin/setup` and `POST /admin/create-admin`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminRequest {
    /// Display name.
    pub name: Option<String>,
    /// Login email.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Option<String>,
}

/// `PATCH /admin/users/:id/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    /// New state.
    pub active: bool,
}

/// An account without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Account id.
    pub id: String,
    /// Client or administrative.
    pub kind: AccountKind,
    /// Role.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Whether login is allowed.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for Profile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            kind: account.kind,
            role: account.role,
            name: account.name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            active: account.active,
            created_at: account.created_at,
        }
    }
}
