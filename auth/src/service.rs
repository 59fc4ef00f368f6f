//! Account lifecycle: sign-up, login, password reset and administration.

use crate::config::{AuthConfig, MIN_PASSWORD_LEN};
use crate::error::{AuthError, Result};
use crate::password::{PasswordHasher, hash_blocking, verify_blocking};
use crate::requests::{
    AdminRequest, LoginRequest, Profile, ResetPasswordRequest, SignupRequest, UpdatePasswordRequest,
};
use crate::token::{IssuedToken, TokenIssuer};
use base64::Engine;
use clientdesk_core::environment::Clock;
use clientdesk_core::store::{Collection, Filter, new_id};
use clientdesk_core::validation::{is_valid_email, non_blank, normalize_email};
use clientdesk_core::{Account, AccountKind, Actor, EffectReport, Role};
use clientdesk_gateways::{AccountNotice, NotificationGateway, PasswordResetNotice};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// A signed-in account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token.
    #[serde(flatten)]
    pub token: IssuedToken,
    /// The account.
    pub user: Profile,
}

/// Result of an account status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    /// Account after the change.
    pub user: Profile,
    /// Notification outcome.
    pub effects: Vec<EffectReport>,
}

/// Stores and collaborators used by [`AuthService`].
#[derive(Clone)]
pub struct AuthDependencies {
    /// Account documents.
    pub accounts: Arc<dyn Collection<Account>>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Bearer tokens.
    pub tokens: Arc<dyn TokenIssuer>,
    /// Email delivery.
    pub notifier: Arc<dyn NotificationGateway>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

/// Authentication and account administration.
#[derive(Clone)]
pub struct AuthService {
    deps: AuthDependencies,
    config: AuthConfig,
}

impl AuthService {
    /// Create an auth service.
    #[must_use]
    pub const fn new(deps: AuthDependencies, config: AuthConfig) -> Self {
        Self { deps, config }
    }

    /// Check a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] or [`AuthError::TokenExpired`].
    pub fn authenticate(&self, token: &str) -> Result<Actor> {
        self.deps.tokens.verify(token).map(|claims| claims.actor())
    }

    /// Register a client account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for missing fields, a malformed
    /// email, a short password or an email already in use.
    pub async fn signup(&self, request: &SignupRequest) -> Result<Session> {
        let name = required("name", request.name.as_deref())?;
        let email = valid_email(request.email.as_deref())?;
        let password = valid_password(request.password.as_deref())?;
        self.ensure_email_free(&email).await?;

        let account = self.new_account(
            AccountKind::Client,
            Role::Client,
            name,
            email,
            password,
            non_blank(request.phone.as_deref()).map(str::to_string),
        )
        .await?;
        self.deps.accounts.insert(&account).await?;
        tracing::info!(account_id = %account.id, "Client account created");
        self.session(&account)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] for an unknown email or wrong password
    /// - [`AuthError::Forbidden`] for a deactivated account
    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        let (Some(email), Some(password)) = (
            non_blank(request.email.as_deref()),
            request.password.as_deref(),
        ) else {
            return Err(AuthError::Validation(
                "email and password are required".to_string(),
            ));
        };

        let found = self.find_by_email(&normalize_email(email)).await?;
        let verified = match &found {
            Some(account) => {
                verify_blocking(&self.deps.hasher, password, &account.password_hash).await?
            }
            None => false,
        };
        let account = found
            .filter(|_| verified)
            .ok_or_else(|| {
                tracing::info!("Failed login attempt");
                AuthError::InvalidCredentials
            })?;
        if !account.active {
            return Err(AuthError::Forbidden("Account is deactivated".to_string()));
        }
        tracing::info!(account_id = %account.id, "Logged in");
        self.session(&account)
    }

    /// The caller's own profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccountNotFound`] if the account was deleted.
    pub async fn me(&self, actor: &Actor) -> Result<Profile> {
        self.load(&actor.account_id).await.map(|a| Profile::from(&a))
    }

    /// Email a reset link when the address belongs to an account.
    ///
    /// Unknown addresses succeed silently so the endpoint does not reveal
    /// which emails are registered.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for a malformed email.
    pub async fn request_password_reset(&self, request: &ResetPasswordRequest) -> Result<()> {
        let email = valid_email(request.email.as_deref())?;
        let Some(mut account) = self.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_token();
        let now = self.deps.clock.now();
        account.reset_token_hash = Some(hash_token(&token));
        account.reset_token_expires_at = Some(now + self.config.reset_token_ttl);
        account.updated_at = now;
        self.deps.accounts.replace(&account).await?;

        let notice = PasswordResetNotice {
            name: account.name.clone(),
            email: account.email.clone(),
            reset_link: self.config.reset_link(&token),
            expires_in_minutes: self.config.reset_token_ttl.num_minutes(),
        };
        if let Err(err) = self.deps.notifier.send_password_reset(&notice).await {
            tracing::warn!(account_id = %account.id, error = %err, "Password reset email failed");
        }
        Ok(())
    }

    /// Set a new password using a reset token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidResetToken`] for an unknown or expired token
    /// - [`AuthError::Validation`] for a short password
    pub async fn update_password(&self, request: &UpdatePasswordRequest) -> Result<()> {
        let token = required("token", request.token.as_deref())?;
        let password = valid_password(request.password.as_deref())?;

        let now = self.deps.clock.now();
        let mut account = self
            .deps
            .accounts
            .find(&Filter::new().eq("resetTokenHash", hash_token(token)))
            .await?
            .into_iter()
            .next()
            .filter(|a| a.reset_token_expires_at.is_some_and(|at| at > now))
            .ok_or(AuthError::InvalidResetToken)?;

        account.password_hash = hash_blocking(&self.deps.hasher, password).await?;
        account.reset_token_hash = None;
        account.reset_token_expires_at = None;
        account.updated_at = now;
        self.deps.accounts.replace(&account).await?;
        tracing::info!(account_id = %account.id, "Password updated");
        Ok(())
    }

    /// Create the first super-admin.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Forbidden`] once any administrative account exists
    /// - [`AuthError::Validation`] for bad input
    pub async fn setup_admin(&self, request: &AdminRequest) -> Result<Session> {
        let admins = self
            .deps
            .accounts
            .find(&Filter::new().eq("kind", AccountKind::Admin.as_str()))
            .await?;
        if !admins.is_empty() {
            return Err(AuthError::Forbidden("Setup already completed".to_string()));
        }
        let account = self.create_admin_account(request, Role::SuperAdmin).await?;
        tracing::info!(account_id = %account.id, "Super admin created");
        self.session(&account)
    }

    /// Create an administrator. Super-admins only.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Forbidden`] unless `actor` is a super-admin
    /// - [`AuthError::Validation`] for bad input or a taken email
    pub async fn create_admin(&self, actor: &Actor, request: &AdminRequest) -> Result<Profile> {
        if actor.role != Role::SuperAdmin {
            return Err(AuthError::Forbidden(
                "Only a super admin can create admins".to_string(),
            ));
        }
        let account = self.create_admin_account(request, Role::Admin).await?;
        tracing::info!(account_id = %account.id, created_by = %actor.account_id, "Admin created");
        Ok(Profile::from(&account))
    }

    /// Accounts, newest first, optionally of one kind.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] on storage failures.
    pub async fn list_users(&self, kind: Option<AccountKind>) -> Result<Vec<Profile>> {
        let filter = match kind {
            Some(kind) => Filter::new().eq("kind", kind.as_str()),
            None => Filter::new(),
        };
        let mut accounts = self.deps.accounts.find(&filter).await?;
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts.iter().map(Profile::from).collect())
    }

    /// Activate or deactivate an account and notify its owner.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AccountNotFound`] for an unknown id
    /// - [`AuthError::Validation`] when an admin deactivates themselves
    /// - [`AuthError::Forbidden`] when a plain admin targets a super-admin
    pub async fn set_active(&self, actor: &Actor, id: &str, active: bool) -> Result<StatusChange> {
        let mut account = self.load(id).await?;
        if !active && account.id == actor.account_id {
            return Err(AuthError::Validation(
                "You cannot deactivate your own account".to_string(),
            ));
        }
        if account.role == Role::SuperAdmin && actor.role != Role::SuperAdmin {
            return Err(AuthError::Forbidden(
                "Only a super admin can change a super admin".to_string(),
            ));
        }

        if account.active == active {
            return Ok(StatusChange {
                user: Profile::from(&account),
                effects: Vec::new(),
            });
        }
        account.active = active;
        account.updated_at = self.deps.clock.now();
        self.deps.accounts.replace(&account).await?;
        tracing::info!(account_id = %account.id, active, changed_by = %actor.account_id, "Account status changed");

        let notice = AccountNotice {
            name: account.name.clone(),
            email: account.email.clone(),
            active,
        };
        let report = match self.deps.notifier.send_account_status(&notice).await {
            Ok(_) => EffectReport::succeeded("send-account-status-email"),
            Err(err) => {
                tracing::warn!(account_id = %account.id, error = %err, "Account status email failed");
                EffectReport::failed("send-account-status-email", err)
            }
        };
        Ok(StatusChange {
            user: Profile::from(&account),
            effects: vec![report],
        })
    }

    async fn create_admin_account(&self, request: &AdminRequest, role: Role) -> Result<Account> {
        let name = required("name", request.name.as_deref())?;
        let email = valid_email(request.email.as_deref())?;
        let password = valid_password(request.password.as_deref())?;
        self.ensure_email_free(&email).await?;

        let account = self
            .new_account(AccountKind::Admin, role, name, email, password, None)
            .await?;
        self.deps.accounts.insert(&account).await?;
        Ok(account)
    }

    async fn new_account(
        &self,
        kind: AccountKind,
        role: Role,
        name: &str,
        email: String,
        password: &str,
        phone: Option<String>,
    ) -> Result<Account> {
        let password_hash = hash_blocking(&self.deps.hasher, password).await?;
        let now = self.deps.clock.now();
        Ok(Account {
            id: new_id(),
            kind,
            role,
            name: name.to_string(),
            email,
            phone,
            password_hash,
            active: true,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn session(&self, account: &Account) -> Result<Session> {
        Ok(Session {
            token: self.deps.tokens.issue(account)?,
            user: Profile::from(account),
        })
    }

    async fn load(&self, id: &str) -> Result<Account> {
        self.deps
            .accounts
            .get(id)
            .await?
            .ok_or_else(|| AuthError::AccountNotFound(id.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .deps
            .accounts
            .find(&Filter::new().eq("email", email))
            .await?
            .into_iter()
            .next())
    }

    async fn ensure_email_free(&self, email: &str) -> Result<()> {
        if self.find_by_email(email).await?.is_some() {
            return Err(AuthError::Validation(
                "An account with this email already exists".to_string(),
            ));
        }
        Ok(())
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    non_blank(value).ok_or_else(|| AuthError::Validation(format!("{field} is required")))
}

fn valid_email(value: Option<&str>) -> Result<String> {
    let email = normalize_email(required("email", value)?);
    if !is_valid_email(&email) {
        return Err(AuthError::Validation("Invalid email address".to_string()));
    }
    Ok(email)
}

fn valid_password(value: Option<&str>) -> Result<&str> {
    let password = value
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AuthError::Validation("password is required".to_string()))?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(password)
}

/// 256-bit random token, base64url encoded (43 characters).
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of a reset token; only the hash is stored.
fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_url_safe_and_unique() {
        let first = generate_token();
        assert_eq!(first.len(), 43);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(first, generate_token());
    }

    #[test]
    fn token_hash_is_hex_sha256() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(matches!(
            valid_password(Some("short")),
            Err(AuthError::Validation(_))
        ));
        assert_eq!(valid_password(Some("long enough")), Ok("long enough"));
    }
}
