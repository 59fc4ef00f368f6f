//! Error types for authentication and account management.

use clientdesk_core::store::StoreError;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of sign-up, login, tokens and account administration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Unknown email or wrong password. Both read the same.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Bearer token missing, malformed or signed with another key.
    #[error("Invalid authentication token")]
    InvalidToken,

    /// Bearer token past its expiry.
    #[error("Authentication token has expired")]
    TokenExpired,

    /// Password reset token unknown or expired.
    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Account does not exist.
    #[error("Account {0} not found")]
    AccountNotFound(String),

    // ═══════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════

    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Token could not be signed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Returns `true` when the caller must re-authenticate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use clientdesk_auth::AuthError;
    /// assert!(AuthError::TokenExpired.is_unauthenticated());
    /// assert!(!AuthError::Forbidden("no".into()).is_unauthenticated());
    /// ```
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired
        )
    }

    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use clientdesk_auth::AuthError;
    /// assert!(AuthError::InvalidResetToken.is_user_error());
    /// assert!(!AuthError::Hashing("oom".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidResetToken)
    }
}
