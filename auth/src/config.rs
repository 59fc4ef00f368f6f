//! Authentication configuration.
//!
//! Values come from the application's environment; nothing here reads it.

use chrono::Duration;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Token and password-reset settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for bearer tokens.
    pub jwt_secret: String,

    /// Bearer token lifetime.
    ///
    /// Default: 1 hour
    pub token_ttl: Duration,

    /// Password reset token lifetime.
    ///
    /// Default: 1 hour
    pub reset_token_ttl: Duration,

    /// Frontend base URL for reset links.
    ///
    /// Links are formatted as `{frontend_url}/reset-password?token={token}`.
    pub frontend_url: String,
}

impl AuthConfig {
    /// Create a configuration with default lifetimes.
    #[must_use]
    pub fn new(jwt_secret: impl Into<String>, frontend_url: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::hours(1),
            reset_token_ttl: Duration::hours(1),
            frontend_url: frontend_url.into(),
        }
    }

    /// Set the bearer token lifetime.
    #[must_use]
    pub const fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set the reset token lifetime.
    #[must_use]
    pub const fn with_reset_token_ttl(mut self, ttl: Duration) -> Self {
        self.reset_token_ttl = ttl;
        self
    }

    /// Reset link carrying `token`.
    #[must_use]
    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={token}",
            self.frontend_url.trim_end_matches('/')
        )
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new("change-me", "http://localhost:3000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_link_ignores_trailing_slash() {
        let config = AuthConfig::new("s", "https://desk.example.com/");
        assert_eq!(
            config.reset_link("abc"),
            "https://desk.example.com/reset-password?token=abc"
        );
    }

    #[test]
    fn defaults_to_one_hour() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl, Duration::hours(1));
        assert_eq!(config.reset_token_ttl, Duration::hours(1));
    }
}
