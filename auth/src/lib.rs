//! # ClientDesk Authentication
//!
//! Password accounts and bearer tokens.
//!
//! - **Passwords**: Argon2id through the [`PasswordHasher`] seam
//! - **Tokens**: HS256 JWTs (`sub`, `role`, `kind`, `iat`, `exp`) through the
//!   [`TokenIssuer`] seam, one hour by default
//! - **Password reset**: random 256-bit token emailed as a link; only its
//!   SHA-256 hash is stored, valid for one hour
//! - **Administration**: first-run super-admin setup, admin creation and
//!   account activation with notification emails
//!
//! ## Example
//!
//! ```rust,ignore
//! let service = AuthService::new(deps, AuthConfig::new(secret, frontend_url));
//! let session = service.login(&LoginRequest { email, password }).await?;
//! let actor = service.authenticate(&session.token.token)?;
//! ```

pub mod config;
pub mod error;
pub mod password;
pub mod requests;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::{AuthError, Result};
pub use password::{Argon2Hasher, PasswordHasher};
pub use requests::{
    AdminRequest, LoginRequest, Profile, ResetPasswordRequest, SignupRequest, StatusRequest,
    UpdatePasswordRequest,
};
pub use service::{AuthDependencies, AuthService, Session, StatusChange};
pub use token::{Claims, IssuedToken, JwtIssuer, TokenIssuer};
