//! Account flows against in-memory storage and the mock notifier.

#![allow(clippy::unwrap_used)]

use chrono::Duration;
use clientdesk_auth::{
    AdminRequest, Argon2Hasher, AuthConfig, AuthDependencies, AuthError, AuthService, JwtIssuer,
    LoginRequest, ResetPasswordRequest, SignupRequest, UpdatePasswordRequest,
};
use clientdesk_core::environment::Clock;
use clientdesk_core::{Account, AccountKind, Actor, EffectOutcome, Role};
use clientdesk_gateways::mocks::{MockNotificationGateway, SentNotification};
use clientdesk_testing::{InMemoryCollection, ManualClock, test_clock};
use std::sync::Arc;

struct Harness {
    auth: AuthService,
    accounts: InMemoryCollection<Account>,
    notifier: MockNotificationGateway,
    clock: ManualClock,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::new(test_clock().now());
        let accounts = InMemoryCollection::new();
        let notifier = MockNotificationGateway::new();
        let config = AuthConfig::new("test-secret", "https://desk.example.com");
        let auth = AuthService::new(
            AuthDependencies {
                accounts: Arc::new(accounts.clone()),
                hasher: Arc::new(Argon2Hasher::new()),
                tokens: Arc::new(JwtIssuer::new(
                    &config.jwt_secret,
                    config.token_ttl,
                    Arc::new(clock.clone()),
                )),
                notifier: Arc::new(notifier.clone()),
                clock: Arc::new(clock.clone()),
            },
            config,
        );
        Self {
            auth,
            accounts,
            notifier,
            clock,
        }
    }

    async fn signup(&self, email: &str) -> String {
        self.auth
            .signup(&SignupRequest {
                name: Some("Asha Rao".into()),
                email: Some(email.into()),
                password: Some("password123".into()),
                phone: None,
            })
            .await
            .unwrap()
            .user
            .id
    }

    async fn setup_owner(&self) -> Actor {
        let session = self
            .auth
            .setup_admin(&admin("Owner", "owner@example.com"))
            .await
            .unwrap();
        self.auth.authenticate(&session.token.token).unwrap()
    }
}

fn admin(name: &str, email: &str) -> AdminRequest {
    AdminRequest {
        name: Some(name.into()),
        email: Some(email.into()),
        password: Some("admin-password".into()),
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: Some(email.into()),
        password: Some(password.into()),
    }
}

#[tokio::test]
async fn signup_normalizes_email_and_signs_in() {
    let h = Harness::new();
    let session = h
        .auth
        .signup(&SignupRequest {
            name: Some("Asha".into()),
            email: Some("  Asha@Example.COM ".into()),
            password: Some("password123".into()),
            phone: Some("+91 98765 43210".into()),
        })
        .await
        .unwrap();

    assert_eq!(session.user.email, "asha@example.com");
    assert_eq!(session.user.kind, AccountKind::Client);
    let actor = h.auth.authenticate(&session.token.token).unwrap();
    assert_eq!(actor, Actor::new(session.user.id.clone(), Role::Client));

    let stored = h.accounts.all().into_iter().next().unwrap();
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn duplicate_email_and_short_password_are_rejected() {
    let h = Harness::new();
    h.signup("asha@example.com").await;

    let duplicate = h
        .auth
        .signup(&SignupRequest {
            name: Some("Other".into()),
            email: Some("ASHA@example.com".into()),
            password: Some("password123".into()),
            phone: None,
        })
        .await;
    assert!(matches!(duplicate, Err(AuthError::Validation(_))));

    let short = h
        .auth
        .signup(&SignupRequest {
            name: Some("Other".into()),
            email: Some("other@example.com".into()),
            password: Some("short".into()),
            phone: None,
        })
        .await;
    assert!(matches!(short, Err(AuthError::Validation(_))));
}

#[tokio::test]
async fn login_does_not_reveal_which_part_was_wrong() {
    let h = Harness::new();
    h.signup("asha@example.com").await;

    let wrong_password = h.auth.login(&login("asha@example.com", "nope-nope")).await;
    let unknown_email = h.auth.login(&login("who@example.com", "password123")).await;
    assert_eq!(wrong_password.unwrap_err(), AuthError::InvalidCredentials);
    assert_eq!(unknown_email.unwrap_err(), AuthError::InvalidCredentials);

    assert!(h.auth.login(&login("ASHA@example.com", "password123")).await.is_ok());
}

#[tokio::test]
async fn tokens_expire_after_an_hour() {
    let h = Harness::new();
    h.signup("asha@example.com").await;
    let session = h
        .auth
        .login(&login("asha@example.com", "password123"))
        .await
        .unwrap();

    h.clock.advance(Duration::hours(1));
    assert_eq!(
        h.auth.authenticate(&session.token.token),
        Err(AuthError::TokenExpired)
    );
}

#[tokio::test]
async fn password_reset_round_trip() {
    let h = Harness::new();
    h.signup("asha@example.com").await;

    h.auth
        .request_password_reset(&ResetPasswordRequest {
            email: Some("asha@example.com".into()),
        })
        .await
        .unwrap();
    let link = h.notifier.last_reset_link("asha@example.com").unwrap();
    let token = link.split("token=").nth(1).unwrap().to_string();
    assert!(link.starts_with("https://desk.example.com/reset-password?token="));

    let stored = h.accounts.all().into_iter().next().unwrap();
    assert_ne!(stored.reset_token_hash.as_deref(), Some(token.as_str()));

    h.auth
        .update_password(&UpdatePasswordRequest {
            token: Some(token.clone()),
            password: Some("new-password".into()),
        })
        .await
        .unwrap();

    assert!(h.auth.login(&login("asha@example.com", "new-password")).await.is_ok());
    assert!(h.auth.login(&login("asha@example.com", "password123")).await.is_err());

    let reused = h
        .auth
        .update_password(&UpdatePasswordRequest {
            token: Some(token),
            password: Some("another-one".into()),
        })
        .await;
    assert_eq!(reused, Err(AuthError::InvalidResetToken));
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let h = Harness::new();
    h.signup("asha@example.com").await;
    h.auth
        .request_password_reset(&ResetPasswordRequest {
            email: Some("asha@example.com".into()),
        })
        .await
        .unwrap();
    let link = h.notifier.last_reset_link("asha@example.com").unwrap();
    let token = link.split("token=").nth(1).unwrap().to_string();

    h.clock.advance(Duration::minutes(61));
    let result = h
        .auth
        .update_password(&UpdatePasswordRequest {
            token: Some(token),
            password: Some("new-password".into()),
        })
        .await;
    assert_eq!(result, Err(AuthError::InvalidResetToken));
}

#[tokio::test]
async fn reset_for_unknown_email_is_silent() {
    let h = Harness::new();
    h.auth
        .request_password_reset(&ResetPasswordRequest {
            email: Some("ghost@example.com".into()),
        })
        .await
        .unwrap();
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn setup_admin_runs_once() {
    let h = Harness::new();
    let owner = h.setup_owner().await;
    assert_eq!(owner.role, Role::SuperAdmin);

    let again = h
        .auth
        .setup_admin(&admin("Intruder", "intruder@example.com"))
        .await;
    assert!(matches!(again, Err(AuthError::Forbidden(_))));
}

#[tokio::test]
async fn only_super_admins_create_admins() {
    let h = Harness::new();
    let owner = h.setup_owner().await;

    let staff = h
        .auth
        .create_admin(&owner, &admin("Staff", "staff@example.com"))
        .await
        .unwrap();
    assert_eq!(staff.role, Role::Admin);
    assert_eq!(staff.kind, AccountKind::Admin);

    let staff_actor = Actor::new(staff.id, Role::Admin);
    let denied = h
        .auth
        .create_admin(&staff_actor, &admin("Another", "another@example.com"))
        .await;
    assert!(matches!(denied, Err(AuthError::Forbidden(_))));

    assert_eq!(h.auth.list_users(Some(AccountKind::Admin)).await.unwrap().len(), 2);
    assert!(h.auth.list_users(Some(AccountKind::Client)).await.unwrap().is_empty());
}

#[tokio::test]
async fn deactivation_blocks_login_and_notifies() {
    let h = Harness::new();
    let owner = h.setup_owner().await;
    let client_id = h.signup("asha@example.com").await;

    let change = h.auth.set_active(&owner, &client_id, false).await.unwrap();
    assert!(!change.user.active);
    assert_eq!(change.effects[0].outcome, EffectOutcome::Succeeded);
    assert!(h.notifier.sent().contains(&SentNotification::AccountStatus {
        to: "asha@example.com".into(),
        active: false,
    }));

    let denied = h.auth.login(&login("asha@example.com", "password123")).await;
    assert!(matches!(denied, Err(AuthError::Forbidden(_))));

    let self_deactivation = h.auth.set_active(&owner, &owner.account_id, false).await;
    assert!(matches!(self_deactivation, Err(AuthError::Validation(_))));
}

#[tokio::test]
async fn email_failure_does_not_block_status_change() {
    let h = Harness::new();
    let owner = h.setup_owner().await;
    let client_id = h.signup("asha@example.com").await;
    h.notifier.fail(true);

    let change = h.auth.set_active(&owner, &client_id, false).await.unwrap();
    assert!(!change.user.active);
    assert_eq!(change.effects[0].outcome, EffectOutcome::Failed);
}
