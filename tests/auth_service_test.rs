//! Auth service integration tests over the full in-memory service graph.

use vending_machine::config::Config;
use vending_machine::domain::UserRole;
use vending_machine::errors::AppError;
use vending_machine::services::{AuthService, ServiceContainer, Services, UserService};

fn services() -> Services {
    Services::in_memory(Config::new("test-secret-key-minimum-32-chars!!", 30, 30))
}

#[tokio::test]
async fn test_login_success_reports_prior_sessions() {
    let services = services();
    services
        .users()
        .register("alice", "password1", UserRole::Buyer)
        .await
        .unwrap();

    let first = services.auth().login("alice", "password1").await.unwrap();
    assert_eq!(first.user.username, "alice");
    assert_eq!(first.active_sessions, 0);

    // The second login sees the first session as already active.
    let second = services.auth().login("alice", "password1").await.unwrap();
    assert_eq!(second.active_sessions, 1);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let services = services();
    services
        .users()
        .register("alice", "password1", UserRole::Buyer)
        .await
        .unwrap();

    let wrong_password = services
        .auth()
        .login("alice", "wrongpass2")
        .await
        .unwrap_err();
    let unknown_user = services
        .auth()
        .login("nobody", "password1")
        .await
        .unwrap_err();

    // Same error either way: no username enumeration.
    assert!(matches!(wrong_password, AppError::InvalidCredentials));
    assert!(matches!(unknown_user, AppError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_refresh_through_auth_service() {
    let services = services();
    services
        .users()
        .register("alice", "password1", UserRole::Buyer)
        .await
        .unwrap();
    let login = services.auth().login("alice", "password1").await.unwrap();

    let rotated = services
        .auth()
        .refresh_auth(&login.tokens.refresh.token)
        .await
        .unwrap();

    // Original token was consumed by the rotation.
    assert!(matches!(
        services
            .auth()
            .refresh_auth(&login.tokens.refresh.token)
            .await
            .unwrap_err(),
        AppError::Unauthorized
    ));
    assert!(matches!(
        services
            .auth()
            .logout(&login.tokens.refresh.token)
            .await
            .unwrap_err(),
        AppError::Unauthorized
    ));

    services
        .auth()
        .logout(&rotated.refresh.token)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logout_all_through_auth_service() {
    let services = services();
    services
        .users()
        .register("alice", "password1", UserRole::Buyer)
        .await
        .unwrap();

    let logins = [
        services.auth().login("alice", "password1").await.unwrap(),
        services.auth().login("alice", "password1").await.unwrap(),
        services.auth().login("alice", "password1").await.unwrap(),
    ];

    services
        .auth()
        .logout_all(&logins[1].tokens.refresh.token)
        .await
        .unwrap();

    for login in &logins {
        assert!(matches!(
            services
                .auth()
                .refresh_auth(&login.tokens.refresh.token)
                .await
                .unwrap_err(),
            AppError::Unauthorized
        ));
    }
}

#[tokio::test]
async fn test_verify_access_token_returns_subject() {
    let services = services();
    let user = services
        .users()
        .register("alice", "password1", UserRole::Buyer)
        .await
        .unwrap();
    let login = services.auth().login("alice", "password1").await.unwrap();

    let subject = services
        .auth()
        .verify_access_token(&login.tokens.access.token)
        .unwrap();
    assert_eq!(subject, user.id);

    // A refresh token is not an access token.
    assert!(services
        .auth()
        .verify_access_token(&login.tokens.refresh.token)
        .is_err());
}

#[tokio::test]
async fn test_garbage_token_rejected_everywhere() {
    let services = services();

    assert!(matches!(
        services.auth().refresh_auth("not-a-token").await.unwrap_err(),
        AppError::Unauthorized
    ));
    assert!(matches!(
        services.auth().logout("not-a-token").await.unwrap_err(),
        AppError::Unauthorized
    ));
    assert!(matches!(
        services.auth().logout_all("not-a-token").await.unwrap_err(),
        AppError::Unauthorized
    ));
}
