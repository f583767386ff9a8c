mod common;

use common::{setup_state, test_config};
use marketplace_api::{
    dto::{
        auth::{LoginRequest, RegisterRequest},
        profile::{UpdateEmailRequest, UpdatePasswordRequest, UpdateProfileRequest},
    },
    error::AppError,
    middleware::auth::{AuthUser, Role},
    services::{auth_service, profile_service},
};

fn register(email: &str, password: &str, role: Role) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        full_name: Some("Carla".to_string()),
        role,
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn register_then_login_issues_a_token() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;

    let profile = auth_service::register_user(&state, register("  Carla@Example.com ", "segredo1", Role::Provider))
        .await?
        .data
        .expect("profile");
    assert_eq!(profile.email, "carla@example.com");
    assert_eq!(profile.role, Role::Provider);

    let token = auth_service::login_user(&state, login("carla@example.com", "segredo1"))
        .await?
        .data
        .expect("token");
    assert!(!token.token.is_empty());

    let err = auth_service::login_user(&state, login("carla@example.com", "errada1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn duplicate_emails_and_short_passwords_are_rejected() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;
    auth_service::register_user(&state, register("a@example.com", "segredo1", Role::Purchaser)).await?;

    let err = auth_service::register_user(&state, register("A@example.com", "segredo1", Role::Purchaser))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = auth_service::register_user(&state, register("b@example.com", "123", Role::Purchaser))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn profile_settings_can_be_changed() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;
    let profile = auth_service::register_user(&state, register("d@example.com", "segredo1", Role::Purchaser))
        .await?
        .data
        .expect("profile");
    let user = AuthUser {
        user_id: profile.id,
        role: profile.role,
    };

    let updated = profile_service::update_profile(
        &state,
        &user,
        UpdateProfileRequest { full_name: " Diana ".to_string() },
    )
    .await?
    .data
    .expect("profile");
    assert_eq!(updated.full_name.as_deref(), Some("Diana"));

    profile_service::update_email(&state, &user, UpdateEmailRequest { email: "diana@example.com".to_string() })
        .await?;
    profile_service::update_password(&state, &user, UpdatePasswordRequest { password: "novasenha".to_string() })
        .await?;

    let token = auth_service::login_user(&state, login("diana@example.com", "novasenha")).await?;
    assert!(token.data.is_some());

    let fetched = profile_service::get_profile(&state, &user).await?.data.expect("profile");
    assert_eq!(fetched.email, "diana@example.com");
    Ok(())
}
