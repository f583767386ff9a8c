use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::profile::{UpdateEmailRequest, UpdatePasswordRequest, UpdateProfileRequest},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Profile,
    response::{ApiResponse, Meta},
    services::auth_service::{hash_password, normalize_email, validate_password},
    state::AppState,
};

pub fn profile_from_entity(model: UserModel) -> AppResult<Profile> {
    Ok(Profile {
        id: model.id,
        email: model.email,
        full_name: model.full_name,
        role: model.role.parse()?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub async fn find_user<C: sea_orm::ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<UserModel> {
    Users::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let model = find_user(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success("Profile", profile_from_entity(model)?, Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let full_name = payload.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(AppError::BadRequest("full_name must not be empty".into()));
    }

    let mut active: UserActive = find_user(&state.orm, user.user_id).await?.into();
    active.full_name = Set(Some(full_name));
    let updated = active.update(&state.orm).await?;

    state
        .notifier
        .success(user.user_id, "Perfil atualizado", "Seu nome foi atualizado com sucesso.");

    Ok(ApiResponse::success("Updated", profile_from_entity(updated)?, Some(Meta::empty())))
}

pub async fn update_email(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateEmailRequest,
) -> AppResult<ApiResponse<Profile>> {
    let email = normalize_email(&payload.email)?;

    let taken = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .filter(UserCol::Id.ne(user.user_id))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("Email is already taken".into()));
    }

    let mut active: UserActive = find_user(&state.orm, user.user_id).await?.into();
    active.email = Set(email);
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "email_update",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;
    state
        .notifier
        .success(user.user_id, "Email atualizado", "Seu email foi alterado.");

    Ok(ApiResponse::success("Updated", profile_from_entity(updated)?, Some(Meta::empty())))
}

pub async fn update_password(
    state: &AppState,
    user: &AuthUser,
    payload: UpdatePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    validate_password(&payload.password)?;

    let mut active: UserActive = find_user(&state.orm, user.user_id).await?.into();
    active.password_hash = Set(hash_password(&payload.password)?);
    active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "password_update",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;
    state
        .notifier
        .success(user.user_id, "Senha atualizada", "Sua senha foi alterada com sucesso.");

    Ok(ApiResponse::success("Updated", serde_json::json!({}), Some(Meta::empty())))
}
