use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};

use crate::{
    dto::profile::{UpdateEmailRequest, UpdatePasswordRequest, UpdateProfileRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Profile,
    response::ApiResponse,
    services::profile_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/email", put(update_email))
        .route("/password", put(update_password))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Current user's profile", body = ApiResponse<Profile>),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let resp = profile_service::get_profile(&state, &user)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao carregar perfil", err))?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Name updated", body = ApiResponse<Profile>),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let resp = profile_service::update_profile(&state, &user, payload)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao atualizar perfil", err))?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile/email",
    request_body = UpdateEmailRequest,
    responses(
        (status = 200, description = "Email updated", body = ApiResponse<Profile>),
        (status = 400, description = "Invalid or taken email"),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_email(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateEmailRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let resp = profile_service::update_email(&state, &user, payload)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao atualizar email", err))?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile/password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Password too short"),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = profile_service::update_password(&state, &user, payload)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao atualizar senha", err))?;
    Ok(Json(resp))
}
