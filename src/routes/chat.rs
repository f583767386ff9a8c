use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::chat::{ChatReply, ChatRequest, Transcript},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::chat_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(history).post(send_message).delete(reset))
}

#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply, from the external agent or the local fallback", body = ApiResponse<ChatReply>),
        (status = 400, description = "Empty message"),
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChatRequest>,
) -> AppResult<Json<ApiResponse<ChatReply>>> {
    let resp = chat_service::send_message(&state, &user, payload)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao enviar mensagem", err))?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/chat",
    responses(
        (status = 200, description = "Conversation so far, oldest first", body = ApiResponse<Transcript>),
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Transcript>>> {
    let resp = chat_service::transcript(&state, &user)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao carregar conversa", err))?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/chat",
    responses(
        (status = 200, description = "Conversation reset to the greeting", body = ApiResponse<Transcript>),
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn reset(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Transcript>>> {
    let resp = chat_service::reset(&state, &user)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao reiniciar conversa", err))?;
    Ok(Json(resp))
}
