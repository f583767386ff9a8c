use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{delete, get},
};
use tokio_stream::{Stream, StreamExt, wrappers::WatchStream};
use uuid::Uuid;

use crate::{
    dto::catalog::{CreateServiceRequest, ServiceList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Service,
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_services).post(create_service))
        .route("/stream", get(stream_services))
        .route("/{id}", delete(delete_service))
}

#[utoipa::path(
    get,
    path = "/api/services",
    responses(
        (status = 200, description = "All services, newest first", body = ApiResponse<ServiceList>)
    ),
    tag = "Services"
)]
pub async fn list_services(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ServiceList>>> {
    let resp = catalog_service::list_services(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service published", body = ApiResponse<Service>),
        (status = 400, description = "Missing required field or negative price"),
        (status = 401, description = "Authentication required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn create_service(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateServiceRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Service>>)> {
    let resp = catalog_service::create_service(&state, &user, payload)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao cadastrar serviço", err))?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Service not found or not yours"),
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn delete_service(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalog_service::delete_service(&state, &user, id)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao remover serviço", err))?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/services/stream",
    responses(
        (status = 200, description = "Server-sent events; every message is the full service list", content_type = "text/event-stream")
    ),
    tag = "Services"
)]
pub async fn stream_services(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    let stream = WatchStream::new(state.services_view.subscribe())
        .map(|items| SseEvent::default().event("services").json_data(items));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
