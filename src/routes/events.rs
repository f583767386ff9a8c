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
    dto::catalog::{CreateEventRequest, EventList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Event,
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/stream", get(stream_events))
        .route("/{id}", delete(delete_event))
}

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "All events, soonest first", body = ApiResponse<EventList>)
    ),
    tag = "Events"
)]
pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<ApiResponse<EventList>>> {
    let resp = catalog_service::list_events(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event published", body = ApiResponse<Event>),
        (status = 400, description = "Missing required field"),
        (status = 401, description = "Authentication required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Event>>)> {
    let resp = catalog_service::create_event(&state, &user, payload)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao cadastrar evento", err))?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Event not found or not yours"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalog_service::delete_event(&state, &user, id)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao remover evento", err))?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/events/stream",
    responses(
        (status = 200, description = "Server-sent events; every message is the full event list", content_type = "text/event-stream")
    ),
    tag = "Events"
)]
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    let stream = WatchStream::new(state.events_view.subscribe())
        .map(|items| SseEvent::default().event("events").json_data(items));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
