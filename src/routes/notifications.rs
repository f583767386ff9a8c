use axum::{
    Router,
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::{middleware::auth::AuthUser, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/stream", get(stream_notifications))
}

#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    responses(
        (status = 200, description = "Server-sent notifications addressed to the current user", content_type = "text/event-stream")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn stream_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Sse<impl Stream<Item = Result<SseEvent, axum::Error>>> {
    let user_id = user.user_id;
    // Lagged receivers just skip what they missed.
    let stream = BroadcastStream::new(state.notifier.subscribe()).filter_map(move |received| {
        match received {
            Ok(notification) if notification.user_id == user_id => {
                Some(SseEvent::default().event("notification").json_data(notification))
            }
            _ => None,
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
