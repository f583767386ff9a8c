use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod chat;
pub mod doc;
pub mod events;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod params;
pub mod profile;
pub mod services;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/events", events::router())
        .nest("/services", services::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/chat", chat::router())
        .nest("/notifications", notifications::router())
}
