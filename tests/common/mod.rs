#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, Utc};
use marketplace_api::{
    config::{AppConfig, CartAddPolicy, default_display_offset},
    db::{create_orm_conn, run_migrations},
    entity::{
        events::ActiveModel as EventActive, services::ActiveModel as ServiceActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::{AuthUser, Role},
    models::{Event, Service},
    state::AppState,
};
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        agent_webhook_url: None,
        agent_timeout: Duration::from_secs(5),
        agent_platform: "web".to_string(),
        cart_add_policy: CartAddPolicy::Set,
        display_offset: default_display_offset(),
    }
}

/// Fresh in-memory database with the schema applied.
pub async fn setup_state(config: AppConfig) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, config)?)
}

pub async fn create_user(state: &AppState, email: &str, role: Role) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        full_name: Set(Some(format!("{email} name"))),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub async fn create_service(
    state: &AppState,
    owner: &AuthUser,
    name: &str,
    price_cents: Option<i64>,
) -> anyhow::Result<Service> {
    let service = ServiceActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner.user_id),
        name: Set(name.to_string()),
        description: Set(None),
        price_cents: Set(price_cents),
        responsible: Set("Ana".to_string()),
        contact: Set("ana@example.com".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(Service::from(service))
}

pub async fn create_event(
    state: &AppState,
    owner: &AuthUser,
    name: &str,
    event_date: DateTime<Utc>,
) -> anyhow::Result<Event> {
    let event = EventActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner.user_id),
        name: Set(name.to_string()),
        event_date: Set(event_date.into()),
        location: Set("Praça Central".to_string()),
        description: Set(None),
        responsible: Set("Ana".to_string()),
        contact: Set("ana@example.com".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(Event::from(event))
}
