use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CreateEventRequest, CreateServiceRequest, EventList, ServiceList},
    entity::{
        events::{ActiveModel as EventActive, Column as EventCol, Entity as Events},
        services::{ActiveModel as ServiceActive, Column as ServiceCol, Entity as Services},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Operation, authorize},
    models::{Event, Service},
    response::{ApiResponse, Meta},
    realtime::{ChangeKind, Collection},
    services::profile_service::find_user,
    state::AppState,
};

pub const UNKNOWN_RESPONSIBLE: &str = "Não informado";
/// R$ 1 billion.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

fn required(field: &str, value: String) -> AppResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Events, soonest first.
pub async fn fetch_events<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<Event>> {
    let events = Events::find()
        .order_by_asc(EventCol::EventDate)
        .order_by_asc(EventCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Event::from)
        .collect();
    Ok(events)
}

/// Services, most recently added first.
pub async fn fetch_services<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<Service>> {
    let services = Services::find()
        .order_by_desc(ServiceCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Service::from)
        .collect();
    Ok(services)
}

pub async fn list_events(state: &AppState) -> AppResult<ApiResponse<EventList>> {
    let items = fetch_events(&state.orm).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Events",
        EventList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn list_services(state: &AppState) -> AppResult<ApiResponse<ServiceList>> {
    let items = fetch_services(&state.orm).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Services",
        ServiceList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_event(
    state: &AppState,
    user: &AuthUser,
    payload: CreateEventRequest,
) -> AppResult<ApiResponse<Event>> {
    authorize(user, Operation::PublishEvent)?;

    let event = EventActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set(required("name", payload.name)?),
        event_date: Set(payload.event_date.into()),
        location: Set(required("location", payload.location)?),
        description: Set(optional(payload.description)),
        responsible: Set(required("responsible", payload.responsible)?),
        contact: Set(required("contact", payload.contact)?),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    state.changes.publish(Collection::Events, ChangeKind::Insert);
    audit::record(
        &state.orm,
        user.user_id,
        "event_create",
        "events",
        serde_json::json!({ "event_id": event.id }),
    )
    .await;
    state.notifier.success(
        user.user_id,
        "Evento cadastrado com sucesso!",
        "O evento foi adicionado à base de dados.",
    );

    Ok(ApiResponse::success("Event created", Event::from(event), Some(Meta::empty())))
}

pub async fn create_service(
    state: &AppState,
    user: &AuthUser,
    payload: CreateServiceRequest,
) -> AppResult<ApiResponse<Service>> {
    authorize(user, Operation::PublishService)?;

    if let Some(price) = payload.price_cents {
        if price < 0 {
            return Err(AppError::BadRequest("price_cents must not be negative".into()));
        }
        if price > MAX_PRICE_CENTS {
            return Err(AppError::BadRequest(format!(
                "price_cents must not exceed {MAX_PRICE_CENTS}"
            )));
        }
    }

    let publisher = find_user(&state.orm, user.user_id).await?;
    let responsible = optional(publisher.full_name).unwrap_or_else(|| UNKNOWN_RESPONSIBLE.to_string());

    let service = ServiceActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set(required("name", payload.name)?),
        description: Set(optional(payload.description)),
        price_cents: Set(payload.price_cents),
        responsible: Set(responsible),
        contact: Set(required("contact", payload.contact)?),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    state.changes.publish(Collection::Services, ChangeKind::Insert);
    audit::record(
        &state.orm,
        user.user_id,
        "service_create",
        "services",
        serde_json::json!({ "service_id": service.id }),
    )
    .await;
    state.notifier.success(
        user.user_id,
        "Serviço cadastrado com sucesso!",
        "O serviço foi adicionado à base de dados.",
    );

    Ok(ApiResponse::success("Service created", Service::from(service), Some(Meta::empty())))
}

pub async fn delete_event(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user, Operation::PublishEvent)?;
    let result = Events::delete_many()
        .filter(
            Condition::all()
                .add(EventCol::Id.eq(id))
                .add(EventCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    state.changes.publish(Collection::Events, ChangeKind::Delete);
    audit::record(
        &state.orm,
        user.user_id,
        "event_delete",
        "events",
        serde_json::json!({ "event_id": id }),
    )
    .await;

    Ok(ApiResponse::success("Deleted", serde_json::json!({}), Some(Meta::empty())))
}

pub async fn delete_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user, Operation::PublishService)?;
    let result = Services::delete_many()
        .filter(
            Condition::all()
                .add(ServiceCol::Id.eq(id))
                .add(ServiceCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    // Cart lines referencing the service cascade away with it.
    state.changes.publish(Collection::Services, ChangeKind::Delete);
    state.changes.publish(Collection::CartLines, ChangeKind::Delete);
    audit::record(
        &state.orm,
        user.user_id,
        "service_delete",
        "services",
        serde_json::json!({ "service_id": id }),
    )
    .await;

    Ok(ApiResponse::success("Deleted", serde_json::json!({}), Some(Meta::empty())))
}
