mod common;

use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{Duration as ChronoDuration, Utc};
use common::{create_user, setup_state, test_config};
use marketplace_api::{
    dto::{
        cart::AddToCartRequest,
        catalog::{CreateEventRequest, CreateServiceRequest},
        chat::ChatRequest,
    },
    entity::users::{ActiveModel as UserActive, Entity as Users},
    error::AppError,
    middleware::auth::Role,
    models::{Event, Service},
    notify::Variant,
    routes,
    services::{
        cart_service,
        catalog_service::{self, MAX_PRICE_CENTS, UNKNOWN_RESPONSIBLE},
    },
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tokio::sync::watch;

async fn wait_until<T, P>(rx: &mut watch::Receiver<Vec<T>>, predicate: P) -> anyhow::Result<Vec<T>>
where
    T: Clone,
    P: Fn(&[T]) -> bool,
{
    let snapshot = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let current = rx.borrow_and_update();
                if predicate(&current) {
                    return Ok::<_, anyhow::Error>(current.clone());
                }
            }
            rx.changed().await?;
        }
    })
    .await??;
    Ok(snapshot)
}

fn service_request(name: &str, price_cents: Option<i64>) -> CreateServiceRequest {
    CreateServiceRequest {
        name: name.to_string(),
        description: Some("  ".to_string()),
        price_cents,
        contact: "(11) 98888-7777".to_string(),
    }
}

#[tokio::test]
async fn publishing_a_service_refreshes_the_live_view() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;
    let provider = create_user(&state, "provider@example.com", Role::Provider).await?;
    let mut view = state.services_view.subscribe();

    let created = catalog_service::create_service(&state, &provider, service_request("Buffet", Some(150_000)))
        .await?
        .data
        .expect("service");
    assert_eq!(created.responsible, "provider@example.com name");
    assert_eq!(created.description, None);

    let listed = wait_until(&mut view, |services: &[Service]| services.len() == 1).await?;
    assert_eq!(listed[0].id, created.id);

    catalog_service::delete_service(&state, &provider, created.id).await?;
    wait_until(&mut view, |services: &[Service]| services.is_empty()).await?;
    Ok(())
}

#[tokio::test]
async fn services_without_a_name_on_the_profile_get_a_placeholder_responsible() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;
    let provider = create_user(&state, "provider@example.com", Role::Provider).await?;
    let mut account: UserActive = Users::find_by_id(provider.user_id)
        .one(&state.orm)
        .await?
        .expect("provider")
        .into();
    account.full_name = Set(None);
    account.update(&state.orm).await?;

    let created = catalog_service::create_service(&state, &provider, service_request("DJ", None))
        .await?
        .data
        .expect("service");
    assert_eq!(created.responsible, UNKNOWN_RESPONSIBLE);
    assert_eq!(created.price_cents, None);
    Ok(())
}

#[tokio::test]
async fn invalid_services_are_rejected() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;
    let provider = create_user(&state, "provider@example.com", Role::Provider).await?;

    let err = catalog_service::create_service(&state, &provider, service_request("Buffet", Some(-1)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = catalog_service::create_service(
        &state,
        &provider,
        service_request("Castelo", Some(MAX_PRICE_CENTS + 1)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = catalog_service::create_service(&state, &provider, service_request("Castelo", Some(i64::MAX)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let ceiling = catalog_service::create_service(
        &state,
        &provider,
        service_request("Castelo", Some(MAX_PRICE_CENTS)),
    )
    .await?
    .data
    .expect("service");
    assert_eq!(ceiling.price_cents, Some(MAX_PRICE_CENTS));

    let err = catalog_service::create_service(&state, &provider, service_request("   ", Some(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn events_are_listed_soonest_first() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;
    let provider = create_user(&state, "provider@example.com", Role::Provider).await?;

    for (name, days) in [("Depois", 10), ("Antes", 2)] {
        catalog_service::create_event(
            &state,
            &provider,
            CreateEventRequest {
                name: name.to_string(),
                event_date: Utc::now() + ChronoDuration::days(days),
                location: "Praça Central".to_string(),
                description: None,
                responsible: "Ana".to_string(),
                contact: "ana@example.com".to_string(),
            },
        )
        .await?;
    }

    let listed = catalog_service::list_events(&state).await?.data.expect("events");
    let names: Vec<&str> = listed.items.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Antes", "Depois"]);

    let mut view = state.events_view.subscribe();
    let live = wait_until(&mut view, |events: &[Event]| events.len() == 2).await?;
    assert_eq!(live[0].name, "Antes");
    Ok(())
}

#[tokio::test]
async fn only_the_owner_can_delete_a_listing() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;
    let owner = create_user(&state, "owner@example.com", Role::Provider).await?;
    let stranger = create_user(&state, "stranger@example.com", Role::Provider).await?;

    let service = catalog_service::create_service(&state, &owner, service_request("Buffet", Some(100)))
        .await?
        .data
        .expect("service");

    let err = catalog_service::delete_service(&state, &stranger, service.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let listed = catalog_service::list_services(&state).await?.data.expect("services");
    assert_eq!(listed.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn deleting_a_service_drops_it_from_carts() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;
    let provider = create_user(&state, "provider@example.com", Role::Provider).await?;
    let buyer = create_user(&state, "buyer@example.com", Role::Purchaser).await?;

    let service = catalog_service::create_service(&state, &provider, service_request("Buffet", Some(100)))
        .await?
        .data
        .expect("service");
    cart_service::add_or_increment(&state, &buyer, AddToCartRequest { service_id: service.id })
        .await?;

    catalog_service::delete_service(&state, &provider, service.id).await?;

    let cart = cart_service::list_lines(&state, &buyer).await?.data.expect("cart");
    assert!(cart.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_deletes_and_chats_become_destructive_notifications() -> anyhow::Result<()> {
    let state = setup_state(test_config()).await?;
    let owner = create_user(&state, "owner@example.com", Role::Provider).await?;
    let stranger = create_user(&state, "stranger@example.com", Role::Provider).await?;
    let service = catalog_service::create_service(&state, &owner, service_request("Buffet", Some(100)))
        .await?
        .data
        .expect("service");

    let mut notifications = state.notifier.subscribe();

    let result =
        routes::services::delete_service(State(state.clone()), stranger.clone(), Path(service.id)).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    let result =
        routes::events::delete_event(State(state.clone()), stranger.clone(), Path(service.id)).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    let result = routes::chat::send_message(
        State(state.clone()),
        stranger.clone(),
        Json(ChatRequest { message: "  ".to_string() }),
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let mut titles = Vec::new();
    while let Ok(notification) = notifications.try_recv() {
        assert_eq!(notification.user_id, stranger.user_id);
        assert_eq!(notification.variant, Variant::Destructive);
        titles.push(notification.title);
    }
    assert_eq!(
        titles,
        vec!["Erro ao remover serviço", "Erro ao remover evento", "Erro ao enviar mensagem"]
    );
    Ok(())
}
