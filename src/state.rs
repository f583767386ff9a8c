use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    agent::AgentClient,
    config::AppConfig,
    error::AppResult,
    models::{Event, Service},
    notify::Notifier,
    realtime::{ChangeFeed, Collection, LiveView},
    services::{catalog_service, chat_service::ChatTranscripts},
};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub agent: AgentClient,
    pub notifier: Notifier,
    pub changes: ChangeFeed,
    pub transcripts: ChatTranscripts,
    pub events_view: LiveView<Event>,
    pub services_view: LiveView<Service>,
}

impl AppState {
    /// Builds the shared state. Must run inside a tokio runtime: the live
    /// catalog views spawn their refresh tasks here.
    pub fn new(orm: DatabaseConnection, config: AppConfig) -> AppResult<Self> {
        let agent = AgentClient::new(
            config.agent_webhook_url.clone(),
            config.agent_timeout,
            config.agent_platform.clone(),
        )?;
        let changes = ChangeFeed::default();

        let events_orm = orm.clone();
        let events_view = LiveView::spawn(Collection::Events, &changes, move || {
            let orm = events_orm.clone();
            async move { catalog_service::fetch_events(&orm).await }
        });
        let services_orm = orm.clone();
        let services_view = LiveView::spawn(Collection::Services, &changes, move || {
            let orm = services_orm.clone();
            async move { catalog_service::fetch_services(&orm).await }
        });

        Ok(Self {
            orm,
            config: Arc::new(config),
            agent,
            notifier: Notifier::default(),
            changes,
            transcripts: ChatTranscripts::default(),
            events_view,
            services_view,
        })
    }
}
