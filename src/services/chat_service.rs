//! The chat assistant.
//!
//! A message goes to the external agent first. When the agent is missing,
//! slow, failing or silent, the message is classified locally by keyword and
//! answered from the catalog.

use std::{collections::HashMap, sync::Arc};

use chrono::FixedOffset;
use sea_orm::ConnectionTrait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    agent::AgentUser,
    dto::chat::{ChatReply, ChatRequest, ReplySource, Transcript},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Operation, authorize},
    models::{ChatMessage, ChatRole, Event, Service, format_price},
    response::{ApiResponse, Meta},
    services::{catalog_service, profile_service::find_user},
    state::AppState,
};

pub const GREETING: &str = "Olá! Eu sou seu assistente inteligente. Posso ajudá-lo a encontrar \
informações sobre eventos e serviços cadastrados. O que você gostaria de saber?";
pub const NO_EVENTS: &str = "Não encontrei nenhum evento cadastrado no momento.";
pub const NO_SERVICES: &str = "Não encontrei nenhum serviço cadastrado no momento.";
pub const EVENTS_ERROR: &str = "Desculpe, ocorreu um erro ao buscar os eventos.";
pub const SERVICES_ERROR: &str = "Desculpe, ocorreu um erro ao buscar os serviços.";

const EVENT_KEYWORDS: [&str; 3] = ["evento", "data", "local"];
const SERVICE_KEYWORDS: [&str; 4] = ["serviço", "servico", "preço", "preco"];
const PREVIEW_LIMIT: usize = 3;
/// Messages kept per user, greeting included.
pub const TRANSCRIPT_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    EventsQuery,
    ServicesQuery,
    Fallback,
}

/// Keyword routing. Event keywords win over service keywords.
pub fn classify(message: &str) -> Intent {
    let normalized = message.to_lowercase();
    if EVENT_KEYWORDS.iter().any(|kw| normalized.contains(kw)) {
        Intent::EventsQuery
    } else if SERVICE_KEYWORDS.iter().any(|kw| normalized.contains(kw)) {
        Intent::ServicesQuery
    } else {
        Intent::Fallback
    }
}

/// Dates are shown in `offset`, the zone the audience reads them in.
pub fn render_events(events: &[Event], offset: FixedOffset) -> String {
    if events.is_empty() {
        return NO_EVENTS.to_string();
    }

    let mut out = format!("Encontrei {} evento(s) cadastrado(s):\n\n", events.len());
    for (index, event) in events.iter().take(PREVIEW_LIMIT).enumerate() {
        out.push_str(&format!("{}. **{}**\n", index + 1, event.name));
        out.push_str(&format!("   📅 Data: {}\n", event.event_date.with_timezone(&offset).format("%d/%m/%Y")));
        out.push_str(&format!("   📍 Local: {}\n", event.location));
        out.push_str(&format!("   👤 Responsável: {}\n", event.responsible));
        if let Some(description) = &event.description {
            out.push_str(&format!("   📝 Descrição: {description}\n"));
        }
        out.push_str(&format!("   📞 Contato: {}\n\n", event.contact));
    }
    if events.len() > PREVIEW_LIMIT {
        out.push_str(&format!("E mais {} evento(s)...", events.len() - PREVIEW_LIMIT));
    }
    out
}

pub fn render_services(services: &[Service]) -> String {
    if services.is_empty() {
        return NO_SERVICES.to_string();
    }

    let mut out = format!("Encontrei {} serviço(s) cadastrado(s):\n\n", services.len());
    for (index, service) in services.iter().take(PREVIEW_LIMIT).enumerate() {
        out.push_str(&format!("{}. **{}**\n", index + 1, service.name));
        if let Some(description) = &service.description {
            out.push_str(&format!("   📝 Descrição: {description}\n"));
        }
        // A zero price reads as "not informed".
        if let Some(price) = service.price_cents.filter(|price| *price > 0) {
            out.push_str(&format!("   💰 Preço: {}\n", format_price(price)));
        }
        out.push_str(&format!("   👤 Responsável: {}\n", service.responsible));
        out.push_str(&format!("   📞 Contato: {}\n\n", service.contact));
    }
    if services.len() > PREVIEW_LIMIT {
        out.push_str(&format!("E mais {} serviço(s)...", services.len() - PREVIEW_LIMIT));
    }
    out
}

pub fn help_message(query: &str) -> String {
    format!(
        "Entendi sua pergunta sobre \"{query}\". Atualmente posso ajudá-lo com informações sobre:\n\
         \n\
         • **Eventos cadastrados** - Digite \"eventos\" ou \"mostrar eventos\"\n\
         • **Serviços disponíveis** - Digite \"serviços\" ou \"mostrar serviços\"\n\
         \n\
         Você também pode fazer perguntas específicas como:\n\
         - \"Quais eventos temos esta semana?\"\n\
         - \"Mostre-me os serviços disponíveis\"\n\
         - \"Qual o preço dos serviços?\"\n\
         \n\
         Como posso ajudá-lo?"
    )
}

/// Answers from the catalog. Read-only; a failed read becomes the reply text.
pub async fn local_reply<C: ConnectionTrait>(
    conn: &C,
    message: &str,
    offset: FixedOffset,
) -> String {
    match classify(message) {
        Intent::EventsQuery => match catalog_service::fetch_events(conn).await {
            Ok(events) => render_events(&events, offset),
            Err(err) => {
                tracing::warn!(error = %err, "events lookup failed");
                EVENTS_ERROR.to_string()
            }
        },
        Intent::ServicesQuery => match catalog_service::fetch_services(conn).await {
            Ok(services) => render_services(&services),
            Err(err) => {
                tracing::warn!(error = %err, "services lookup failed");
                SERVICES_ERROR.to_string()
            }
        },
        Intent::Fallback => help_message(message),
    }
}

/// Agent first, local classifier when the agent yields nothing.
pub async fn route_message(state: &AppState, user: &AuthUser, message: &str) -> (String, ReplySource) {
    if state.agent.is_configured() {
        match agent_user(state, user).await {
            Ok(agent_user) => match state.agent.ask(message, &agent_user).await {
                Ok(reply) => return (reply, ReplySource::Agent),
                Err(err) => tracing::info!(error = %err, detail = ?err.detail(), "agent unavailable, using local reply"),
            },
            Err(err) => tracing::warn!(error = %err, "could not load agent user context"),
        }
    }
    let reply = local_reply(&state.orm, message, state.config.display_offset).await;
    (reply, ReplySource::Local)
}

async fn agent_user(state: &AppState, user: &AuthUser) -> AppResult<AgentUser> {
    let profile = find_user(&state.orm, user.user_id).await?;
    Ok(AgentUser {
        id: profile.id,
        email: profile.email,
        name: profile.full_name,
        user_type: user.role.as_str().to_string(),
    })
}

pub async fn send_message(
    state: &AppState,
    user: &AuthUser,
    payload: ChatRequest,
) -> AppResult<ApiResponse<ChatReply>> {
    authorize(user, Operation::Chat)?;
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".into()));
    }

    state
        .transcripts
        .append(user.user_id, ChatMessage::new(ChatRole::User, message))
        .await;

    let (text, source) = route_message(state, user, message).await;
    let reply = ChatMessage::new(ChatRole::Assistant, text);
    state.transcripts.append(user.user_id, reply.clone()).await;

    Ok(ApiResponse::success("OK", ChatReply { reply, source }, Some(Meta::empty())))
}

pub async fn transcript(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Transcript>> {
    authorize(user, Operation::Chat)?;
    let messages = state.transcripts.history(user.user_id).await;
    Ok(ApiResponse::success("OK", Transcript { messages }, Some(Meta::empty())))
}

pub async fn reset(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Transcript>> {
    authorize(user, Operation::Chat)?;
    let messages = state.transcripts.reset(user.user_id).await;
    Ok(ApiResponse::success("Reset", Transcript { messages }, Some(Meta::empty())))
}

/// In-memory chat history per user. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ChatTranscripts {
    inner: Arc<RwLock<HashMap<Uuid, Vec<ChatMessage>>>>,
}

impl ChatTranscripts {
    /// Appends a message. Past [`TRANSCRIPT_LIMIT`] the oldest messages after
    /// the greeting are dropped.
    pub async fn append(&self, user_id: Uuid, message: ChatMessage) {
        let mut guard = self.inner.write().await;
        let messages = guard
            .entry(user_id)
            .or_insert_with(|| vec![ChatMessage::new(ChatRole::Assistant, GREETING)]);
        messages.push(message);
        if messages.len() > TRANSCRIPT_LIMIT {
            let excess = messages.len() - TRANSCRIPT_LIMIT;
            messages.drain(1..=excess);
        }
    }

    pub async fn history(&self, user_id: Uuid) -> Vec<ChatMessage> {
        let guard = self.inner.read().await;
        guard
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| vec![ChatMessage::new(ChatRole::Assistant, GREETING)])
    }

    pub async fn reset(&self, user_id: Uuid) -> Vec<ChatMessage> {
        let fresh = vec![ChatMessage::new(ChatRole::Assistant, GREETING)];
        self.inner.write().await.insert(user_id, fresh.clone());
        fresh
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    fn brasilia() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    use super::*;

    fn event(name: &str, day: u32) -> Event {
        Event {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            event_date: Utc.with_ymd_and_hms(2025, 3, day, 18, 0, 0).unwrap(),
            location: "Praça Central".to_string(),
            description: None,
            responsible: "Ana".to_string(),
            contact: "ana@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    fn service(name: &str, price_cents: Option<i64>) -> Service {
        Service {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            description: Some("Para festas".to_string()),
            price_cents,
            responsible: "Bruno".to_string(),
            contact: "(11) 99999-0000".to_string(),
            created_at: Utc::now() - Duration::minutes(1),
        }
    }

    #[test]
    fn classifies_by_keyword() {
        assert_eq!(classify("Quais eventos temos essa semana?"), Intent::EventsQuery);
        assert_eq!(classify("Qual o PREÇO do serviço de buffet?"), Intent::ServicesQuery);
        assert_eq!(classify("mostrar servicos"), Intent::ServicesQuery);
        assert_eq!(classify("Qual a data da feira?"), Intent::EventsQuery);
        assert_eq!(classify("bom dia"), Intent::Fallback);
    }

    #[test]
    fn event_keywords_take_precedence() {
        assert_eq!(classify("serviços no local do evento"), Intent::EventsQuery);
    }

    #[test]
    fn events_preview_lists_three_and_counts_the_rest() {
        let events: Vec<Event> = (1..=5).map(|d| event(&format!("Evento {d}"), d)).collect();
        let text = render_events(&events, brasilia());

        assert!(text.starts_with("Encontrei 5 evento(s) cadastrado(s):"));
        assert!(text.contains("1. **Evento 1**"));
        assert!(text.contains("3. **Evento 3**"));
        assert!(!text.contains("Evento 4"));
        assert!(text.contains("📅 Data: 01/03/2025"));
        assert!(text.ends_with("E mais 2 evento(s)..."));
    }

    #[test]
    fn optional_event_description_is_skipped() {
        let mut with_description = event("Feira", 2);
        with_description.description = Some("Artesanato local".into());
        let text = render_events(&[with_description, event("Show", 3)], brasilia());
        assert_eq!(text.matches("📝 Descrição").count(), 1);
        assert!(!text.contains("E mais"));
    }

    #[test]
    fn services_preview_formats_prices() {
        let text = render_services(&[service("Buffet", Some(150_000)), service("DJ", None)]);
        assert!(text.contains("💰 Preço: R$ 1500.00"));
        assert_eq!(text.matches("💰").count(), 1);
        assert!(text.contains("2. **DJ**"));
    }

    #[test]
    fn zero_prices_are_not_shown() {
        let text = render_services(&[service("Mutirão", Some(0))]);
        assert!(!text.contains("💰"));
        assert!(text.contains("1. **Mutirão**"));
    }

    #[test]
    fn event_dates_follow_the_display_offset() {
        let mut late = event("Virada", 1);
        late.event_date = Utc.with_ymd_and_hms(2025, 3, 2, 1, 0, 0).unwrap();

        let text = render_events(std::slice::from_ref(&late), brasilia());
        assert!(text.contains("📅 Data: 01/03/2025"));

        let text = render_events(&[late], FixedOffset::east_opt(0).unwrap());
        assert!(text.contains("📅 Data: 02/03/2025"));
    }

    #[test]
    fn empty_catalogs_have_fixed_messages() {
        assert_eq!(render_events(&[], brasilia()), NO_EVENTS);
        assert_eq!(render_services(&[]), NO_SERVICES);
    }

    #[test]
    fn help_echoes_the_question() {
        let text = help_message("oi");
        assert!(text.starts_with("Entendi sua pergunta sobre \"oi\"."));
        assert!(text.contains("Eventos cadastrados"));
    }

    #[tokio::test]
    async fn transcript_starts_with_greeting_and_keeps_order() {
        let transcripts = ChatTranscripts::default();
        let user = Uuid::new_v4();
        assert_eq!(transcripts.history(user).await[0].content, GREETING);

        transcripts.append(user, ChatMessage::new(ChatRole::User, "oi")).await;
        transcripts.append(user, ChatMessage::new(ChatRole::Assistant, "olá")).await;
        let history = transcripts.history(user).await;
        let roles: Vec<ChatRole> = history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]);

        assert_eq!(transcripts.reset(user).await.len(), 1);
        assert_eq!(transcripts.history(user).await.len(), 1);
    }

    #[tokio::test]
    async fn transcript_keeps_the_greeting_and_the_latest_messages() {
        let transcripts = ChatTranscripts::default();
        let user = Uuid::new_v4();

        for n in 0..TRANSCRIPT_LIMIT + 10 {
            transcripts
                .append(user, ChatMessage::new(ChatRole::User, format!("msg {n}")))
                .await;
        }

        let history = transcripts.history(user).await;
        assert_eq!(history.len(), TRANSCRIPT_LIMIT);
        assert_eq!(history[0].content, GREETING);
        assert_eq!(history[1].content, "msg 11");
        assert_eq!(
            history.last().map(|m| m.content.as_str()),
            Some(format!("msg {}", TRANSCRIPT_LIMIT + 9).as_str())
        );
    }
}
