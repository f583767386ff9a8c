//! Client for the optional external chat agent (an HTTP webhook).
//!
//! The agent's reply shape is not stable, so the text is pulled out with an
//! ordered list of extraction rules and the first non-blank match wins.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Object fields that may carry the reply, in priority order.
const REPLY_FIELDS: [&str; 4] = ["response", "message", "text", "output"];

#[derive(Debug, Clone, Serialize)]
pub struct AgentUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub user_type: String,
}

#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    message: &'a str,
    user: &'a AgentUser,
    timestamp: String,
    platform: &'a str,
}

#[derive(Debug, Clone)]
pub struct AgentClient {
    http: Client,
    endpoint: Option<String>,
    platform: String,
}

impl AgentClient {
    pub fn new(
        endpoint: Option<String>,
        timeout: Duration,
        platform: impl Into<String>,
    ) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Unexpected(anyhow::anyhow!(e)))?;
        Ok(Self {
            http,
            endpoint,
            platform: platform.into(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Forwards one message to the agent. Any failure, including a reply with
    /// no usable text, is reported as `UpstreamUnavailable`.
    pub async fn ask(&self, message: &str, user: &AgentUser) -> AppResult<String> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| AppError::UpstreamUnavailable("agent endpoint not configured".into()))?;

        let payload = AgentRequest {
            message,
            user,
            timestamp: Utc::now().to_rfc3339(),
            platform: &self.platform,
        };

        let response = self
            .http
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "agent timed out" } else { "agent unreachable" };
                AppError::UpstreamUnavailable(format!("{reason}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!("agent returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("agent body unreadable: {e}")))?;

        extract_reply(&body)
            .ok_or_else(|| AppError::UpstreamUnavailable("agent reply had no text".into()))
    }
}

/// Pulls the reply text out of an agent response body.
pub fn extract_reply(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items.into_iter().next().and_then(|first| reply_from_value(&first)),
        Ok(value) => reply_from_value(&value),
        Err(_) => non_blank(body),
    }
}

fn reply_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => REPLY_FIELDS
            .iter()
            .filter_map(|field| map.get(*field).and_then(Value::as_str))
            .find_map(non_blank),
        Value::String(text) => non_blank(text),
        _ => None,
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::extract_reply;

    #[test]
    fn fields_are_tried_in_priority_order() {
        let body = r#"{"output":"o","text":"t","message":"m","response":"r"}"#;
        assert_eq!(extract_reply(body).as_deref(), Some("r"));

        let body = r#"{"output":"o","text":"t"}"#;
        assert_eq!(extract_reply(body).as_deref(), Some("t"));
    }

    #[test]
    fn blank_fields_fall_through_to_the_next_rule() {
        let body = r#"{"response":"   ","message":"","output":"final"}"#;
        assert_eq!(extract_reply(body).as_deref(), Some("final"));
    }

    #[test]
    fn raw_string_bodies_are_accepted() {
        assert_eq!(extract_reply(r#""olá""#).as_deref(), Some("olá"));
        assert_eq!(extract_reply("plain text reply").as_deref(), Some("plain text reply"));
    }

    #[test]
    fn arrays_use_their_first_element() {
        let body = r#"[{"output":"from list"},{"response":"ignored"}]"#;
        assert_eq!(extract_reply(body).as_deref(), Some("from list"));
    }

    #[test]
    fn nothing_usable_yields_none() {
        assert_eq!(extract_reply(""), None);
        assert_eq!(extract_reply("{}"), None);
        assert_eq!(extract_reply(r#"{"response":42}"#), None);
        assert_eq!(extract_reply("[]"), None);
        assert_eq!(extract_reply("null"), None);
    }
}
