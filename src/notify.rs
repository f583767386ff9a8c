//! User-facing notifications ("toasts").
//!
//! A [`Notifier`] is created once per process, stored in [`crate::state::AppState`]
//! and handed to whoever needs to enqueue a message. Subscribers filter the
//! stream down to the notifications addressed to them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub variant: Variant,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn success(&self, user_id: Uuid, title: &str, description: impl Into<String>) {
        self.publish(user_id, title, description.into(), Variant::Default);
    }

    /// Converts a failed operation into a dismissible message for its user.
    pub fn failure(&self, user_id: Uuid, title: &str, err: &AppError) {
        let description = match err.detail() {
            Some(detail) => format!("{err}: {detail}"),
            None => err.to_string(),
        };
        self.publish(user_id, title, description, Variant::Destructive);
    }

    fn publish(&self, user_id: Uuid, title: &str, description: String, variant: Variant) {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            description,
            variant,
            created_at: Utc::now(),
        };
        // Nobody listening is not an error.
        let _ = self.tx.send(notification);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}
