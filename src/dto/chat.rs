use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ChatMessage;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Agent,
    Local,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatReply {
    pub reply: ChatMessage,
    pub source: ReplySource,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Transcript {
    #[schema(value_type = Vec<ChatMessage>)]
    pub messages: Vec<ChatMessage>,
}
