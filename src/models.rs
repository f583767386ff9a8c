use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{cart_lines, events, order_lines, orders, services},
    middleware::auth::Role,
};

pub const ORDER_STATUS_PAID: &str = "paid";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub description: Option<String>,
    pub responsible: String,
    pub contact: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Service {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in cents; services without a price are listed but count as 0 in a cart.
    pub price_cents: Option<i64>,
    pub responsible: String,
    pub contact: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Renders cents as `R$ 1234.50`.
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("R$ {sign}{}.{:02}", abs / 100, abs % 100)
}

impl From<events::Model> for Event {
    fn from(model: events::Model) -> Self {
        Event {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            event_date: model.event_date.with_timezone(&Utc),
            location: model.location,
            description: model.description,
            responsible: model.responsible,
            contact: model.contact,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<services::Model> for Service {
    fn from(model: services::Model) -> Self {
        Service {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            price_cents: model.price_cents,
            responsible: model.responsible,
            contact: model.contact,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<cart_lines::Model> for CartLine {
    fn from(model: cart_lines::Model) -> Self {
        CartLine {
            id: model.id,
            user_id: model.user_id,
            service_id: model.service_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Order {
            id: model.id,
            user_id: model.user_id,
            total_cents: model.total_cents,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<order_lines::Model> for OrderLine {
    fn from(model: order_lines::Model) -> Self {
        OrderLine {
            id: model.id,
            order_id: model.order_id,
            service_id: model.service_id,
            quantity: model.quantity,
            unit_price_cents: model.unit_price_cents,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::format_price;

    #[test]
    fn price_keeps_two_decimals() {
        assert_eq!(format_price(0), "R$ 0.00");
        assert_eq!(format_price(5), "R$ 0.05");
        assert_eq!(format_price(150_000), "R$ 1500.00");
        assert_eq!(format_price(12_345), "R$ 123.45");
    }
}
