use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Event, Service};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub name: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub description: Option<String>,
    pub responsible: String,
    pub contact: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub contact: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct EventList {
    #[schema(value_type = Vec<Event>)]
    pub items: Vec<Event>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ServiceList {
    #[schema(value_type = Vec<Service>)]
    pub items: Vec<Service>,
}
