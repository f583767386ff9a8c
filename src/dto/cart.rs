use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Service;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub service_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    Empty,
    Populated,
}

impl CartState {
    pub fn of(line_count: usize) -> Self {
        if line_count == 0 {
            CartState::Empty
        } else {
            CartState::Populated
        }
    }
}

/// A cart line joined with the service as it is in the catalog right now.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLineView {
    pub id: Uuid,
    pub quantity: i32,
    pub service: Service,
}

impl CartLineView {
    /// `None` when the product does not fit in an `i64`.
    pub fn subtotal_cents(&self) -> Option<i64> {
        self.service
            .price_cents
            .unwrap_or(0)
            .checked_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub state: CartState,
    pub items: Vec<CartLineView>,
    pub total_cents: i64,
}
