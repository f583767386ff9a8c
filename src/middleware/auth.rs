use std::{fmt, str::FromStr};

use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Buys services through the cart.
    Purchaser,
    /// Publishes services and events.
    Provider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Purchaser => "purchaser",
            Role::Provider => "provider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchaser" => Ok(Role::Purchaser),
            "provider" => Ok(Role::Provider),
            other => Err(AppError::BadRequest(format!("unknown role `{other}`"))),
        }
    }
}

/// Everything a signed-in user can ask the API to do that is gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddToCart,
    ManageCart,
    Checkout,
    ViewOrders,
    PublishEvent,
    PublishService,
    Chat,
}

pub fn is_permitted(operation: Operation, role: Role) -> bool {
    match operation {
        Operation::AddToCart | Operation::ManageCart | Operation::Checkout => {
            role == Role::Purchaser
        }
        Operation::ViewOrders
        | Operation::PublishEvent
        | Operation::PublishService
        | Operation::Chat => true,
    }
}

pub fn authorize(user: &AuthUser, operation: Operation) -> Result<(), AppError> {
    if !is_permitted(operation, user.role) {
        tracing::debug!(user_id = %user.user_id, role = %user.role, ?operation, "operation denied");
        return Err(AppError::AuthorizationDenied);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_str = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::AuthenticationRequired)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AppError::AuthenticationRequired)?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::AuthenticationRequired)?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::AuthenticationRequired)?;
        let role = decoded
            .claims
            .role
            .parse()
            .map_err(|_| AppError::AuthenticationRequired)?;

        Ok(AuthUser { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_purchasers_touch_the_cart() {
        for op in [Operation::AddToCart, Operation::ManageCart, Operation::Checkout] {
            assert!(is_permitted(op, Role::Purchaser));
            assert!(!is_permitted(op, Role::Provider));
        }
    }

    #[test]
    fn publishing_and_chat_are_open_to_both_roles() {
        for op in [
            Operation::PublishEvent,
            Operation::PublishService,
            Operation::Chat,
            Operation::ViewOrders,
        ] {
            assert!(is_permitted(op, Role::Purchaser));
            assert!(is_permitted(op, Role::Provider));
        }
    }

    #[test]
    fn authorize_rejects_provider_checkout() {
        let provider = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Provider,
        };
        assert!(matches!(
            authorize(&provider, Operation::Checkout),
            Err(AppError::AuthorizationDenied)
        ));
    }

    #[test]
    fn role_round_trips_through_its_wire_name() {
        assert_eq!("provider".parse::<Role>().unwrap(), Role::Provider);
        assert_eq!(Role::Purchaser.to_string(), "purchaser");
        assert!("admin".parse::<Role>().is_err());
    }
}
