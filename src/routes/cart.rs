use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartList, SetQuantityRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartLine,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_list).post(add_to_cart))
        .route("/{line_id}", patch(set_quantity).delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart lines for the current user with live service data", body = ApiResponse<CartList>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Account type cannot purchase")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartList>>> {
    let resp = cart_service::list_lines(&state, &user)
        .await
        .inspect_err(|err| state.notifier.failure(user.user_id, "Erro ao carregar carrinho", err))?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add a service to the cart", body = ApiResponse<CartLine>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Account type cannot purchase"),
        (status = 404, description = "Service not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartLine>>> {
    let resp = cart_service::add_or_increment(&state, &user, payload)
        .await
        .inspect_err(|err| {
            state
                .notifier
                .failure(user.user_id, "Erro ao adicionar ao carrinho", err)
        })?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/{line_id}",
    params(
        ("line_id" = Uuid, Path, description = "Cart line ID")
    ),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated, or line removed when quantity <= 0", body = ApiResponse<Option<CartLine>>),
        (status = 404, description = "Cart line not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn set_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(line_id): Path<Uuid>,
    Json(payload): Json<SetQuantityRequest>,
) -> AppResult<Json<ApiResponse<Option<CartLine>>>> {
    let resp = cart_service::set_quantity(&state, &user, line_id, payload)
        .await
        .inspect_err(|err| {
            state
                .notifier
                .failure(user.user_id, "Erro ao atualizar carrinho", err)
        })?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{line_id}",
    params(
        ("line_id" = Uuid, Path, description = "Cart line ID")
    ),
    responses(
        (status = 200, description = "Removed (also when already gone)", body = ApiResponse<serde_json::Value>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(line_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove(&state, &user, line_id)
        .await
        .inspect_err(|err| {
            state
                .notifier
                .failure(user.user_id, "Erro ao remover item", err)
        })?;
    Ok(Json(resp))
}
