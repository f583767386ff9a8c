use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    config::CartAddPolicy,
    dto::cart::{AddToCartRequest, CartLineView, CartList, CartState, SetQuantityRequest},
    entity::{
        cart_lines::{ActiveModel as CartActive, Column as CartCol, Entity as CartLines},
        services::Entity as Services,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Operation, authorize},
    models::{CartLine, Service},
    realtime::{ChangeKind, Collection},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// The caller's lines, oldest first, each joined with the service row as it
/// is in the catalog right now.
pub async fn fetch_lines<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Vec<CartLineView>> {
    let rows = CartLines::find()
        .find_also_related(Services)
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .order_by_asc(CartCol::Id)
        .all(conn)
        .await?;

    let lines = rows
        .into_iter()
        .filter_map(|(line, service)| match service {
            Some(service) => Some(CartLineView {
                id: line.id,
                quantity: line.quantity,
                service: Service::from(service),
            }),
            None => {
                tracing::warn!(line_id = %line.id, service_id = %line.service_id, "cart line without service");
                None
            }
        })
        .collect();
    Ok(lines)
}

/// Σ unit price × quantity. Services without a price contribute nothing.
pub fn cart_total(lines: &[CartLineView]) -> AppResult<i64> {
    lines
        .iter()
        .try_fold(0i64, |total, line| {
            line.subtotal_cents().and_then(|subtotal| total.checked_add(subtotal))
        })
        .ok_or_else(|| AppError::BadRequest("cart total exceeds the supported amount".into()))
}

pub async fn list_lines(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    authorize(user, Operation::ManageCart)?;
    let items = fetch_lines(&state.orm, user.user_id).await?;
    let total = items.len() as i64;
    let cart = CartList {
        state: CartState::of(items.len()),
        total_cents: cart_total(&items)?,
        items,
    };
    Ok(ApiResponse::success("OK", cart, Some(Meta::new(1, total, total))))
}

pub async fn add_or_increment(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartLine>> {
    authorize(user, Operation::AddToCart)?;
    let policy = state.config.cart_add_policy;

    let txn = state.orm.begin().await?;

    if Services::find_by_id(payload.service_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let existing = CartLines::find()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user.user_id))
                .add(CartCol::ServiceId.eq(payload.service_id)),
        )
        .one(&txn)
        .await?;

    let (line, kind) = match existing {
        Some(line) => {
            let quantity = match policy {
                CartAddPolicy::Set => 1,
                CartAddPolicy::Increment => line.quantity.saturating_add(1),
            };
            let mut active: CartActive = line.into();
            active.quantity = Set(quantity);
            (active.update(&txn).await?, ChangeKind::Update)
        }
        None => {
            let line = CartActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                service_id: Set(payload.service_id),
                quantity: Set(1),
                created_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await?;
            (line, ChangeKind::Insert)
        }
    };

    txn.commit().await?;

    tracing::debug!(user_id = %user.user_id, service_id = %payload.service_id, quantity = line.quantity, ?policy, "cart line upserted");
    state.changes.publish(Collection::CartLines, kind);
    audit::record(
        &state.orm,
        user.user_id,
        "cart_add",
        "cart_lines",
        serde_json::json!({ "service_id": payload.service_id, "quantity": line.quantity }),
    )
    .await;
    state.notifier.success(
        user.user_id,
        "Adicionado ao carrinho!",
        "O serviço foi adicionado ao seu carrinho.",
    );

    Ok(ApiResponse::success("OK", CartLine::from(line), Some(Meta::empty())))
}

/// Sets a line's quantity; zero or less removes the line instead.
pub async fn set_quantity(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
    payload: SetQuantityRequest,
) -> AppResult<ApiResponse<Option<CartLine>>> {
    if payload.quantity <= 0 {
        remove(state, user, line_id).await?;
        return Ok(ApiResponse::success("Removed from cart", None, Some(Meta::empty())));
    }
    authorize(user, Operation::ManageCart)?;

    let line = CartLines::find()
        .filter(
            Condition::all()
                .add(CartCol::Id.eq(line_id))
                .add(CartCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: CartActive = line.into();
    active.quantity = Set(payload.quantity);
    let line = active.update(&state.orm).await?;

    state.changes.publish(Collection::CartLines, ChangeKind::Update);
    audit::record(
        &state.orm,
        user.user_id,
        "cart_update",
        "cart_lines",
        serde_json::json!({ "line_id": line_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success("OK", Some(CartLine::from(line)), Some(Meta::empty())))
}

/// Deletes a line. Removing a line that is already gone is not an error.
pub async fn remove(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user, Operation::ManageCart)?;

    let result = CartLines::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::Id.eq(line_id))
                .add(CartCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected > 0 {
        state.changes.publish(Collection::CartLines, ChangeKind::Delete);
        audit::record(
            &state.orm,
            user.user_id,
            "cart_remove",
            "cart_lines",
            serde_json::json!({ "line_id": line_id }),
        )
        .await;
        state
            .notifier
            .success(user.user_id, "Item removido", "O item foi removido do carrinho.");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
