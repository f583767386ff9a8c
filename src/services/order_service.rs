use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        cart::CartLineView,
        orders::{OrderList, OrderWithLines},
    },
    entity::{
        cart_lines::{Column as CartCol, Entity as CartLines},
        order_lines::{ActiveModel as OrderLineActive, Column as OrderLineCol, Entity as OrderLines},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Operation, authorize},
    models::{ORDER_STATUS_PAID, Order, OrderLine, format_price},
    realtime::{ChangeKind, Collection},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service::{cart_total, fetch_lines},
    state::AppState,
};

/// Turns the caller's cart into a paid order and empties the cart.
///
/// An empty cart is a no-op: no order is written and `data` is `None`.
/// Everything happens in one transaction; a failure after the order row was
/// written is logged for reconciliation before the transaction rolls back.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderWithLines>> {
    authorize(user, Operation::Checkout)?;

    let txn = state.orm.begin().await.map_err(AppError::checkout_failed)?;

    let lines = fetch_lines(&txn, user.user_id)
        .await
        .map_err(AppError::checkout_failed)?;
    if lines.is_empty() {
        txn.rollback().await.map_err(AppError::checkout_failed)?;
        return Ok(ApiResponse::message_only("Cart is empty"));
    }

    let total_cents = match cart_total(&lines) {
        Ok(total_cents) => total_cents,
        Err(err) => {
            txn.rollback().await.map_err(AppError::checkout_failed)?;
            return Err(AppError::checkout_failed(err));
        }
    };

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total_cents: Set(total_cents),
        status: Set(ORDER_STATUS_PAID.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await
    .map_err(AppError::checkout_failed)?;

    let order_lines = match persist_lines_and_clear_cart(&txn, user.user_id, order.id, &lines).await {
        Ok(order_lines) => order_lines,
        Err(err) => {
            tracing::error!(
                user_id = %user.user_id,
                order_id = %order.id,
                error = %err,
                detail = ?err.detail(),
                "checkout failed after order creation; needs reconciliation"
            );
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(order_id = %order.id, error = %rollback_err, "checkout rollback failed");
            }
            return Err(AppError::checkout_failed(err));
        }
    };

    txn.commit().await.map_err(|err| {
        tracing::error!(
            user_id = %user.user_id,
            order_id = %order.id,
            error = %err,
            "checkout commit failed; needs reconciliation"
        );
        AppError::checkout_failed(err)
    })?;

    tracing::info!(user_id = %user.user_id, order_id = %order.id, total_cents, lines = order_lines.len(), "checkout completed");
    state.changes.publish(Collection::Orders, ChangeKind::Insert);
    state.changes.publish(Collection::CartLines, ChangeKind::Delete);
    audit::record(
        &state.orm,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_cents": total_cents }),
    )
    .await;
    state.notifier.success(
        user.user_id,
        "Compra realizada com sucesso!",
        format!("Total: {}", format_price(total_cents)),
    );

    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithLines {
            order: Order::from(order),
            lines: order_lines,
        },
        Some(Meta::empty()),
    ))
}

async fn persist_lines_and_clear_cart(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    order_id: Uuid,
    lines: &[CartLineView],
) -> AppResult<Vec<OrderLine>> {
    let mut order_lines = Vec::with_capacity(lines.len());
    for line in lines {
        // The price is frozen here; later catalog edits never reach the order.
        let item = OrderLineActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            service_id: Set(line.service.id),
            quantity: Set(line.quantity),
            unit_price_cents: Set(line.service.price_cents.unwrap_or(0)),
            created_at: Set(Utc::now().into()),
        }
        .insert(txn)
        .await?;
        order_lines.push(OrderLine::from(item));
    }

    CartLines::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(txn)
        .await?;

    Ok(order_lines)
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    authorize(user, Operation::ViewOrders)?;
    let (page, limit, offset) = query.pagination.normalize();

    let finder = Orders::find().filter(OrderCol::UserId.eq(user.user_id));
    let finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items: orders }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithLines>> {
    authorize(user, Operation::ViewOrders)?;
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let lines = OrderLines::find()
        .filter(OrderLineCol::OrderId.eq(order.id))
        .order_by_asc(OrderLineCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderLine::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithLines {
            order: Order::from(order),
            lines,
        },
        Some(Meta::empty()),
    ))
}
