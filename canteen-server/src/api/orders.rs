//! Order lifecycle endpoints
//!
//! Every mutation commits first and notifies after; a delivery failure can
//! never roll back or fail a committed operation.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::notify::NotificationEvent;
use shared::order::{NewOrder, Order, OrderStatusUpdate};

use super::ApiResult;
use crate::db;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub status: &'static str,
}

/// POST /order/create
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<NewOrder>,
) -> ApiResult<Order> {
    let order = db::orders::create_order(&state.pool, &req).await?;

    tracing::info!(order_id = order.id, code = %order.code, "Order created");

    state
        .notifier
        .broadcast(&NotificationEvent::OrderCreated {
            data: order.clone(),
        })
        .await;

    Ok(Json(order))
}

/// PATCH /order/{order_id}
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(update): Json<OrderStatusUpdate>,
) -> ApiResult<Order> {
    let order = db::orders::update_status(&state.pool, order_id, update.status).await?;

    tracing::info!(order_id, status = %order.status, "Order status updated");

    state
        .notifier
        .notify_user(
            order.user_id,
            &NotificationEvent::StatusChanged {
                order_id: order.id,
                status: order.status,
            },
        )
        .await;

    Ok(Json(order))
}

/// DELETE /order/delete/{order_id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> ApiResult<MessageResponse> {
    db::orders::delete_order(&state.pool, order_id).await?;
    Ok(Json(MessageResponse {
        message: "Order deleted successfully",
    }))
}

/// GET /order/all — orders that are not yet settled
pub async fn get_all_orders(State(state): State<AppState>) -> ApiResult<Vec<Order>> {
    let orders = db::orders::list_active(&state.pool).await?;
    Ok(Json(orders))
}

/// GET /order/{user_id} — one user's orders, oldest first
pub async fn get_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Vec<Order>> {
    let orders = db::orders::list_for_user(&state.pool, user_id).await?;
    Ok(Json(orders))
}

/// POST /order/broadcast — push the full order list to the global channel
pub async fn broadcast_orders(State(state): State<AppState>) -> ApiResult<BroadcastResponse> {
    let orders = db::orders::list_all(&state.pool).await?;

    if orders.is_empty() {
        return Err(AppError::with_message(ErrorCode::NotFound, "No orders found").into());
    }

    state
        .notifier
        .broadcast(&NotificationEvent::OrderUpdate { data: orders })
        .await;

    Ok(Json(BroadcastResponse {
        status: "broadcast_sent",
    }))
}
