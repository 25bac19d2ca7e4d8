//! API routes for the canteen backend

pub mod health;
pub mod orders;
pub mod ws;

use axum::Router;
use axum::routing::{delete, get, post};
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Convenience alias for JSON handler results
pub type ApiResult<T> = Result<axum::Json<T>, crate::error::ServiceError>;

/// Frontend origins allowed to call the API
const ALLOWED_ORIGINS: &[&str] = &[
    "https://canteen-frontend-seller.web.app",
    "https://canteen-frontend-buyer.web.app",
    "http://localhost",
    "http://127.0.0.1",
];

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let order = Router::new()
        .route("/order/create", post(orders::create_order))
        .route("/order/broadcast", post(orders::broadcast_orders))
        .route("/order/all", get(orders::get_all_orders))
        .route(
            "/order/{id}",
            get(orders::get_user_orders).patch(orders::update_order_status),
        )
        .route("/order/delete/{order_id}", delete(orders::delete_order))
        .route("/order/ws", get(ws::orders_ws))
        .route("/order/ws/updates/{user_id}", get(ws::user_updates_ws));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            ALLOWED_ORIGINS
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        ))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(order)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
