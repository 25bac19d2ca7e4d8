//! Shared types for the canteen ordering backend
//!
//! - **error**: unified error codes, `AppError` and the `ApiResponse` envelope
//! - **order**: order domain model and request payloads
//! - **notify**: WebSocket wire protocol (server events + client actions)

pub mod error;
pub mod notify;
pub mod order;

pub use error::{ApiResponse, AppError, ErrorCode};
pub use notify::{ClientAction, NotificationEvent};
pub use order::{NewOrder, Order, OrderItem, OrderStatus, OrderStatusUpdate};
