//! Order domain model
//!
//! Mirrors the persisted order row: line items are denormalized into the
//! order as a structured list, and the owning user's display name is copied
//! in at creation time so events are self-contained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single order line: product reference plus quantity and unit price.
///
/// Embedded in [`Order`]; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    /// Unit price in cents
    pub price: i64,
}

/// Order lifecycle status.
///
/// `pending` is the initial state; `cancelled` and `paid` are settled and
/// excluded from active-order listings. Transitions are not validated by
/// the server (any status may be written from any prior state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Ready,
    Cancelled,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Cancelled => "cancelled",
            Self::Paid => "paid",
        }
    }

    /// Settled orders are excluded from the active-order listing
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "ready" => Ok(Self::Ready),
            "cancelled" => Ok(Self::Cancelled),
            "paid" => Ok(Self::Paid),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted order, as returned by the API and carried in events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    /// Short pickup code, unique among all orders
    pub code: String,
    pub items: Vec<OrderItem>,
    /// Total price in cents
    pub price: i64,
    pub comment: Option<String>,
    pub status: OrderStatus,
    /// Creation time (serialized as ISO-8601)
    pub timestamp: DateTime<Utc>,
}

/// Payload for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: i64,
    pub items: Vec<OrderItem>,
    pub comment: String,
    pub price: i64,
}

/// Payload for updating an order's status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}
