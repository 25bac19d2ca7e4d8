//! WebSocket wire protocol
//!
//! Server → client: [`NotificationEvent`], a tagged union whose `type` field
//! discriminates the event kind. Client → server: [`ClientAction`]; the only
//! recognized action is `ping`, everything else is silently ignored.

use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderStatus};

/// Event pushed to connected clients.
///
/// Immutable once constructed; serialized to JSON on send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// Sent once right after the WebSocket handshake
    ConnectionEstablished {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_id: Option<i64>,
    },
    /// A new order was created (global channel)
    OrderCreated { data: Order },
    /// Full order list re-broadcast (global channel, manual trigger)
    OrderUpdate { data: Vec<Order> },
    /// An order changed status (per-user channel)
    StatusChanged { order_id: i64, status: OrderStatus },
    /// Reply to a client `ping`
    Pong,
}

impl NotificationEvent {
    /// Greeting for the global order channel
    pub fn connected_global() -> Self {
        Self::ConnectionEstablished {
            message: "Connected to order updates".to_string(),
            user_id: None,
        }
    }

    /// Greeting for a per-user order channel
    pub fn connected_user(user_id: i64) -> Self {
        Self::ConnectionEstablished {
            message: format!("Connected to order updates for user {user_id}"),
            user_id: Some(user_id),
        }
    }
}

/// Inbound client message; only `{"action": "ping"}` is acted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAction {
    pub action: String,
}

impl ClientAction {
    pub fn is_ping(&self) -> bool {
        self.action == "ping"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderItem;
    use chrono::{TimeZone, Utc};

    fn sample_order() -> Order {
        Order {
            id: 7,
            user_id: 3,
            user_name: "Ada".to_string(),
            code: "123".to_string(),
            items: vec![OrderItem {
                product_id: 1,
                name: "Coffee".to_string(),
                quantity: 2,
                price: 150,
            }],
            price: 300,
            comment: Some("no sugar".to_string()),
            status: OrderStatus::Pending,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn status_changed_wire_shape() {
        let event = NotificationEvent::StatusChanged {
            order_id: 7,
            status: OrderStatus::Ready,
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["order_id"], 7);
        assert_eq!(json["status"], "ready");
    }

    #[test]
    fn order_created_carries_full_order_with_iso_timestamp() {
        let event = NotificationEvent::OrderCreated {
            data: sample_order(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["type"], "order_created");
        assert_eq!(json["data"]["code"], "123");
        assert_eq!(json["data"]["items"][0]["name"], "Coffee");
        assert_eq!(json["data"]["timestamp"], "2025-06-01T12:30:00Z");
    }

    #[test]
    fn global_greeting_omits_user_id() {
        let json: serde_json::Value = serde_json::from_str(
            &serde_json::to_string(&NotificationEvent::connected_global()).unwrap(),
        )
        .unwrap();
        assert_eq!(json["type"], "connection_established");
        assert!(json.get("user_id").is_none());

        let json: serde_json::Value = serde_json::from_str(
            &serde_json::to_string(&NotificationEvent::connected_user(9)).unwrap(),
        )
        .unwrap();
        assert_eq!(json["user_id"], 9);
        assert!(json["message"].as_str().unwrap().contains("user 9"));
    }

    #[test]
    fn pong_is_bare_type_tag() {
        assert_eq!(
            serde_json::to_string(&NotificationEvent::Pong).unwrap(),
            r#"{"type":"pong"}"#
        );
    }

    #[test]
    fn ping_action_parses() {
        let action: ClientAction = serde_json::from_str(r#"{"action":"ping"}"#).unwrap();
        assert!(action.is_ping());

        let other: ClientAction = serde_json::from_str(r#"{"action":"hello"}"#).unwrap();
        assert!(!other.is_ping());

        // Unknown shapes fail to parse and are ignored by the session loop
        assert!(serde_json::from_str::<ClientAction>(r#"{"foo":1}"#).is_err());
    }
}
