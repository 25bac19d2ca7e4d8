//! Notifier — event delivery over the connection registry
//!
//! Serializes an event once, pushes it through a snapshot of the relevant
//! connection set, and evicts any connection whose send fails after the
//! delivery pass completes. Delivery is fire-and-forget: the lifecycle
//! operation that triggered the event never sees a delivery failure.

use std::sync::Arc;

use shared::notify::NotificationEvent;

use super::{ConnectionId, ConnectionRegistry};

#[derive(Debug, Clone)]
pub struct Notifier {
    registry: Arc<ConnectionRegistry>,
}

impl Notifier {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Push `event` to every connection in the global broadcast set.
    pub async fn broadcast(&self, event: &NotificationEvent) {
        let Some(frame) = encode(event) else { return };

        let mut dead: Vec<ConnectionId> = Vec::new();
        for conn in self.registry.snapshot_broadcast() {
            if conn.send(frame.clone()).await.is_err() {
                dead.push(conn.id);
            }
        }

        for id in dead {
            tracing::debug!(?id, "Evicting dead broadcast connection");
            self.registry.unregister_broadcast(id);
        }
    }

    /// Push `event` to every connection registered for `user_id`.
    pub async fn notify_user(&self, user_id: i64, event: &NotificationEvent) {
        let Some(frame) = encode(event) else { return };

        let mut dead: Vec<ConnectionId> = Vec::new();
        for conn in self.registry.snapshot_user(user_id) {
            if conn.send(frame.clone()).await.is_err() {
                dead.push(conn.id);
            }
        }

        for id in dead {
            tracing::debug!(user_id, ?id, "Evicting dead user connection");
            self.registry.unregister_user(user_id, id);
        }
    }
}

fn encode(event: &NotificationEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize notification event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;
    use tokio::sync::mpsc::error::TryRecvError;

    fn status_event(order_id: i64, status: OrderStatus) -> NotificationEvent {
        NotificationEvent::StatusChanged { order_id, status }
    }

    #[tokio::test]
    async fn broadcast_reaches_all_live_connections() {
        let registry = Arc::new(ConnectionRegistry::default());
        let notifier = Notifier::new(registry.clone());

        let (a, mut rx_a) = registry.new_connection();
        let (b, mut rx_b) = registry.new_connection();
        registry.register_broadcast(&a);
        registry.register_broadcast(&b);

        notifier
            .broadcast(&status_event(1, OrderStatus::Ready))
            .await;

        let frame_a = rx_a.recv().await.unwrap();
        let frame_b = rx_b.recv().await.unwrap();
        assert_eq!(frame_a, frame_b);
        assert!(frame_a.contains("\"status_changed\""));
    }

    #[tokio::test]
    async fn failed_send_evicts_only_the_dead_connection() {
        let registry = Arc::new(ConnectionRegistry::default());
        let notifier = Notifier::new(registry.clone());

        let (live, mut rx_live) = registry.new_connection();
        let (dead, rx_dead) = registry.new_connection();
        registry.register_broadcast(&live);
        registry.register_broadcast(&dead);
        drop(rx_dead); // session gone

        notifier
            .broadcast(&status_event(1, OrderStatus::Ready))
            .await;
        assert_eq!(registry.broadcast_count(), 1);
        assert!(rx_live.recv().await.is_some());

        // Survivor still receives the next broadcast
        notifier
            .broadcast(&status_event(1, OrderStatus::Paid))
            .await;
        let frame = rx_live.recv().await.unwrap();
        assert!(frame.contains("\"paid\""));
        assert_eq!(registry.broadcast_count(), 1);
    }

    #[tokio::test]
    async fn notify_user_is_scoped_to_that_user() {
        let registry = Arc::new(ConnectionRegistry::default());
        let notifier = Notifier::new(registry.clone());

        let (u1, mut rx_u1) = registry.new_connection();
        let (u2, mut rx_u2) = registry.new_connection();
        let (global, mut rx_global) = registry.new_connection();
        registry.register_user(1, &u1);
        registry.register_user(2, &u2);
        registry.register_broadcast(&global);

        notifier
            .notify_user(1, &status_event(10, OrderStatus::Ready))
            .await;

        assert!(rx_u1.recv().await.is_some());
        assert!(matches!(rx_u2.try_recv(), Err(TryRecvError::Empty)));
        assert!(matches!(rx_global.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn notify_user_with_no_connections_is_a_noop() {
        let registry = Arc::new(ConnectionRegistry::default());
        let notifier = Notifier::new(registry.clone());
        notifier
            .notify_user(42, &status_event(1, OrderStatus::Ready))
            .await;
        assert!(!registry.has_user(42));
    }

    #[tokio::test]
    async fn dead_user_connection_removes_empty_entry() {
        let registry = Arc::new(ConnectionRegistry::default());
        let notifier = Notifier::new(registry.clone());

        let (conn, rx) = registry.new_connection();
        registry.register_user(5, &conn);
        drop(rx);

        notifier
            .notify_user(5, &status_event(1, OrderStatus::Cancelled))
            .await;
        assert!(!registry.has_user(5));
    }

    /// User U1 has order O1 and one live per-user connection; a status update
    /// to `paid` yields exactly one status_changed frame on U1's channel and
    /// nothing on a concurrently open global connection.
    #[tokio::test]
    async fn status_update_scenario() {
        let registry = Arc::new(ConnectionRegistry::default());
        let notifier = Notifier::new(registry.clone());

        let (user_conn, mut rx_user) = registry.new_connection();
        let (global_conn, mut rx_global) = registry.new_connection();
        registry.register_user(1, &user_conn);
        registry.register_broadcast(&global_conn);

        notifier
            .notify_user(1, &status_event(101, OrderStatus::Paid))
            .await;

        let frame = rx_user.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["order_id"], 101);
        assert_eq!(json["status"], "paid");

        assert!(matches!(rx_user.try_recv(), Err(TryRecvError::Empty)));
        assert!(matches!(rx_global.try_recv(), Err(TryRecvError::Empty)));
    }
}
