//! ConnectionRegistry — live notification channels
//!
//! Tracks every open WebSocket as an outbound frame channel, in two views:
//!
//! ```text
//! WS session task (owns the mpsc::Receiver, forwards frames to the socket)
//!       ▲
//!       │ serialized frames
//! ConnectionRegistry
//!   ├── broadcast: ConnectionId → sender        (global order events)
//!   └── users: user_id → {ConnectionId → sender} (targeted status events)
//!       ▲
//!       │ snapshot / register / unregister
//! Notifier (snapshot, deliver, evict dead senders)
//! ```
//!
//! All mutation goes through the registry's operations; the collections are
//! never handed out directly. Senders are delivered against point-in-time
//! snapshots so concurrent register/unregister never mutates a collection
//! mid-iteration.

pub mod notifier;

pub use notifier::Notifier;

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Default outbound channel capacity per connection
const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Sender half of a connection's outbound frame channel
pub type OrderSender = mpsc::Sender<String>;

/// Process-unique identifier for one WebSocket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// Handle to one live connection: id plus the outbound sender.
///
/// The WS session task owns the matching receiver; once the session ends and
/// the receiver is dropped, sends fail and the connection is evicted on the
/// next delivery pass.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    tx: OrderSender,
}

impl ConnectionHandle {
    /// Push a serialized frame; awaits channel capacity (backpressure).
    /// Fails only once the receiving session has gone away.
    pub async fn send(&self, frame: String) -> Result<(), ()> {
        self.tx.send(frame).await.map_err(|_| ())
    }
}

/// Registry of live notification channels.
#[derive(Debug)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    channel_capacity: usize,
    /// Global broadcast set
    broadcast: DashMap<ConnectionId, OrderSender>,
    /// Per-user connection sets; an entry is removed as soon as its set
    /// becomes empty (no dangling empty entries)
    users: DashMap<i64, HashMap<ConnectionId, OrderSender>>,
}

impl ConnectionRegistry {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            channel_capacity,
            broadcast: DashMap::new(),
            users: DashMap::new(),
        }
    }

    /// Allocate a connection: a handle to register plus the receiver the
    /// session task drains into its socket.
    pub fn new_connection(&self) -> (ConnectionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        (ConnectionHandle { id, tx }, rx)
    }

    /// Add a connection to the global broadcast set (idempotent).
    pub fn register_broadcast(&self, conn: &ConnectionHandle) {
        self.broadcast.insert(conn.id, conn.tx.clone());
    }

    /// Remove a connection from the global broadcast set (idempotent).
    pub fn unregister_broadcast(&self, id: ConnectionId) {
        self.broadcast.remove(&id);
    }

    /// Add a connection to `user_id`'s set, creating the set if absent.
    pub fn register_user(&self, user_id: i64, conn: &ConnectionHandle) {
        self.users
            .entry(user_id)
            .or_default()
            .insert(conn.id, conn.tx.clone());
    }

    /// Remove a connection from `user_id`'s set; drops the whole entry once
    /// the set is empty. Runs under the shard lock, so no observer can see
    /// an empty set for the key.
    pub fn unregister_user(&self, user_id: i64, id: ConnectionId) {
        if let dashmap::mapref::entry::Entry::Occupied(mut entry) = self.users.entry(user_id) {
            entry.get_mut().remove(&id);
            if entry.get().is_empty() {
                entry.remove();
            }
        }
    }

    /// Point-in-time copy of the broadcast set for safe iteration.
    pub fn snapshot_broadcast(&self) -> Vec<ConnectionHandle> {
        self.broadcast
            .iter()
            .map(|entry| ConnectionHandle {
                id: *entry.key(),
                tx: entry.value().clone(),
            })
            .collect()
    }

    /// Point-in-time copy of `user_id`'s connection set.
    pub fn snapshot_user(&self, user_id: i64) -> Vec<ConnectionHandle> {
        match self.users.get(&user_id) {
            Some(conns) => conns
                .iter()
                .map(|(id, tx)| ConnectionHandle {
                    id: *id,
                    tx: tx.clone(),
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of connections in the broadcast set
    pub fn broadcast_count(&self) -> usize {
        self.broadcast.len()
    }

    /// Whether `user_id` currently has any registered connections
    pub fn has_user(&self, user_id: i64) -> bool {
        self.users.contains_key(&user_id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
