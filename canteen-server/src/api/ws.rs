//! WebSocket endpoints for real-time order updates
//!
//! Two channels share one session loop:
//! - `GET /order/ws` — global channel, receives `order_created`/`order_update`
//! - `GET /order/ws/updates/{user_id}` — per-user channel, receives
//!   `status_changed` for that user's orders
//!
//! Each session task owns its outbound mpsc receiver and drains it into the
//! socket alongside inbound frames in one select loop, so a slow notify path
//! never blocks the session's ability to answer pings. Clients self-initiate
//! pings; there is no server-side liveness probe — dead connections are
//! discovered lazily when a send fails.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use shared::notify::{ClientAction, NotificationEvent};

use crate::live::ConnectionHandle;
use crate::state::AppState;

/// GET /order/ws — upgrade to the global order channel
pub async fn orders_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| order_ws_session(socket, state, None))
}

/// GET /order/ws/updates/{user_id} — upgrade to a per-user status channel
pub async fn user_updates_ws(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| order_ws_session(socket, state, Some(user_id)))
}

async fn order_ws_session(socket: WebSocket, state: AppState, user_id: Option<i64>) {
    let (mut sink, mut stream) = socket.split();

    let (conn, mut rx) = state.registry.new_connection();
    match user_id {
        Some(uid) => state.registry.register_user(uid, &conn),
        None => state.registry.register_broadcast(&conn),
    }

    tracing::info!(?user_id, conn_id = ?conn.id, "WebSocket connected");

    let greeting = match user_id {
        Some(uid) => NotificationEvent::connected_user(uid),
        None => NotificationEvent::connected_global(),
    };
    if send_event(&mut sink, &greeting).await.is_err() {
        cleanup(&state, user_id, &conn);
        return;
    }

    loop {
        tokio::select! {
            // Outbound frame from the notifier
            frame = rx.recv() => {
                match frame {
                    Some(frame) => {
                        if sink.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break, // evicted from the registry
                }
            }

            // Inbound message from the client
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        // Only `{"action":"ping"}` is acted on; everything
                        // else is ignored without an error to the client
                        if let Ok(action) = serde_json::from_str::<ClientAction>(&text)
                            && action.is_ping()
                            && send_event(&mut sink, &NotificationEvent::Pong).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(?user_id, conn_id = ?conn.id, "WebSocket disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(?user_id, conn_id = ?conn.id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {} // Binary, Pong — ignore
                }
            }
        }
    }

    // Send Close frame (best-effort)
    let _ = sink.close().await;

    cleanup(&state, user_id, &conn);
    tracing::info!(?user_id, conn_id = ?conn.id, "WebSocket session cleaned up");
}

fn cleanup(state: &AppState, user_id: Option<i64>, conn: &ConnectionHandle) {
    match user_id {
        Some(uid) => state.registry.unregister_user(uid, conn.id),
        None => state.registry.unregister_broadcast(conn.id),
    }
}

async fn send_event<S>(sink: &mut S, event: &NotificationEvent) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(event).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
