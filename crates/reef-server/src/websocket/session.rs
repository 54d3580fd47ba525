//! WebSocket session lifecycle — handles a single connected client from
//! upgrade through disconnect.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::metrics::{
    WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_CONNECTION_DURATION_SECONDS,
    WS_DISCONNECTIONS_TOTAL,
};

use super::broadcast::BroadcastHub;
use super::connection::OutboundFrame;
use super::handler::handle_message;
use super::registry::ConnectionRegistry;

/// Run a WebSocket session for a connected client.
///
/// 1. Registers with the connection registry (which sends the welcome event)
/// 2. Spawns the writer task forwarding queued frames to the socket
/// 3. Dispatches incoming text/binary frames as control messages
/// 4. Counts protocol ping/pong frames as liveness signals
/// 5. Unregisters on close frame, transport error, or forced termination
#[instrument(skip_all)]
pub async fn run_ws_session(
    ws: WebSocket,
    registry: Arc<ConnectionRegistry>,
    hub: Arc<BroadcastHub>,
    send_queue_capacity: usize,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<OutboundFrame>(send_queue_capacity);
    let conn_id = registry.register(send_tx).await;
    let Some(connection) = registry.get(&conn_id).await else {
        warn!(conn_id = %conn_id, "connection vanished before session start");
        return;
    };

    let connection_start = std::time::Instant::now();
    info!(conn_id = %conn_id, "client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    // Writer task: forward queued frames, turning Ping markers into
    // protocol ping frames.
    let writer = tokio::spawn(async move {
        while let Some(frame) = send_rx.recv().await {
            let result = match frame {
                OutboundFrame::Event(text) => {
                    ws_tx.send(Message::Text(text.as_str().into())).await
                }
                OutboundFrame::Ping => ws_tx.send(Message::Ping(vec![].into())).await,
            };
            if result.is_err() {
                break;
            }
        }
    });

    let close_token = connection.close_token();
    loop {
        let message = tokio::select! {
            msg = ws_rx.next() => msg,
            () = close_token.cancelled() => {
                info!(conn_id = %conn_id, "session terminated by server");
                break;
            }
        };

        let Some(Ok(message)) = message else {
            break;
        };

        let text = match message {
            Message::Text(ref t) => Some(t.to_string()),
            Message::Binary(ref data) => match std::str::from_utf8(data) {
                Ok(s) => Some(s.to_owned()),
                Err(_) => {
                    info!(conn_id = %conn_id, len = data.len(), "received non-UTF8 binary frame");
                    None
                }
            },
            Message::Close(_) => {
                info!(conn_id = %conn_id, "client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {
                connection.touch();
                None
            }
        };

        let Some(text) = text else { continue };
        handle_message(&text, &conn_id, &registry, &hub).await;
    }

    info!(conn_id = %conn_id, dropped = connection.drop_count(), "client disconnected");
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(connection_start.elapsed().as_secs_f64());
    writer.abort();
    registry.unregister(&conn_id).await;
}
