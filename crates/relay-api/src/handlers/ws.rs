//! Observer WebSocket handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use relay_realtime::observer::ObserverId;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /ws
///
/// The observer is registered before the upgrade so that a full hub is
/// refused with a plain 503. Its first frame is the current snapshot.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let peer = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (observer_id, outbound) = state.engine.hub.register(peer).await?;

    Ok(ws.on_upgrade(move |socket| serve_observer(state, observer_id, outbound, socket)))
}

/// Pumps snapshots to one observer until either side goes away.
async fn serve_observer(
    state: AppState,
    observer_id: ObserverId,
    mut outbound: mpsc::Receiver<String>,
    socket: WebSocket,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    info!(observer_id = %observer_id, "Observer connected");

    // The queue closes when the hub drops this observer; the socket is then
    // closed so the read loop below ends too.
    let outbound_task = tokio::spawn(async move {
        while let Some(payload) = outbound.recv().await {
            if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                return;
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    // Inbound content is not interpreted; reading only detects disconnect.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(observer_id = %observer_id, error = %e, "Observer socket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.engine.hub.unregister(&observer_id);

    debug!(observer_id = %observer_id, "Observer connection closed");
}
