use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::game_loop::{GameBroadcast, GameCommand};
use crate::protocol::{ClientMsg, OpenUrlMsg, ServerMsg};

/// Larger client messages close the connection.
pub const MAX_MESSAGE_BYTES: usize = 1024;
/// Malformed messages tolerated before the connection is closed.
pub const MAX_PARSE_ERRORS: u32 = 5;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<GameBroadcast>,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

async fn send_msg<S>(sink: &mut S, msg: &ServerMsg) -> bool
where
    S: SinkExt<Message> + Unpin,
{
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize message: {}", e);
            return true;
        }
    };
    sink.send(Message::Text(json.into())).await.is_ok()
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // Attach as the controlling session
    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::Attach { response: resp_tx })
        .await
        .is_err()
    {
        tracing::error!("Failed to send Attach command");
        return;
    }

    let (session, welcome) = match resp_rx.await {
        Ok(Ok(attached)) => attached,
        Ok(Err(rejected)) => {
            tracing::info!("Rejected connection: {}", rejected.reason);
            send_msg(&mut sink, &ServerMsg::Rejected(rejected)).await;
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
        Err(_) => {
            tracing::error!("Failed to receive welcome");
            return;
        }
    };

    if !send_msg(&mut sink, &ServerMsg::Welcome(welcome)).await {
        let _ = app_state.game_tx.send(GameCommand::Detach { session }).await;
        return;
    }

    let mut broadcast_rx = app_state.broadcast_tx.subscribe();
    let mut parse_errors: u32 = 0;

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_MESSAGE_BYTES {
                            tracing::warn!(
                                "Session {} sent {} byte message, disconnecting",
                                session,
                                text.len()
                            );
                            break;
                        }
                        match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(msg) => {
                                if app_state
                                    .game_tx
                                    .send(GameCommand::Input { session, msg })
                                    .await
                                    .is_err()
                                {
                                    break;
                                }
                            }
                            Err(e) => {
                                parse_errors += 1;
                                tracing::debug!("Session {} bad message: {}", session, e);
                                if parse_errors > MAX_PARSE_ERRORS {
                                    tracing::warn!(
                                        "Session {} exceeded {} parse errors, disconnecting",
                                        session,
                                        MAX_PARSE_ERRORS
                                    );
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Session {} socket error: {}", session, e);
                        break;
                    }
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client (broadcast)
            result = broadcast_rx.recv() => {
                match result {
                    Ok(broadcast) => {
                        let msg = match broadcast {
                            GameBroadcast::Frame(frame) => ServerMsg::Frame(frame),
                            GameBroadcast::OpenUrl { session: target, url } => {
                                if target != session {
                                    continue; // Not for this client
                                }
                                ServerMsg::OpenUrl(OpenUrlMsg { url })
                            }
                        };
                        if !send_msg(&mut sink, &msg).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Session {} lagged by {} messages", session, n);
                        // Frames are full snapshots, dropping some is fine
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = app_state.game_tx.send(GameCommand::Detach { session }).await;
    tracing::info!("Session {} disconnected", session);
}
