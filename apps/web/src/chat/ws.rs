//! WebSocket chat view. One socket is one view: its `ChatSession` is created
//! when the socket opens and dropped when it closes. Nothing is shared between
//! sockets and nothing outlives the connection.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chat::conversation::{Message, UserInfo};
use crate::chat::session::{dispatch, BotReply, ChatSession, PendingSend, ReplySource};
use crate::chat::transport::{ChatTransport, HistoryEntry};
use crate::state::AppState;

/// Frames sent by the browser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Send { text: String },
    Identity { user: Option<UserInfo> },
    History,
    ClearHistory,
}

/// Frames pushed to the browser.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Snapshot {
        messages: Vec<Message>,
    },
    Message {
        message: Message,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<ReplySource>,
    },
    Greeting {
        message: Message,
    },
    Typing {
        awaiting: bool,
    },
    History {
        entries: Vec<HistoryEntry>,
    },
    Error {
        message: String,
    },
}

/// GET /chat/ws
pub async fn handle_chat_socket(
    State(state): State<AppState>,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade.on_upgrade(move |socket| serve_view(socket, state.chat_transport.clone()))
}

async fn serve_view(mut socket: WebSocket, transport: Arc<dyn ChatTransport>) {
    let mut session = ChatSession::new(None);
    let (reply_tx, mut reply_rx) = mpsc::channel::<(PendingSend, BotReply)>(8);
    info!("Chat view opened");

    let snapshot = ServerEvent::Snapshot {
        messages: session.messages().to_vec(),
    };
    if push(&mut socket, &snapshot).await.is_err() {
        return;
    }

    loop {
        let events = tokio::select! {
            frame = socket.recv() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    handle_frame(&mut session, &transport, &reply_tx, &text).await
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    debug!("Chat socket error: {e}");
                    break;
                }
            },
            Some((pending, reply)) = reply_rx.recv() => {
                let source = reply.source;
                let mut events = Vec::new();
                if let Some(message) = session.complete(pending, reply) {
                    events.push(ServerEvent::Message {
                        message: message.clone(),
                        source: Some(source),
                    });
                }
                events.push(ServerEvent::Typing {
                    awaiting: session.is_awaiting_reply(),
                });
                events
            }
        };

        for event in &events {
            if push(&mut socket, event).await.is_err() {
                session.close();
                break;
            }
        }
        if !session.is_open() {
            break;
        }
    }

    session.close();
    info!(
        messages = session.messages().len(),
        in_flight = session.is_awaiting_reply(),
        "Chat view closed"
    );
}

/// Applies one browser frame to the session and returns the events to push back.
/// Sends are dispatched on a separate task; their replies come back through `reply_tx`.
async fn handle_frame(
    session: &mut ChatSession,
    transport: &Arc<dyn ChatTransport>,
    reply_tx: &mpsc::Sender<(PendingSend, BotReply)>,
    raw: &str,
) -> Vec<ServerEvent> {
    let frame = match serde_json::from_str::<ClientFrame>(raw) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Ignoring malformed chat frame: {e}");
            return vec![ServerEvent::Error {
                message: format!("Invalid frame: {e}"),
            }];
        }
    };

    match frame {
        ClientFrame::Send { text } => {
            // Blank input falls through to begin_send for its own error.
            if !text.trim().is_empty() && !session.can_send(&text) {
                return vec![ServerEvent::Error {
                    message: "a reply is still pending".to_string(),
                }];
            }
            let pending = match session.begin_send(&text) {
                Ok(pending) => pending,
                Err(e) => {
                    return vec![ServerEvent::Error {
                        message: e.to_string(),
                    }]
                }
            };
            let user_message = session
                .messages()
                .iter()
                .rev()
                .find(|m| m.id == pending.user_message_id)
                .cloned();

            let transport = transport.clone();
            let reply_tx = reply_tx.clone();
            tokio::spawn(async move {
                let reply = dispatch(transport.as_ref(), &pending).await;
                if reply_tx.send((pending, reply)).await.is_err() {
                    debug!("Chat view gone before the reply arrived; dropping it");
                }
            });

            user_message
                .map(|message| ServerEvent::Message {
                    message,
                    source: None,
                })
                .into_iter()
                .chain([ServerEvent::Typing { awaiting: true }])
                .collect()
        }
        ClientFrame::Identity { user } => session
            .set_identity(user)
            .map(|greeting| ServerEvent::Greeting {
                message: greeting.clone(),
            })
            .into_iter()
            .collect(),
        ClientFrame::History => vec![ServerEvent::History {
            entries: transport.fetch_history().await,
        }],
        ClientFrame::ClearHistory => {
            transport.clear_history().await;
            Vec::new()
        }
    }
}

async fn push(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(event).unwrap_or_default();
    socket.send(WsMessage::Text(payload)).await
}
