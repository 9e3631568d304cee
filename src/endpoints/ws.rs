//! Live chat socket
//!
//! `GET /ws?token=<access token>` binds the connection to its user for
//! presence and live delivery. Inbound text frames are sent as messages.

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::middleware::auth::validate_token_and_get_user;
use crate::models::user;
use crate::schemas::{OutboundFrame, SendMessageRequest};
use crate::services::presence::ConnectionHandle;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

pub fn ws_routes(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// WebSocket upgrade handler. The token is checked after the upgrade so a bad
/// token gets a policy-violation close frame instead of an HTTP error.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

async fn authenticate(state: &AppState, token: Option<String>) -> Option<user::Model> {
    let token = token.filter(|t| !t.is_empty())?;
    match validate_token_and_get_user(&state.db, &token).await {
        Ok(user) if user.otp_verified => Some(user),
        Ok(user) => {
            tracing::debug!(user_id = user.id, "Socket rejected, account not verified");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "Socket rejected");
            None
        }
    }
}

/// Handle WebSocket connection
async fn handle_socket(mut socket: WebSocket, state: AppState, token: Option<String>) {
    let Some(user) = authenticate(&state, token).await else {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "Invalid or missing token".into(),
            })))
            .await;
        return;
    };

    let (handle, mut outbound) = ConnectionHandle::new();
    let connection_id = handle.id;
    let frames = handle.tx.clone();
    state.presence.bind(user.id, handle);
    tracing::info!(user_id = user.id, %connection_id, "Socket connected");

    let (mut sender, mut receiver) = socket.split();

    // Single writer: presence deliveries and replies all go through the channel
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut writer => break,
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_frame(&state, &user, text.as_str()).await;
                        if frames.send(reply.to_text()).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(user_id = user.id, error = %e, "Socket read failed");
                        break;
                    }
                }
            }
        }
    }

    state.presence.unbind(user.id, connection_id);
    writer.abort();
    tracing::info!(user_id = user.id, %connection_id, "Socket disconnected");
}

/// Turn one inbound frame into the reply for the sender
async fn handle_frame(state: &AppState, user: &user::Model, text: &str) -> OutboundFrame {
    let request: SendMessageRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            return OutboundFrame::Error {
                message: format!("Invalid message frame: {}", e),
            }
        }
    };

    match state.messaging.send(user, request).await {
        Ok(saved) => OutboundFrame::Message { data: saved },
        Err(e) => OutboundFrame::Error {
            message: e.client_message(),
        },
    }
}
