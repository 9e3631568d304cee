use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::endpoints::session_layer;
use crate::error::Result;
use crate::middleware::{AnyRole, Authorized};
use crate::models::message;
use crate::schemas::{ConversationResponse, RecentChat, SendMessageRequest};
use crate::state::AppState;

/// Create message routes
pub fn messages_routes(state: AppState) -> Router {
    session_layer(
        Router::new()
            .route("/", post(send_message))
            .route("/recent", get(recent_chats))
            .route("/conversation/{user_id}", get(conversation))
            .route("/{user_id}", get(messages_with)),
        &state,
    )
    .with_state(state)
}

/// Send over HTTP; delivered live when the receiver has a socket open
async fn send_message(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<message::Model>)> {
    let saved = state.messaging.send(&user, request).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn recent_chats(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
) -> Result<Json<Vec<RecentChat>>> {
    Ok(Json(state.messaging.recent_chats(&user).await?))
}

async fn conversation(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Path(user_id): Path<i64>,
) -> Result<Json<ConversationResponse>> {
    Ok(Json(state.messaging.conversation(&user, user_id).await?))
}

async fn messages_with(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<message::Model>>> {
    Ok(Json(
        state.messaging.messages_between(user.id, user_id).await?,
    ))
}
