use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::endpoints::session_layer;
use crate::error::Result;
use crate::middleware::{AdminOnly, AnyRole, Authorized};
use crate::schemas::{
    AdminNotificationQuery, BellCounts, BroadcastRequest, BroadcastSummary, MessageResponse, Page,
    NotificationResponse,
};
use crate::state::AppState;

pub fn notifications_routes(state: AppState) -> Router {
    session_layer(
        Router::new()
            // Own bell
            .route("/", get(fetch_all))
            .route("/bell", get(bell))
            .route("/{id}/seen", post(mark_seen))
            .route("/{id}/unread", post(mark_unread))
            .route("/{id}", axum::routing::delete(delete_notification))
            // Admin
            .route("/admin", get(admin_list))
            .route("/admin/broadcast", post(broadcast)),
        &state,
    )
    .with_state(state)
}

// ============================================================================
// Bell Endpoints
// ============================================================================

/// Badge counters without touching them
async fn bell(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
) -> Result<Json<BellCounts>> {
    Ok(Json(state.notifications.bell(user.id).await?))
}

/// Every notification, newest first. Opening the bell clears the "new" badge.
async fn fetch_all(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
) -> Result<Json<Vec<NotificationResponse>>> {
    let items = state.notifications.fetch_all(user.id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

async fn mark_seen(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Path(id): Path<i64>,
) -> Result<Json<NotificationResponse>> {
    Ok(Json(state.notifications.mark_seen(user.id, id).await?.into()))
}

async fn mark_unread(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Path(id): Path<i64>,
) -> Result<Json<NotificationResponse>> {
    Ok(Json(state.notifications.mark_unread(user.id, id).await?.into()))
}

async fn delete_notification(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    state.notifications.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Notification deleted")))
}

// ============================================================================
// Admin Endpoints
// ============================================================================

async fn admin_list(
    State(state): State<AppState>,
    _admin: Authorized<AdminOnly>,
    Query(query): Query<AdminNotificationQuery>,
) -> Result<Json<Page<NotificationResponse>>> {
    let paging = query.paging();
    let result = state
        .notifications
        .admin_list(paging.page(), paging.limit(), query.include_chat)
        .await?;
    let data = result.data.into_iter().map(Into::into).collect();
    Ok(Json(Page {
        data,
        meta: result.meta,
    }))
}

async fn broadcast(
    State(state): State<AppState>,
    Authorized(admin, _): Authorized<AdminOnly>,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<BroadcastSummary>> {
    request.validate()?;
    let summary = state.notifications.broadcast(&request).await?;
    tracing::info!(
        admin_id = admin.id,
        total = summary.total,
        notified = summary.notified,
        failed = summary.failures.len(),
        "Broadcast sent"
    );
    Ok(Json(summary))
}
