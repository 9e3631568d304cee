use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::endpoints::extractors::read_upload_form;
use crate::endpoints::session_layer;
use crate::error::Result;
use crate::middleware::{AdminOnly, AnyRole, Authorized};
use crate::schemas::{
    MeResponse, MessageResponse, NotificationToggleRequest, Page, PageQuery, ProfileResponse,
    PushTokenRequest, RegisterRequest, UpdateMeRequest, UserDetailResponse, UserListItem,
    UserResponse,
};
use crate::state::AppState;

/// Profile images are small; keep their uploads well under the case limit
const AVATAR_BODY_LIMIT: usize = 5 * 1024 * 1024;

/// Create users routes
pub fn users_routes(state: AppState) -> Router {
    let session = session_layer(
        Router::new()
            .route("/", get(list_users))
            .route("/me", get(get_me).patch(update_me).delete(delete_me))
            .route(
                "/me/image",
                post(upload_image).layer(DefaultBodyLimit::max(AVATAR_BODY_LIMIT)),
            )
            .route(
                "/me/push-tokens",
                post(add_push_token).delete(remove_push_token),
            )
            .route("/me/notifications", put(toggle_notifications))
            .route("/{user_id}", get(get_user).delete(delete_user))
            .route("/{user_id}/block", post(block_user))
            .route("/{user_id}/unblock", post(unblock_user)),
        &state,
    );

    Router::new()
        .route("/register", post(register))
        .merge(session)
        .with_state(state)
}

// ============================================================================
// Registration and own account
// ============================================================================

/// Register a client account; an OTP is emailed for verification
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    request.validate()?;
    let user = state.directory.register(request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn get_me(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
) -> Result<Json<MeResponse>> {
    Ok(Json(state.directory.get_me(&user).await?))
}

async fn update_me(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Json(request): Json<UpdateMeRequest>,
) -> Result<Json<MeResponse>> {
    request.validate()?;
    Ok(Json(state.directory.update_me(&user, request).await?))
}

async fn delete_me(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
) -> Result<Json<MessageResponse>> {
    state.directory.self_destruct(&user).await?;
    Ok(Json(MessageResponse::new("Account deleted")))
}

async fn upload_image(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    multipart: Multipart,
) -> Result<Json<ProfileResponse>> {
    let file = read_upload_form(multipart).await?.single_file()?;
    Ok(Json(state.directory.upload_avatar(&user, file).await?))
}

async fn add_push_token(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Json(request): Json<PushTokenRequest>,
) -> Result<Json<MessageResponse>> {
    request.validate()?;
    state.directory.add_push_token(user.id, &request.token).await?;
    Ok(Json(MessageResponse::new("Push token registered")))
}

async fn remove_push_token(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Json(request): Json<PushTokenRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .directory
        .remove_push_token(user.id, &request.token)
        .await?;
    Ok(Json(MessageResponse::new("Push token removed")))
}

async fn toggle_notifications(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Json(request): Json<NotificationToggleRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .directory
        .set_notifications_enabled(user.id, request.enabled)
        .await?;
    let message = if request.enabled {
        "Notifications enabled"
    } else {
        "Notifications disabled"
    };
    Ok(Json(MessageResponse::new(message)))
}

// ============================================================================
// Admin directory
// ============================================================================

async fn list_users(
    State(state): State<AppState>,
    _admin: Authorized<AdminOnly>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Page<UserListItem>>> {
    Ok(Json(
        state
            .directory
            .list_users(params.page(), params.limit())
            .await?,
    ))
}

async fn get_user(
    State(state): State<AppState>,
    _admin: Authorized<AdminOnly>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDetailResponse>> {
    Ok(Json(state.directory.user_details(user_id).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Authorized(admin, _): Authorized<AdminOnly>,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    state.directory.delete_user(&admin, user_id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}

async fn block_user(
    State(state): State<AppState>,
    Authorized(admin, _): Authorized<AdminOnly>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>> {
    Ok(Json(state.directory.block_user(&admin, user_id).await?))
}

async fn unblock_user(
    State(state): State<AppState>,
    Authorized(admin, _): Authorized<AdminOnly>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>> {
    Ok(Json(state.directory.unblock_user(&admin, user_id).await?))
}
