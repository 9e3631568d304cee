use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use validator::Validate;

use crate::endpoints::session_layer;
use crate::error::{AppError, Result};
use crate::middleware::auth::extract_bearer_token;
use crate::middleware::{AnyRole, Authorized, PendingOtp};
use crate::schemas::{
    AccessTokenResponse, ChangePasswordRequest, ForgotPasswordRequest, ForgotPasswordResponse,
    LoginRequest, LoginResponse, MessageResponse, RefreshRequest, ResetPasswordRequest,
    VerifyOtpRequest, VerifyOtpResponse,
};
use crate::state::AppState;

/// Create auth routes for sign-in, OTP and password flows
pub fn auth_routes(state: AppState) -> Router {
    let session = session_layer(
        Router::new()
            .route("/logout", post(logout))
            .route("/change-password", post(change_password))
            .route("/send-otp", post(send_otp)),
        &state,
    );

    Router::new()
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/resend-otp", post(resend_otp))
        .route("/verify-otp", post(verify_otp))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .merge(session)
        .with_state(state)
}

/// OTP and reset endpoints accept either an access token or a reset token,
/// so they read the header themselves instead of going through the session layer
fn bearer(headers: &HeaderMap) -> Result<String> {
    extract_bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing or invalid Authorization header".to_string()))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    Ok(Json(state.identity.login(request).await?))
}

async fn logout(
    State(state): State<AppState>,
    PendingOtp(user): PendingOtp,
) -> Result<Json<MessageResponse>> {
    state.identity.logout(&user).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>> {
    let access_token = state.identity.refresh(&request.refresh_token).await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

async fn send_otp(
    State(state): State<AppState>,
    PendingOtp(user): PendingOtp,
) -> Result<Json<MessageResponse>> {
    state.identity.send_otp(&user).await?;
    Ok(Json(MessageResponse::new("OTP sent to your email")))
}

async fn resend_otp(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>> {
    state.identity.resend_otp(&bearer(&headers)?).await?;
    Ok(Json(MessageResponse::new("OTP sent to your email")))
}

async fn verify_otp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>> {
    request.validate()?;
    Ok(Json(
        state.identity.verify_otp(&bearer(&headers)?, &request.otp).await?,
    ))
}

async fn change_password(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<AnyRole>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    request.validate()?;
    state.identity.change_password(&user, request).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>> {
    request.validate()?;
    Ok(Json(state.identity.forgot_password(&request.email).await?))
}

async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    request.validate()?;
    state
        .identity
        .reset_password(&bearer(&headers)?, request)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}
