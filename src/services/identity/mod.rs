//! Sign-in, OTP and password flows

mod oauth;

pub use oauth::{HttpIdentityVerifier, IdentityVerifier, VerifiedIdentity};

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::user::{self, LoginMethod, Role};
use crate::schemas::{
    ChangePasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
    ResetPasswordRequest, VerifyOtpResponse,
};
use crate::services::notification::{templates, NotificationService};
use crate::services::profile::{create_account, find_active_by_email, normalize_email, NewAccount};
use crate::services::security::{
    create_access_token, create_reset_token, create_token_pair, decode_access_or_reset,
    decode_token, generate_otp, hash_password, verify_password, Claims, TokenType,
};

pub const UNVERIFIED_LOGIN_MESSAGE: &str =
    "Account not verified, please verify with the OTP sent to your email";

/// Resolve the live user behind decoded claims and reject revoked sessions
pub async fn session_user(db: &DatabaseConnection, claims: &Claims) -> Result<user::Model> {
    let user_id = claims.user_id()?;
    let found = User::find_by_id(user_id)
        .filter(user::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if claims.is_revoked_for(&found) {
        return Err(AppError::Unauthorized(
            "Session has been revoked, please log in again".to_string(),
        ));
    }
    Ok(found)
}

#[derive(Clone)]
pub struct IdentityService {
    db: DatabaseConnection,
    notifications: NotificationService,
    verifier: Arc<dyn IdentityVerifier>,
    oauth_reprovision: bool,
}

impl IdentityService {
    pub fn new(
        db: DatabaseConnection,
        notifications: NotificationService,
        verifier: Arc<dyn IdentityVerifier>,
        oauth_reprovision: bool,
    ) -> Self {
        Self {
            db,
            notifications,
            verifier,
            oauth_reprovision,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let found = match request {
            LoginRequest::Email { email, password } => self.password_login(&email, &password).await?,
            LoginRequest::Google { assertion } => {
                self.oauth_login(LoginMethod::Google, &assertion).await?
            }
            LoginRequest::Facebook { assertion } => {
                self.oauth_login(LoginMethod::Facebook, &assertion).await?
            }
        };

        let mut active: user::ActiveModel = found.into();
        active.is_logged_in = Set(true);
        active.updated_at = Set(Utc::now());
        let logged_in = active.update(&self.db).await?;

        let tokens = create_token_pair(&logged_in)?;

        let message = if logged_in.otp_verified {
            None
        } else {
            if let Err(e) = self.issue_otp(&logged_in).await {
                tracing::warn!(user_id = logged_in.id, error = %e, "Login OTP delivery failed");
            }
            Some(UNVERIFIED_LOGIN_MESSAGE.to_string())
        };

        tracing::info!(user_id = logged_in.id, method = %logged_in.login_method, "User logged in");

        Ok(LoginResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            otp_verified: logged_in.otp_verified,
            user: logged_in.into(),
            message,
        })
    }

    async fn password_login(&self, email: &str, password: &str) -> Result<user::Model> {
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let found = User::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?
            .ok_or_else(invalid)?;

        if found.is_deleted {
            return Err(AppError::Unauthorized("Account has been deleted".to_string()));
        }
        if found.is_blocked {
            return Err(AppError::Unauthorized("Account is blocked".to_string()));
        }

        let hash = found.hashed_password.as_deref().ok_or_else(invalid)?;
        if !verify_password(password, hash).await {
            return Err(invalid());
        }
        Ok(found)
    }

    async fn oauth_login(&self, method: LoginMethod, assertion: &str) -> Result<user::Model> {
        let identity = self.verifier.verify(method, assertion).await?;
        if !identity.email_verified {
            return Err(AppError::Unauthorized(
                "Identity provider has not verified this email".to_string(),
            ));
        }

        // A deleted account released its email, so only blocked accounts can match here
        if let Some(existing) = find_active_by_email(&self.db, &identity.email).await? {
            if !existing.is_blocked {
                return Ok(existing);
            }
            if !self.oauth_reprovision {
                return Err(AppError::Unauthorized("Account is blocked".to_string()));
            }

            tracing::warn!(user_id = existing.id, "Blocked account restored through social login");
            let mut active: user::ActiveModel = existing.into();
            active.is_blocked = Set(false);
            active.updated_at = Set(Utc::now());
            return Ok(active.update(&self.db).await?);
        }

        let txn = self.db.begin().await?;
        let (created, _) = create_account(
            &txn,
            NewAccount {
                name: identity.name,
                email: identity.email,
                hashed_password: None,
                role: Role::Client,
                login_method: method,
                otp_verified: true,
                agreed_to_terms: true,
                phone: None,
                sent_otp: None,
            },
        )
        .await?;
        txn.commit().await?;

        tracing::info!(user_id = created.id, method = %method, "Account provisioned from social login");
        Ok(created)
    }

    pub async fn logout(&self, user: &user::Model) -> Result<()> {
        let now = Utc::now();
        let mut active: user::ActiveModel = user.clone().into();
        active.is_logged_in = Set(false);
        active.logged_out_time = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        tracing::info!(user_id = user.id, "User logged out");
        Ok(())
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = decode_token(refresh_token, TokenType::Refresh)
            .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;
        let found = session_user(&self.db, &claims).await?;
        if found.is_blocked {
            return Err(AppError::Unauthorized("Account is blocked".to_string()));
        }
        create_access_token(&found)
    }

    /// Generate, store and email a fresh OTP
    async fn issue_otp(&self, target: &user::Model) -> Result<()> {
        let email = target
            .email
            .clone()
            .ok_or_else(|| AppError::BadRequest("Account has no email address".to_string()))?;

        let otp = generate_otp();
        let mut active: user::ActiveModel = target.clone().into();
        active.sent_otp = Set(Some(otp.clone()));
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        let html = templates::otp_email(&target.name, &otp);
        let result = self
            .notifications
            .send_email(&email, "Your verification code", &html)
            .await;
        if !result.success {
            return Err(AppError::Upstream(format!(
                "Failed to send OTP email: {}",
                result.error.unwrap_or_default()
            )));
        }

        tracing::info!(user_id = target.id, "OTP sent");
        Ok(())
    }

    pub async fn send_otp(&self, user: &user::Model) -> Result<()> {
        if user.otp_verified {
            return Err(AppError::BadRequest("Account already verified".to_string()));
        }
        self.issue_otp(user).await
    }

    /// Resend for either an unverified access token or a forgot-password token
    pub async fn resend_otp(&self, bearer: &str) -> Result<()> {
        let claims = decode_access_or_reset(bearer)?;
        let found = session_user(&self.db, &claims).await?;

        if claims.token_type == TokenType::Access && found.otp_verified {
            return Err(AppError::BadRequest("Account already verified".to_string()));
        }
        self.issue_otp(&found).await
    }

    pub async fn verify_otp(&self, bearer: &str, code: &str) -> Result<VerifyOtpResponse> {
        let claims = decode_access_or_reset(bearer)?;
        let found = session_user(&self.db, &claims).await?;

        if found.sent_otp.as_deref() != Some(code) {
            return Err(AppError::BadRequest("Invalid OTP".to_string()));
        }

        let mut active: user::ActiveModel = found.into();
        active.sent_otp = Set(None);
        active.updated_at = Set(Utc::now());

        match claims.token_type {
            TokenType::Reset => {
                active.allow_password_change = Set(true);
                let updated = active.update(&self.db).await?;
                tracing::info!(user_id = updated.id, "OTP verified for password reset");
                Ok(VerifyOtpResponse::ResetAllowed {
                    message: "OTP verified, you can now reset your password".to_string(),
                })
            }
            _ => {
                active.otp_verified = Set(true);
                let updated = active.update(&self.db).await?;
                let tokens = create_token_pair(&updated)?;
                tracing::info!(user_id = updated.id, "Account verified");
                Ok(VerifyOtpResponse::Verified {
                    message: "Account verified".to_string(),
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token,
                })
            }
        }
    }

    async fn store_new_password(&self, target: user::Model, password: &str) -> Result<()> {
        let hashed = hash_password(password).await?;
        let now = Utc::now();

        let mut active: user::ActiveModel = target.into();
        active.hashed_password = Set(Some(hashed));
        active.password_change_time = Set(Some(now));
        active.allow_password_change = Set(false);
        active.sent_otp = Set(None);
        active.updated_at = Set(now);
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn change_password(&self, user: &user::Model, req: ChangePasswordRequest) -> Result<()> {
        let hash = user.hashed_password.as_deref().ok_or_else(|| {
            AppError::BadRequest("This account signs in through a social provider".to_string())
        })?;
        if !verify_password(&req.old_password, hash).await {
            return Err(AppError::BadRequest("Current password is incorrect".to_string()));
        }
        if req.new_password != req.confirm_password {
            return Err(AppError::BadRequest("Passwords do not match".to_string()));
        }

        self.store_new_password(user.clone(), &req.new_password).await?;
        tracing::info!(user_id = user.id, "Password changed");
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<ForgotPasswordResponse> {
        let found = find_active_by_email(&self.db, email)
            .await?
            .filter(|u| !u.is_blocked)
            .ok_or_else(|| AppError::NotFound("No account with that email".to_string()))?;

        let mut active: user::ActiveModel = found.clone().into();
        active.allow_password_change = Set(false);
        let found = active.update(&self.db).await?;

        self.issue_otp(&found).await?;
        let reset_token = create_reset_token(&found)?;

        Ok(ForgotPasswordResponse {
            message: "OTP sent to your email".to_string(),
            reset_token,
        })
    }

    pub async fn reset_password(&self, bearer: &str, req: ResetPasswordRequest) -> Result<()> {
        let claims = decode_token(bearer, TokenType::Reset)
            .map_err(|_| AppError::Unauthorized("Invalid or expired reset token".to_string()))?;
        let found = session_user(&self.db, &claims).await?;

        if claims.email.is_none() || claims.email != found.email {
            return Err(AppError::Unauthorized("Reset token does not match this account".to_string()));
        }
        if !found.allow_password_change {
            return Err(AppError::Forbidden(
                "Verify the OTP before resetting your password".to_string(),
            ));
        }
        if req.new_password != req.confirm_password {
            return Err(AppError::BadRequest("Passwords do not match".to_string()));
        }

        let user_id = found.id;
        self.store_new_password(found, &req.new_password).await?;
        tracing::info!(user_id, "Password reset");
        Ok(())
    }
}
