use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::case::CaseSummary;
use crate::models::user::{LoginMethod, Role};
use crate::models::{profile, user};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub agreed_to_terms: bool,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PushTokenRequest {
    #[validate(length(min = 1, max = 4096))]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub login_method: LoginMethod,
    pub is_blocked: bool,
    pub is_deleted: bool,
    pub otp_verified: bool,
    pub notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            login_method: u.login_method,
            is_blocked: u.is_blocked,
            is_deleted: u.is_deleted,
            otp_verified: u.otp_verified,
            notifications_enabled: u.notifications_enabled,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub img: Option<String>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(p: profile::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            name: p.name,
            email: p.email,
            phone: p.phone,
            img: p.img,
        }
    }
}

/// The signed-in user's own account view
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    pub profile: ProfileResponse,
    pub cases: Vec<CaseSummary>,
}

/// Row of the admin user directory
#[derive(Debug, Clone, Serialize)]
pub struct UserListItem {
    pub user: UserResponse,
    pub profile: Option<ProfileResponse>,
    pub active_cases: u64,
}

/// Admin audit view of a single account
#[derive(Debug, Clone, Serialize)]
pub struct UserDetailResponse {
    pub user: UserResponse,
    pub profile: Option<ProfileResponse>,
    pub cases: Vec<CaseSummary>,
}
