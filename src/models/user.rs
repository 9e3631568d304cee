use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Nulled when the account is soft-deleted so the address can be reused
    #[sea_orm(unique)]
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub role: Role,
    pub login_method: LoginMethod,
    pub is_deleted: bool,
    pub is_blocked: bool,
    pub is_logged_in: bool,
    pub logged_out_time: Option<DateTimeUtc>,
    pub password_change_time: Option<DateTimeUtc>,
    #[serde(skip_serializing)]
    pub sent_otp: Option<String>,
    pub otp_verified: bool,
    #[serde(skip_serializing)]
    pub allow_password_change: bool,
    pub notifications_enabled: bool,
    pub agreed_to_terms: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::profile::Entity")]
    Profile,
    #[sea_orm(has_many = "super::push_token::Entity")]
    PushTokens,
    #[sea_orm(has_one = "super::notification_list::Entity")]
    NotificationList,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::push_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PushTokens.def()
    }
}

impl Related<super::notification_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NotificationList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Account role
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "client")]
    Client,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_value())
    }
}

/// How the account signs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "google")]
    Google,
    #[sea_orm(string_value = "facebook")]
    Facebook,
}

impl LoginMethod {
    pub fn is_oauth(&self) -> bool {
        !matches!(self, LoginMethod::Email)
    }
}

impl std::fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_value())
    }
}

impl Model {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Sessions issued before this instant are revoked
    pub fn revoked_before(&self) -> Option<DateTimeUtc> {
        match (self.logged_out_time, self.password_change_time) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample() -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            name: "Dana".to_string(),
            email: Some("dana@example.com".to_string()),
            hashed_password: None,
            role: Role::Client,
            login_method: LoginMethod::Email,
            is_deleted: false,
            is_blocked: false,
            is_logged_in: false,
            logged_out_time: None,
            password_change_time: None,
            sent_otp: None,
            otp_verified: true,
            allow_password_change: false,
            notifications_enabled: true,
            agreed_to_terms: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_serializes_as_stored_value() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["role"], "client");
        assert_eq!(json["login_method"], "email");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_revoked_before_takes_latest_stamp() {
        let mut user = sample();
        assert!(user.revoked_before().is_none());

        let earlier = Utc::now() - Duration::hours(2);
        let later = Utc::now() - Duration::hours(1);
        user.logged_out_time = Some(later);
        user.password_change_time = Some(earlier);
        assert_eq!(user.revoked_before(), Some(later));

        user.logged_out_time = None;
        assert_eq!(user.revoked_before(), Some(earlier));
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let mut user = sample();
        user.hashed_password = Some("$2b$hash".to_string());
        user.sent_otp = Some("123456".to_string());

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("$2b$hash"));
        assert!(!json.contains("123456"));
    }
}
