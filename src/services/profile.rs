//! User and profile directory

use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::user::{LoginMethod, Role};
use crate::models::{case_overview, profile, profile_case, push_token, user};
use crate::schemas::{
    CaseSummary, MeResponse, Page, ProfileResponse, RegisterRequest, UpdateMeRequest,
    UserDetailResponse, UserListItem, UserResponse,
};
use crate::services::notification::{templates, NotificationService};
use crate::services::security::{generate_otp, hash_password};
use crate::services::storage::{ObjectStorage, UploadFile};

/// Fields for a brand-new User and Profile pair
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub hashed_password: Option<String>,
    pub role: Role,
    pub login_method: LoginMethod,
    pub otp_verified: bool,
    pub agreed_to_terms: bool,
    pub phone: Option<String>,
    pub sent_otp: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Insert a User and its Profile on the given connection (usually a transaction)
pub async fn create_account<C: ConnectionTrait>(
    conn: &C,
    account: NewAccount,
) -> Result<(user::Model, profile::Model)> {
    let now = Utc::now();
    let email = normalize_email(&account.email);

    let created_user = user::ActiveModel {
        name: Set(account.name.clone()),
        email: Set(Some(email.clone())),
        hashed_password: Set(account.hashed_password),
        role: Set(account.role),
        login_method: Set(account.login_method),
        is_deleted: Set(false),
        is_blocked: Set(false),
        is_logged_in: Set(false),
        logged_out_time: Set(None),
        password_change_time: Set(None),
        sent_otp: Set(account.sent_otp),
        otp_verified: Set(account.otp_verified),
        allow_password_change: Set(false),
        notifications_enabled: Set(true),
        agreed_to_terms: Set(account.agreed_to_terms),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let created_profile = profile::ActiveModel {
        user_id: Set(created_user.id),
        name: Set(account.name),
        email: Set(Some(email)),
        phone: Set(account.phone),
        img: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok((created_user, created_profile))
}

/// Active (not deleted) user holding this email
pub async fn find_active_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> Result<Option<user::Model>> {
    Ok(User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .filter(user::Column::IsDeleted.eq(false))
        .one(conn)
        .await?)
}

pub async fn find_profile<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
) -> Result<Option<profile::Model>> {
    Ok(Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}

/// The profile's linked cases in insertion order, live cases only
pub async fn profile_cases<C: ConnectionTrait>(
    conn: &C,
    profile_id: i64,
) -> Result<Vec<case_overview::Model>> {
    let links = ProfileCase::find()
        .filter(profile_case::Column::ProfileId.eq(profile_id))
        .order_by_asc(profile_case::Column::Id)
        .find_also_related(CaseOverview)
        .all(conn)
        .await?;

    Ok(links
        .into_iter()
        .filter_map(|(_, case)| case)
        .filter(|case| !case.is_deleted)
        .collect())
}

#[derive(Clone)]
pub struct DirectoryService {
    db: DatabaseConnection,
    storage: Arc<dyn ObjectStorage>,
    notifications: NotificationService,
}

impl DirectoryService {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn ObjectStorage>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            db,
            storage,
            notifications,
        }
    }

    /// Self-service client sign-up
    pub async fn register(&self, req: RegisterRequest) -> Result<user::Model> {
        if req.password != req.confirm_password {
            return Err(AppError::BadRequest("Passwords do not match".to_string()));
        }
        if !req.agreed_to_terms {
            return Err(AppError::BadRequest(
                "You must accept the terms and conditions".to_string(),
            ));
        }
        if find_active_by_email(&self.db, &req.email).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let hashed = hash_password(&req.password).await?;
        let otp = generate_otp();

        let txn = self.db.begin().await?;
        let (created, _) = create_account(
            &txn,
            NewAccount {
                name: req.name.trim().to_string(),
                email: req.email.clone(),
                hashed_password: Some(hashed),
                role: Role::Client,
                login_method: LoginMethod::Email,
                otp_verified: false,
                agreed_to_terms: true,
                phone: req.phone.clone(),
                sent_otp: Some(otp.clone()),
            },
        )
        .await?;
        txn.commit().await?;

        tracing::info!(user_id = created.id, "Client registered");

        if let Some(email) = created.email.as_deref() {
            let html = templates::otp_email(&created.name, &otp);
            let result = self
                .notifications
                .send_email(email, "Your verification code", &html)
                .await;
            if !result.success {
                tracing::warn!(user_id = created.id, error = ?result.error, "Registration OTP email failed");
            }
        }

        Ok(created)
    }

    pub async fn get_me(&self, user: &user::Model) -> Result<MeResponse> {
        let profile = find_profile(&self.db, user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        let cases = profile_cases(&self.db, profile.id).await?;

        Ok(MeResponse {
            user: user.clone().into(),
            profile: profile.into(),
            cases: cases.into_iter().map(CaseSummary::from).collect(),
        })
    }

    /// Update identity fields on both the User and its Profile
    pub async fn update_me(&self, user: &user::Model, req: UpdateMeRequest) -> Result<MeResponse> {
        let profile = find_profile(&self.db, user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let email = req.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            let taken = User::find()
                .filter(user::Column::Email.eq(email.as_str()))
                .filter(user::Column::IsDeleted.eq(false))
                .filter(user::Column::Id.ne(user.id))
                .count(&self.db)
                .await?;
            if taken > 0 {
                return Err(AppError::Conflict("Email is already in use".to_string()));
            }
        }

        let name = req.name.as_deref().map(str::trim).map(str::to_string);
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let mut user_update: user::ActiveModel = user.clone().into();
        let mut profile_update: profile::ActiveModel = profile.into();
        if let Some(name) = &name {
            user_update.name = Set(name.clone());
            profile_update.name = Set(name.clone());
        }
        if let Some(email) = &email {
            user_update.email = Set(Some(email.clone()));
            profile_update.email = Set(Some(email.clone()));
        }
        if let Some(phone) = &req.phone {
            profile_update.phone = Set(Some(phone.clone()));
        }
        user_update.updated_at = Set(now);
        profile_update.updated_at = Set(now);

        let updated_user = user_update.update(&txn).await?;
        profile_update.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(user_id = user.id, "Profile updated");
        self.get_me(&updated_user).await
    }

    /// Store a new avatar; the upload is removed again if the profile write fails
    pub async fn upload_avatar(&self, user: &user::Model, file: UploadFile) -> Result<ProfileResponse> {
        let profile = find_profile(&self.db, user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        let previous = profile.img.clone();

        let stored = self.storage.upload(&file).await?;

        let mut active: profile::ActiveModel = profile.into();
        active.img = Set(Some(stored.url.clone()));
        active.updated_at = Set(Utc::now());

        let updated = match active.update(&self.db).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored.url).await {
                    tracing::warn!(url = %stored.url, error = %cleanup, "Failed to remove orphaned avatar");
                }
                return Err(e.into());
            }
        };

        if let Some(old) = previous {
            if let Err(e) = self.storage.delete(&old).await {
                tracing::warn!(url = %old, error = %e, "Failed to remove previous avatar");
            }
        }

        Ok(updated.into())
    }

    /// Add a device token to the user's set; repeated adds are no-ops
    pub async fn add_push_token(&self, user_id: i64, token: &str) -> Result<()> {
        let row = push_token::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        PushToken::insert(row)
            .on_conflict(
                OnConflict::columns([push_token::Column::UserId, push_token::Column::Token])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    pub async fn remove_push_token(&self, user_id: i64, token: &str) -> Result<()> {
        PushToken::delete_many()
            .filter(push_token::Column::UserId.eq(user_id))
            .filter(push_token::Column::Token.eq(token))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn set_notifications_enabled(&self, user_id: i64, enabled: bool) -> Result<()> {
        User::update_many()
            .col_expr(user::Column::NotificationsEnabled, Expr::value(enabled))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Soft-delete: release the email, end every session, drop device tokens
    async fn soft_delete(&self, user_id: i64) -> Result<()> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        User::update_many()
            .col_expr(user::Column::IsDeleted, Expr::value(true))
            .col_expr(user::Column::Email, Expr::value(Option::<String>::None))
            .col_expr(user::Column::IsLoggedIn, Expr::value(false))
            .col_expr(user::Column::LoggedOutTime, Expr::value(now))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;

        Profile::update_many()
            .col_expr(profile::Column::Email, Expr::value(Option::<String>::None))
            .col_expr(profile::Column::UpdatedAt, Expr::value(now))
            .filter(profile::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        PushToken::delete_many()
            .filter(push_token::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn self_destruct(&self, user: &user::Model) -> Result<()> {
        if user.is_admin() {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be self-deleted".to_string(),
            ));
        }
        self.soft_delete(user.id).await?;
        tracing::info!(user_id = user.id, "Account self-deleted");
        Ok(())
    }

    /// Live, non-admin account targeted by an admin action
    async fn manageable_user(&self, id: i64) -> Result<user::Model> {
        let target = User::find_by_id(id)
            .filter(user::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if target.is_admin() {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be modified here".to_string(),
            ));
        }
        Ok(target)
    }

    pub async fn delete_user(&self, admin: &user::Model, id: i64) -> Result<()> {
        let target = self.manageable_user(id).await?;
        self.soft_delete(target.id).await?;
        tracing::info!(user_id = target.id, admin_id = admin.id, "Account deleted by admin");
        Ok(())
    }

    pub async fn block_user(&self, admin: &user::Model, id: i64) -> Result<UserResponse> {
        let target = self.manageable_user(id).await?;
        let now = Utc::now();

        let mut active: user::ActiveModel = target.into();
        active.is_blocked = Set(true);
        active.is_logged_in = Set(false);
        active.logged_out_time = Set(Some(now));
        active.updated_at = Set(now);
        let updated = active.update(&self.db).await?;

        tracing::info!(user_id = id, admin_id = admin.id, "Account blocked");
        Ok(updated.into())
    }

    pub async fn unblock_user(&self, admin: &user::Model, id: i64) -> Result<UserResponse> {
        let target = self.manageable_user(id).await?;

        let mut active: user::ActiveModel = target.into();
        active.is_blocked = Set(false);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;

        tracing::info!(user_id = id, admin_id = admin.id, "Account unblocked");
        Ok(updated.into())
    }

    /// Active directory: neither blocked nor deleted
    pub async fn list_users(&self, page: u64, limit: u64) -> Result<Page<UserListItem>> {
        let paginator = User::find()
            .filter(user::Column::IsDeleted.eq(false))
            .filter(user::Column::IsBlocked.eq(false))
            .order_by_asc(user::Column::Id)
            .paginate(&self.db, limit);

        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page - 1).await?;

        let mut items = Vec::with_capacity(users.len());
        for u in users {
            let profile = find_profile(&self.db, u.id).await?;
            let active_cases = CaseOverview::find()
                .filter(case_overview::Column::ClientUserId.eq(u.id))
                .filter(case_overview::Column::IsDeleted.eq(false))
                .count(&self.db)
                .await?;
            items.push(UserListItem {
                user: u.into(),
                profile: profile.map(ProfileResponse::from),
                active_cases,
            });
        }

        Ok(Page::new(items, page, limit, total))
    }

    /// Audit view, soft-deleted accounts and cases included
    pub async fn user_details(&self, id: i64) -> Result<UserDetailResponse> {
        let found = User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let profile = find_profile(&self.db, id).await?;
        let cases = CaseOverview::find()
            .filter(case_overview::Column::ClientUserId.eq(id))
            .order_by_desc(case_overview::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(UserDetailResponse {
            user: found.into(),
            profile: profile.map(ProfileResponse::from),
            cases: cases.into_iter().map(CaseSummary::from).collect(),
        })
    }

    /// Create the configured bootstrap admin if no active account holds its email
    pub async fn ensure_admin(&self, email: &str, password: &str, name: &str) -> Result<bool> {
        if find_active_by_email(&self.db, email).await?.is_some() {
            return Ok(false);
        }

        let hashed = hash_password(password).await?;
        let txn = self.db.begin().await?;
        let (admin, _) = create_account(
            &txn,
            NewAccount {
                name: name.to_string(),
                email: email.to_string(),
                hashed_password: Some(hashed),
                role: Role::Admin,
                login_method: LoginMethod::Email,
                otp_verified: true,
                agreed_to_terms: true,
                phone: None,
                sent_otp: None,
            },
        )
        .await?;
        txn.commit().await?;

        tracing::info!(user_id = admin.id, "Bootstrap admin created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }
}
