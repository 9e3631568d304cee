mod email;
mod push;
pub mod templates;

pub use email::{DisabledEmailSender, SmtpEmailSender};
pub use push::HttpPushSender;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::notification::NotificationKind;
use crate::models::prelude::*;
use crate::models::{notification, notification_list, profile, push_token, user};
use crate::schemas::{
    BellCounts, BroadcastFailure, BroadcastRequest, BroadcastSummary, Page, Receivers,
};

/// Result of a single delivery attempt
#[derive(Debug, Clone)]
pub struct SendResult {
    pub success: bool,
    pub error: Option<String>,
}

impl SendResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Email transport
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> SendResult;
}

/// Push transport, one device token per call
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send_to_token(&self, token: &str, title: &str, body: &str) -> SendResult;
}

/// Outcome of one push fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    pub attempted: usize,
    pub delivered: usize,
    pub pruned: usize,
}

const PUSH_TITLE: &str = "New Notification";

/// Run a provider call with a deadline; a timeout counts as a failed delivery
async fn bounded<F>(timeout: Duration, fut: F) -> SendResult
where
    F: Future<Output = SendResult>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => SendResult::failed("Provider call timed out"),
    }
}

/// Per-user notification ledger, push fan-out and admin broadcast
#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseConnection,
    email: Arc<dyn EmailSender>,
    push: Option<Arc<dyn PushSender>>,
    timeout: Duration,
}

impl NotificationService {
    pub fn new(
        db: DatabaseConnection,
        email: Arc<dyn EmailSender>,
        push: Option<Arc<dyn PushSender>>,
        timeout: Duration,
    ) -> Self {
        Self {
            db,
            email,
            push,
            timeout,
        }
    }

    /// Send one email with the provider deadline applied
    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> SendResult {
        bounded(self.timeout, self.email.send(to, subject, html)).await
    }

    /// Record a notification for a user, bump their bell counters and push it to their devices
    pub async fn notify_user(
        &self,
        user_id: i64,
        kind: NotificationKind,
        detail: &str,
    ) -> Result<notification::Model> {
        let target = User::find_by_id(user_id)
            .filter(user::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let profile_id = Profile::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .map(|p| p.id);

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let ledger = notification_list::ActiveModel {
            user_id: Set(user_id),
            profile_id: Set(profile_id),
            old_notification_count: Set(0),
            new_notification: Set(0),
            seen_notification_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        NotificationList::insert(ledger)
            .on_conflict(
                OnConflict::column(notification_list::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        NotificationList::update_many()
            .col_expr(
                notification_list::Column::NewNotification,
                Expr::col(notification_list::Column::NewNotification).add(1),
            )
            .col_expr(
                notification_list::Column::OldNotificationCount,
                Expr::col(notification_list::Column::OldNotificationCount).add(1),
            )
            .col_expr(notification_list::Column::UpdatedAt, Expr::value(now))
            .filter(notification_list::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let created = notification::ActiveModel {
            user_id: Set(user_id),
            profile_id: Set(profile_id),
            kind: Set(kind),
            detail: Set(detail.to_string()),
            is_seen: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::debug!(user_id, kind = %kind, notification_id = created.id, "Notification recorded");

        if target.notifications_enabled {
            self.push_to_user(user_id, PUSH_TITLE, detail).await;
        }

        Ok(created)
    }

    /// Deliver to every registered token in parallel and prune the ones that fail.
    /// Never returns an error; failures are logged and reported.
    pub async fn push_to_user(&self, user_id: i64, title: &str, body: &str) -> PushReport {
        let Some(push) = self.push.as_ref() else {
            return PushReport::default();
        };

        let tokens = match PushToken::find()
            .filter(push_token::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
        {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load push tokens");
                return PushReport::default();
            }
        };

        if tokens.is_empty() {
            return PushReport::default();
        }

        let sends = tokens.iter().map(|t| {
            let push = push.clone();
            async move {
                let result = bounded(self.timeout, push.send_to_token(&t.token, title, body)).await;
                (t.token.clone(), result)
            }
        });
        let results = join_all(sends).await;

        let failed: Vec<String> = results
            .iter()
            .filter(|(_, r)| !r.success)
            .map(|(token, _)| token.clone())
            .collect();

        let mut report = PushReport {
            attempted: results.len(),
            delivered: results.len() - failed.len(),
            pruned: 0,
        };

        if !failed.is_empty() {
            match PushToken::delete_many()
                .filter(push_token::Column::UserId.eq(user_id))
                .filter(push_token::Column::Token.is_in(failed.clone()))
                .exec(&self.db)
                .await
            {
                Ok(res) => report.pruned = res.rows_affected as usize,
                Err(e) => tracing::warn!(user_id, error = %e, "Failed to prune push tokens"),
            }
            tracing::info!(
                user_id,
                token_count = report.attempted,
                pruned = report.pruned,
                "Pruned push tokens after failed delivery"
            );
        }

        report
    }

    /// Bell badge counters; zeroes when the user never received anything
    pub async fn bell(&self, user_id: i64) -> Result<BellCounts> {
        let ledger = NotificationList::find()
            .filter(notification_list::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(ledger
            .map(|l| BellCounts {
                new_notification: l.new_notification,
                old_notification_count: l.old_notification_count,
                seen_notification_count: l.seen_notification_count,
            })
            .unwrap_or_default())
    }

    /// Return every notification (newest first) and clear the bell badge
    pub async fn fetch_all(&self, user_id: i64) -> Result<Vec<notification::Model>> {
        let exists = NotificationList::find()
            .filter(notification_list::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;
        if exists == 0 {
            return Err(AppError::NotFound("No notifications found".to_string()));
        }

        // Both assignments read the pre-update row, so the badge moves into the seen counter atomically
        NotificationList::update_many()
            .col_expr(
                notification_list::Column::SeenNotificationCount,
                Expr::col(notification_list::Column::SeenNotificationCount)
                    .add(Expr::col(notification_list::Column::NewNotification)),
            )
            .col_expr(notification_list::Column::NewNotification, Expr::value(0i64))
            .col_expr(notification_list::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notification_list::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        let notifications = Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .all(&self.db)
            .await?;

        Ok(notifications)
    }

    async fn find_owned(&self, actor_id: i64, id: i64) -> Result<notification::Model> {
        let found = Notification::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if found.user_id != actor_id {
            return Err(AppError::Forbidden(
                "Cannot modify another user's notification".to_string(),
            ));
        }
        Ok(found)
    }

    async fn set_seen(&self, actor_id: i64, id: i64, seen: bool) -> Result<notification::Model> {
        let found = self.find_owned(actor_id, id).await?;
        if found.is_seen == seen {
            return Ok(found);
        }

        let mut active: notification::ActiveModel = found.into();
        active.is_seen = Set(seen);
        Ok(active.update(&self.db).await?)
    }

    pub async fn mark_seen(&self, actor_id: i64, id: i64) -> Result<notification::Model> {
        self.set_seen(actor_id, id, true).await
    }

    pub async fn mark_unread(&self, actor_id: i64, id: i64) -> Result<notification::Model> {
        self.set_seen(actor_id, id, false).await
    }

    /// Owners delete their own notifications; admins may delete any
    pub async fn delete(&self, actor: &user::Model, id: i64) -> Result<()> {
        let found = Notification::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if found.user_id != actor.id && !actor.is_admin() {
            return Err(AppError::Forbidden(
                "Cannot delete another user's notification".to_string(),
            ));
        }

        let result = Notification::delete_many()
            .filter(notification::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        tracing::info!(notification_id = id, actor_id = actor.id, "Notification deleted");
        Ok(())
    }

    /// Admin listing across all users, newest first
    pub async fn admin_list(
        &self,
        page: u64,
        limit: u64,
        include_chat: bool,
    ) -> Result<Page<notification::Model>> {
        let mut query = Notification::find();
        if !include_chat {
            query = query.filter(
                notification::Column::Kind.ne(NotificationKind::ChatMessage),
            );
        }

        let paginator = query
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .paginate(&self.db, limit);

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page - 1).await?;

        Ok(Page::new(data, page, limit, total))
    }

    async fn resolve_receivers(&self, receivers: &Receivers) -> Result<Vec<user::Model>> {
        let query = match receivers {
            Receivers::All => User::find()
                .filter(user::Column::Role.eq(user::Role::Client))
                .filter(user::Column::IsBlocked.eq(false)),
            Receivers::Users(ids) => User::find().filter(user::Column::Id.is_in(ids.clone())),
        };

        Ok(query
            .filter(user::Column::IsDeleted.eq(false))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Notify and email every recipient independently, returning an aggregate summary
    pub async fn broadcast(&self, request: &BroadcastRequest) -> Result<BroadcastSummary> {
        let recipients = self.resolve_receivers(&request.receivers).await?;
        if recipients.is_empty() {
            return Err(AppError::BadRequest("No recipients found".to_string()));
        }

        let title = request
            .title
            .clone()
            .unwrap_or_else(|| "Notification from your legal team".to_string());

        let mut summary = BroadcastSummary {
            total: recipients.len(),
            ..Default::default()
        };

        for recipient in &recipients {
            match self
                .notify_user(recipient.id, NotificationKind::CaseNotification, &request.message)
                .await
            {
                Ok(_) => summary.notified += 1,
                Err(e) => {
                    tracing::warn!(user_id = recipient.id, error = %e, "Broadcast notification failed");
                    summary.failures.push(BroadcastFailure {
                        user_id: recipient.id,
                        reason: format!("notification: {}", e),
                    });
                    continue;
                }
            }

            let Some(address) = recipient.email.as_deref() else {
                continue;
            };
            let html = templates::broadcast_email(&recipient.name, &title, &request.message);
            let result = self.send_email(address, &title, &html).await;
            if result.success {
                summary.emailed += 1;
            } else {
                let reason = result.error.unwrap_or_else(|| "unknown".to_string());
                tracing::warn!(user_id = recipient.id, error = %reason, "Broadcast email failed");
                summary.failures.push(BroadcastFailure {
                    user_id: recipient.id,
                    reason: format!("email: {}", reason),
                });
            }
        }

        tracing::info!(
            total = summary.total,
            notified = summary.notified,
            emailed = summary.emailed,
            "Broadcast finished"
        );

        if summary.notified == 0 {
            return Err(AppError::Upstream(format!(
                "Broadcast reached none of {} recipients",
                summary.total
            )));
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_times_out_as_failure() {
        let result = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            SendResult::ok()
        })
        .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Provider call timed out"));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_result() {
        let result = bounded(Duration::from_secs(1), async { SendResult::ok() }).await;
        assert!(result.success);
    }
}
