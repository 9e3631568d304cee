//! Periodic task scheduler
//!
//! Background tasks implement `PeriodicTask` and each runs in its own loop,
//! so a task's runs never overlap.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, Utc};
use sea_orm::{sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::models::case_overview::{self, CaseStatus};
use crate::models::prelude::*;
use crate::services::notification::{templates, NotificationService};

/// Trait for periodic background tasks
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Task name for logging
    fn name(&self) -> &'static str;

    /// How often to run
    fn interval(&self) -> Duration;

    /// Wait before the first run
    fn first_delay(&self, _now: DateTime<Utc>) -> Duration {
        self.interval()
    }

    /// Execute the task
    async fn run(&self, db: &DatabaseConnection) -> anyhow::Result<()>;
}

/// Start all periodic tasks
pub fn start_scheduler(db: Arc<DatabaseConnection>, tasks: Vec<Box<dyn PeriodicTask>>) {
    for task in tasks {
        let db = db.clone();
        tokio::spawn(async move {
            run_task(task, db).await;
        });
    }

    tracing::info!("Periodic task scheduler started");
}

/// Run a single task on its schedule
async fn run_task(task: Box<dyn PeriodicTask>, db: Arc<DatabaseConnection>) {
    let delay = task.first_delay(Utc::now());
    tracing::info!(task = task.name(), first_run_in_secs = delay.as_secs(), "Task scheduled");

    let mut ticker = interval_at(Instant::now() + delay, task.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        tracing::debug!(task = task.name(), "Running periodic task");

        match task.run(&db).await {
            Ok(()) => {
                tracing::debug!(task = task.name(), "Periodic task completed");
            }
            Err(e) => {
                tracing::error!(task = task.name(), error = %e, "Periodic task failed");
            }
        }
    }
}

/// Time until the next occurrence of `at` (UTC); a full day if it is exactly now
pub fn until_next(now: DateTime<Utc>, at: NaiveTime) -> Duration {
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::from_secs(0))
}

// ============================================================================
// Court Date Reminder Task
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderReport {
    pub scanned: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Emails clients the day before an in-progress case goes to court, once per court date
pub struct CourtReminderTask {
    pub notifications: NotificationService,
    pub run_at: NaiveTime,
}

impl CourtReminderTask {
    pub async fn run_once(
        &self,
        db: &DatabaseConnection,
        today: NaiveDate,
    ) -> anyhow::Result<ReminderReport> {
        let Some(tomorrow) = today.succ_opt() else {
            return Ok(ReminderReport::default());
        };

        let due = CaseOverview::find()
            .filter(case_overview::Column::CaseStatus.eq(CaseStatus::InProgress))
            .filter(case_overview::Column::IsDeleted.eq(false))
            .filter(case_overview::Column::CourtDate.eq(tomorrow))
            .filter(case_overview::Column::IsMailSent.eq(false))
            .order_by_asc(case_overview::Column::Id)
            .all(db)
            .await?;

        let mut report = ReminderReport {
            scanned: due.len(),
            ..Default::default()
        };

        for case in due {
            let client = User::find_by_id(case.client_user_id).one(db).await?;
            let Some((name, email)) = client.and_then(|c| c.email.map(|e| (c.name, e))) else {
                tracing::warn!(case_id = case.id, client_user_id = case.client_user_id, "No client email, skipping court reminder");
                report.skipped += 1;
                continue;
            };

            // Claim the case first so a concurrent run cannot send a second reminder
            let claimed = CaseOverview::update_many()
                .col_expr(case_overview::Column::IsMailSent, Expr::value(true))
                .filter(case_overview::Column::Id.eq(case.id))
                .filter(case_overview::Column::IsMailSent.eq(false))
                .exec(db)
                .await?;
            if claimed.rows_affected == 0 {
                report.skipped += 1;
                continue;
            }

            let html = templates::court_reminder_email(&name, &case.case_number, tomorrow);
            let result = self
                .notifications
                .send_email(&email, "Court Date Reminder", &html)
                .await;

            if result.success {
                tracing::info!(case_id = case.id, "Court reminder sent");
                report.sent += 1;
            } else {
                tracing::warn!(case_id = case.id, error = ?result.error, "Court reminder failed");
                CaseOverview::update_many()
                    .col_expr(case_overview::Column::IsMailSent, Expr::value(false))
                    .filter(case_overview::Column::Id.eq(case.id))
                    .exec(db)
                    .await?;
                report.failed += 1;
            }
        }

        Ok(report)
    }
}

#[async_trait]
impl PeriodicTask for CourtReminderTask {
    fn name(&self) -> &'static str {
        "court_reminder"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(24 * 60 * 60)
    }

    fn first_delay(&self, now: DateTime<Utc>) -> Duration {
        until_next(now, self.run_at)
    }

    async fn run(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        let report = self.run_once(db, Utc::now().date_naive()).await?;
        tracing::info!(
            scanned = report.scanned,
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failed,
            "Court reminder run finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_until_next_later_today() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let at = NaiveTime::from_hms_opt(11, 30, 0).unwrap();
        assert_eq!(until_next(now, at), Duration::from_secs(2 * 3600 + 1800));
    }

    #[test]
    fn test_until_next_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let at = NaiveTime::from_hms_opt(11, 30, 0).unwrap();
        assert_eq!(until_next(now, at), Duration::from_secs(23 * 3600 + 1800));

        let exactly = Utc.with_ymd_and_hms(2026, 10, 18, 11, 30, 0).unwrap();
        assert_eq!(until_next(exactly, at), Duration::from_secs(24 * 3600));
    }
}
