//! Court date reminder runs against a fixed "today"

use chrono::{NaiveDate, NaiveTime};
use sea_orm::EntityTrait;

mod common;
use common::{sample_case, TestApp};

use casedesk::models::case_overview::CaseStatus;
use casedesk::models::prelude::*;
use casedesk::models::user;
use casedesk::schemas::CaseRequest;
use casedesk::services::scheduler::{CourtReminderTask, ReminderReport};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 5, 13).unwrap()
}

fn tomorrow() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 5, 14).unwrap()
}

fn task(app: &TestApp) -> CourtReminderTask {
    CourtReminderTask {
        notifications: app.state.notifications.clone(),
        run_at: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
    }
}

async fn case_in_court(
    app: &TestApp,
    admin: &user::Model,
    client: &user::Model,
    date: NaiveDate,
    status: CaseStatus,
) -> i64 {
    let mut req = sample_case(client);
    req.court_date = Some(date);
    req.case_status = status;
    app.state
        .cases
        .execute(admin, CaseRequest::Create(req), Vec::new())
        .await
        .unwrap()
        .case
        .id
}

async fn mail_sent(app: &TestApp, case_id: i64) -> bool {
    CaseOverview::find_by_id(case_id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .is_mail_sent
}

#[tokio::test]
async fn test_reminder_sent_once_for_tomorrows_hearing() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let due = case_in_court(&app, &admin, &client, tomorrow(), CaseStatus::InProgress).await;
    // Not due: wrong day, and not in progress
    case_in_court(&app, &admin, &client, today(), CaseStatus::InProgress).await;
    case_in_court(&app, &admin, &client, tomorrow(), CaseStatus::Pending).await;

    let report = task(&app).run_once(&app.db, today()).await.unwrap();
    assert_eq!(
        report,
        ReminderReport {
            scanned: 1,
            sent: 1,
            skipped: 0,
            failed: 0,
        }
    );
    assert!(mail_sent(&app, due).await);

    let mails = app.mailer.sent_to("ana@example.com");
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].subject, "Court Date Reminder");
    assert!(mails[0].html.contains("May 14, 2030"));

    // A second run the same day sends nothing new
    let report = task(&app).run_once(&app.db, today()).await.unwrap();
    assert_eq!(report.scanned, 0);
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_failed_email_leaves_case_for_next_run() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let due = case_in_court(&app, &admin, &client, tomorrow(), CaseStatus::InProgress).await;
    app.mailer.set_failing(true);

    let report = task(&app).run_once(&app.db, today()).await.unwrap();
    assert_eq!(report.failed, 1);
    assert!(!mail_sent(&app, due).await);

    app.mailer.set_failing(false);
    let report = task(&app).run_once(&app.db, today()).await.unwrap();
    assert_eq!(report.sent, 1);
    assert!(mail_sent(&app, due).await);
}

#[tokio::test]
async fn test_client_without_email_is_skipped() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let due = case_in_court(&app, &admin, &client, tomorrow(), CaseStatus::InProgress).await;
    app.state.directory.self_destruct(&client).await.unwrap();

    let report = task(&app).run_once(&app.db, today()).await.unwrap();
    assert_eq!(report.scanned, 1);
    assert_eq!(report.skipped, 1);
    assert!(!mail_sent(&app, due).await);
    assert!(app.mailer.sent().is_empty());
}
