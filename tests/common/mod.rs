//! Test helpers and utilities for integration testing.
//!
//! Builds an application state on an in-memory SQLite database with
//! recording doubles in place of the email, push, storage and identity
//! providers.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use sea_orm::{Database, DatabaseConnection, EntityTrait, TransactionTrait};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::util::ServiceExt;

use casedesk::endpoints::create_router;
use casedesk::error::{AppError, Result};
use casedesk::migrations::Migrator;
use casedesk::models::user::{self, LoginMethod, Role};
use casedesk::models::{case_overview, prelude::*};
use casedesk::models::case_overview::{CaseStatus, CaseType};
use casedesk::schemas::{CaseRequest, CreateCase};
use casedesk::services::identity::VerifiedIdentity;
use casedesk::services::notification::SendResult;
use casedesk::services::profile::{create_account, NewAccount};
use casedesk::services::storage::{StoredObject, UploadFile};
use casedesk::services::{
    create_access_token, EmailSender, IdentityVerifier, InMemoryPresence, ObjectStorage,
    PushSender,
};
use casedesk::state::{AppState, Collaborators};

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    // Use simple in-memory SQLite - each connection gets its own database
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    // Run migrations using the Migrator
    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Create a user with a profile and return the user model
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
    verified: bool,
) -> user::Model {
    // Low cost keeps the suite fast
    let hashed = bcrypt::hash(password, 4).expect("hash");

    let txn = db.begin().await.unwrap();
    let (created, _) = create_account(
        &txn,
        NewAccount {
            name: name.to_string(),
            email: email.to_string(),
            hashed_password: Some(hashed),
            role,
            login_method: LoginMethod::Email,
            otp_verified: verified,
            agreed_to_terms: true,
            phone: None,
            sent_otp: None,
        },
    )
    .await
    .expect("Failed to create test user");
    txn.commit().await.unwrap();

    created
}

/// Reload a user row
pub async fn reload_user(db: &DatabaseConnection, id: i64) -> user::Model {
    User::find_by_id(id).one(db).await.unwrap().expect("user exists")
}

pub fn token_for(user: &user::Model) -> String {
    create_access_token(user).expect("token")
}

// ============================================================================
// Provider doubles
// ============================================================================

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email sender that records instead of delivering
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<SentEmail> {
        self.sent().into_iter().filter(|m| m.to == to).collect()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> SendResult {
        if self.failing.load(Ordering::SeqCst) {
            return SendResult::failed("mailbox unavailable");
        }
        self.sent.lock().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        SendResult::ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPush {
    pub token: String,
    pub title: String,
    pub body: String,
}

/// Push sender that records deliveries and rejects configured tokens
#[derive(Default)]
pub struct RecordingPush {
    sent: Mutex<Vec<SentPush>>,
    dead_tokens: Mutex<HashSet<String>>,
}

impl RecordingPush {
    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().clone()
    }

    pub fn reject_token(&self, token: &str) {
        self.dead_tokens.lock().insert(token.to_string());
    }
}

#[async_trait]
impl PushSender for RecordingPush {
    async fn send_to_token(&self, token: &str, title: &str, body: &str) -> SendResult {
        if self.dead_tokens.lock().contains(token) {
            return SendResult::failed("NotRegistered");
        }
        self.sent.lock().push(SentPush {
            token: token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        SendResult::ok()
    }
}

/// Object store that keeps URLs in memory and can fail on a chosen upload
#[derive(Default)]
pub struct RecordingStorage {
    uploads: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    calls: AtomicUsize,
    fail_on_call: Mutex<Option<usize>>,
}

impl RecordingStorage {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploads.lock().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }

    /// Fail the n-th upload from now on (1-based)
    pub fn fail_on_upload(&self, n: usize) {
        let already = self.calls.load(Ordering::SeqCst);
        *self.fail_on_call.lock() = Some(already + n);
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn upload(&self, file: &UploadFile) -> Result<StoredObject> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_on_call.lock() == Some(call) {
            return Err(AppError::Upstream("storage offline".to_string()));
        }

        let url = format!("https://files.test/{}/{}", call, file.file_name);
        self.uploads.lock().push(url.clone());
        Ok(StoredObject {
            url,
            size: file.bytes.len() as i64,
        })
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.deleted.lock().push(url.to_string());
        Ok(())
    }
}

/// Identity provider that accepts a single assertion
#[derive(Default)]
pub struct StaticVerifier {
    identity: Mutex<Option<(String, VerifiedIdentity)>>,
}

impl StaticVerifier {
    pub fn accept(&self, assertion: &str, email: &str, name: &str) {
        *self.identity.lock() = Some((
            assertion.to_string(),
            VerifiedIdentity {
                email: email.to_string(),
                name: name.to_string(),
                email_verified: true,
            },
        ));
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, _provider: LoginMethod, assertion: &str) -> Result<VerifiedIdentity> {
        match &*self.identity.lock() {
            Some((accepted, identity)) if accepted == assertion => Ok(identity.clone()),
            _ => Err(AppError::Unauthorized("Invalid social login token".to_string())),
        }
    }
}

// ============================================================================
// Application harness
// ============================================================================

pub struct TestApp {
    pub db: DatabaseConnection,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub push: Arc<RecordingPush>,
    pub storage: Arc<RecordingStorage>,
    pub verifier: Arc<StaticVerifier>,
    pub presence: Arc<InMemoryPresence>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_reprovision(false).await
    }

    pub async fn with_reprovision(oauth_reprovision: bool) -> Self {
        let db = create_test_db().await;
        let mailer = Arc::new(RecordingMailer::default());
        let push = Arc::new(RecordingPush::default());
        let storage = Arc::new(RecordingStorage::default());
        let verifier = Arc::new(StaticVerifier::default());
        let presence = Arc::new(InMemoryPresence::new());

        let state = AppState::new(
            db.clone(),
            Collaborators {
                email: mailer.clone(),
                push: Some(push.clone()),
                storage: storage.clone(),
                verifier: verifier.clone(),
                presence: presence.clone(),
                provider_timeout: Duration::from_secs(2),
                oauth_reprovision,
            },
        );

        Self {
            db,
            state,
            mailer,
            push,
            storage,
            verifier,
            presence,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub async fn admin(&self) -> user::Model {
        create_test_user(&self.db, "Ada Admin", "admin@firm.test", "adminpass", Role::Admin, true).await
    }

    pub async fn client(&self, name: &str, email: &str) -> user::Model {
        create_test_user(&self.db, name, email, "clientpass", Role::Client, true).await
    }

    /// Open a case without files through the orchestrator
    pub async fn open_case(&self, admin: &user::Model, client: &user::Model) -> case_overview::Model {
        self.state
            .cases
            .execute(
                admin,
                CaseRequest::Create(sample_case(client)),
                Vec::new(),
            )
            .await
            .expect("case created")
            .case
    }

    pub async fn request(&self, req: Request<Body>) -> (StatusCode, Value) {
        send(self.router(), req).await
    }
}

pub fn sample_case(client: &user::Model) -> CreateCase {
    CreateCase {
        client_user_id: client.id,
        client_name: client.name.clone(),
        case_type: CaseType::TrafficViolation,
        case_status: CaseStatus::InProgress,
        court_date: None,
        note: None,
        title: Some("Tenancy dispute".to_string()),
        assets: Vec::new(),
    }
}

pub fn upload(name: &str, bytes: &[u8]) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: bytes.to_vec(),
    }
}

// ============================================================================
// HTTP helpers
// ============================================================================

pub const BOUNDARY: &str = "casedesk-test-boundary";

/// Build a JSON request with an optional bearer token
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Build a multipart request with a JSON `payload` field and file parts
pub fn multipart_request(uri: &str, token: &str, payload: &Value, files: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"payload\"\r\n\r\n{}\r\n",
            BOUNDARY, payload
        )
        .as_bytes(),
    );
    for (name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Send a request and return the status with the body parsed as JSON
/// (a plain-text body comes back as a JSON string)
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, body)
}
