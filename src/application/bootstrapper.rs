//! Application bootstrapper
//!
//! Handles all initialization and setup for the Casedesk backend.

use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, CONFIG};
use crate::db;
use crate::endpoints;
use crate::services::identity::HttpIdentityVerifier;
use crate::services::notification::{DisabledEmailSender, HttpPushSender, SmtpEmailSender};
use crate::services::scheduler::{start_scheduler, CourtReminderTask, PeriodicTask};
use crate::services::storage::{DisabledStorage, HttpObjectStorage};
use crate::services::{EmailSender, InMemoryPresence, ObjectStorage, PushSender};
use crate::state::{AppState, Collaborators};

/// Bootstrap and run the application
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Casedesk backend v{}", CONFIG.version);

    let state = init_services(&CONFIG).await?;

    let tasks: Vec<Box<dyn PeriodicTask>> = vec![Box::new(CourtReminderTask {
        notifications: state.notifications.clone(),
        run_at: CONFIG.reminder.run_at,
    })];
    start_scheduler(Arc::new(state.db.clone()), tasks);

    let app = create_app(state, &CONFIG);

    serve(app, &CONFIG).await
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("casedesk={}", CONFIG.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();
}

/// Build the provider clients from configuration
pub fn init_providers(config: &Config) -> anyhow::Result<Collaborators> {
    let timeout = config.provider_timeout;

    let email: Arc<dyn EmailSender> = match SmtpEmailSender::from_config(&config.email, timeout)? {
        Some(smtp) => {
            tracing::info!("SMTP email transport configured");
            Arc::new(smtp)
        }
        None => {
            tracing::warn!("SMTP not configured, outgoing email is disabled");
            Arc::new(DisabledEmailSender)
        }
    };

    let push = HttpPushSender::from_config(&config.push, timeout)?
        .map(|p| Arc::new(p) as Arc<dyn PushSender>);
    if push.is_none() {
        tracing::info!("Push gateway not configured, push fan-out is disabled");
    }

    let storage: Arc<dyn ObjectStorage> = match HttpObjectStorage::from_config(&config.storage, timeout)? {
        Some(store) => Arc::new(store),
        None => {
            tracing::warn!("Object storage not configured, uploads will be rejected");
            Arc::new(DisabledStorage)
        }
    };

    let verifier = HttpIdentityVerifier::from_config(&config.auth, timeout)?;

    Ok(Collaborators {
        email,
        push,
        storage,
        verifier: Arc::new(verifier),
        presence: Arc::new(InMemoryPresence::new()),
        provider_timeout: timeout,
        oauth_reprovision: config.auth.oauth_reprovision,
    })
}

/// Connect the database, wire the services and seed the first admin
async fn init_services(config: &Config) -> anyhow::Result<AppState> {
    let conn = db::connect_with_url(&config.database.database_url, config.database.max_connections)
        .await
        .context("database initialization failed")?;
    tracing::info!("Database connection established");

    let state = AppState::new(conn, init_providers(config)?);

    if let (Some(email), Some(password)) = (&config.auth.admin_email, &config.auth.admin_password) {
        if state
            .directory
            .ensure_admin(email, password, &config.auth.admin_name)
            .await?
        {
            tracing::info!(email = %email, "Seeded initial admin account");
        }
    }

    Ok(state)
}

/// Create the main application router
fn create_app(state: AppState, config: &Config) -> Router {
    let origins: Vec<HeaderValue> = config.server.origin_headers();

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    }
    .allow_methods(Any)
    .allow_headers(Any);

    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the HTTP server
async fn serve(app: Router, config: &Config) -> anyhow::Result<()> {
    let addr = config.server.bind_addr().context("invalid listen address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
