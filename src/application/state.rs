use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::services::{
    CaseService, DirectoryService, EmailSender, IdentityService, IdentityVerifier,
    MessagingService, NotificationService, ObjectStorage, PresenceService, PushSender,
};

/// Database connection type alias
pub type DbConn = DatabaseConnection;

/// External providers the services talk to
#[derive(Clone)]
pub struct Collaborators {
    pub email: Arc<dyn EmailSender>,
    pub push: Option<Arc<dyn PushSender>>,
    pub storage: Arc<dyn ObjectStorage>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub presence: Arc<dyn PresenceService>,
    /// Upper bound for a single provider call
    pub provider_timeout: Duration,
    pub oauth_reprovision: bool,
}

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub identity: IdentityService,
    pub directory: DirectoryService,
    pub cases: CaseService,
    pub notifications: NotificationService,
    pub messaging: MessagingService,
    pub presence: Arc<dyn PresenceService>,
}

impl AppState {
    pub fn new(db: DbConn, providers: Collaborators) -> Self {
        let notifications = NotificationService::new(
            db.clone(),
            providers.email,
            providers.push,
            providers.provider_timeout,
        );

        Self {
            identity: IdentityService::new(
                db.clone(),
                notifications.clone(),
                providers.verifier,
                providers.oauth_reprovision,
            ),
            directory: DirectoryService::new(
                db.clone(),
                providers.storage.clone(),
                notifications.clone(),
            ),
            cases: CaseService::new(db.clone(), providers.storage, notifications.clone()),
            messaging: MessagingService::new(
                db.clone(),
                providers.presence.clone(),
                notifications.clone(),
            ),
            presence: providers.presence,
            notifications,
            db,
        }
    }
}
