//! Test helpers for unit tests inside the crate.

use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::migrations::Migrator;
use crate::models::user::{self, LoginMethod, Role};

/// Create an in-memory SQLite database with every migration applied
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// A verified, active user model that is not stored anywhere
pub fn sample_user(id: i64, role: Role) -> user::Model {
    let now = Utc::now();
    user::Model {
        id,
        name: format!("User {}", id),
        email: Some(format!("user{}@example.com", id)),
        hashed_password: None,
        role,
        login_method: LoginMethod::Email,
        is_deleted: false,
        is_blocked: false,
        is_logged_in: true,
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
