pub use sea_orm_migration::prelude::*;

mod m20261018_000001_create_users;
mod m20261018_000002_create_profiles;
mod m20261018_000003_create_cases;
mod m20261018_000004_create_case_records;
mod m20261018_000005_create_messages;
mod m20261018_000006_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261018_000001_create_users::Migration),
            Box::new(m20261018_000002_create_profiles::Migration),
            Box::new(m20261018_000003_create_cases::Migration),
            Box::new(m20261018_000004_create_case_records::Migration),
            Box::new(m20261018_000005_create_messages::Migration),
            Box::new(m20261018_000006_create_notifications::Migration),
        ]
    }
}
