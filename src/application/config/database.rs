use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://casedesk.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    /// Pool ceiling for Postgres; SQLite always runs on a single connection
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("CASEDESK_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: env::var("CASEDESK_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(10),
        }
    }
}

/// Storage flavour behind a connection URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    SqliteMemory,
    SqliteFile,
    Postgres,
}

impl DatabaseKind {
    pub fn from_url(url: &str) -> Self {
        if !url.starts_with("sqlite:") {
            return Self::Postgres;
        }
        if url.contains(":memory:") || url.contains("mode=memory") {
            Self::SqliteMemory
        } else {
            Self::SqliteFile
        }
    }

    /// Pool size for this backend.
    ///
    /// Case sagas keep a write transaction open across storage uploads, so a
    /// SQLite pool larger than one only trades queueing for `SQLITE_BUSY`.
    /// An in-memory database also lives and dies with its connection.
    pub fn pool_size(self, configured: u32) -> u32 {
        match self {
            Self::SqliteMemory | Self::SqliteFile => 1,
            Self::Postgres => configured.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url_is_a_sqlite_file() {
        assert_eq!(
            DatabaseKind::from_url(DEFAULT_DATABASE_URL),
            DatabaseKind::SqliteFile
        );
    }

    #[test]
    fn test_kind_from_url() {
        assert_eq!(DatabaseKind::from_url("sqlite::memory:"), DatabaseKind::SqliteMemory);
        assert_eq!(
            DatabaseKind::from_url("sqlite://file.db?mode=memory"),
            DatabaseKind::SqliteMemory
        );
        assert_eq!(
            DatabaseKind::from_url("postgres://casedesk@localhost/casedesk"),
            DatabaseKind::Postgres
        );
    }

    #[test]
    fn test_sqlite_pool_is_single_connection() {
        assert_eq!(DatabaseKind::SqliteFile.pool_size(10), 1);
        assert_eq!(DatabaseKind::SqliteMemory.pool_size(10), 1);
        assert_eq!(DatabaseKind::Postgres.pool_size(25), 25);
        assert_eq!(DatabaseKind::Postgres.pool_size(0), 1);
    }
}
