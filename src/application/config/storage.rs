use super::env_opt;

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Object store base URL that accepts `PUT`/`DELETE` on `{base}/{key}`
    pub base_url: Option<String>,
    /// Public URL prefix handed back to clients (defaults to `base_url`)
    pub public_url: Option<String>,
    pub token: Option<String>,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_opt("CASEDESK_STORAGE_URL"),
            public_url: env_opt("CASEDESK_STORAGE_PUBLIC_URL"),
            token: env_opt("CASEDESK_STORAGE_TOKEN"),
        }
    }
}
