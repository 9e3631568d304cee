use super::env_opt;

#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Push gateway endpoint; fan-out is skipped when unset
    pub endpoint: Option<String>,
    pub server_key: Option<String>,
}

impl PushConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env_opt("CASEDESK_PUSH_ENDPOINT"),
            server_key: env_opt("CASEDESK_PUSH_SERVER_KEY"),
        }
    }
}
