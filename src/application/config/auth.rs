use std::env;

use super::{env_flag, env_opt};

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    /// Lifetime of the forgot-password token that carries the OTP flow
    pub reset_token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    /// Allow social login to provision a fresh account for a blocked or deleted email
    pub oauth_reprovision: bool,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: String,
    pub google_tokeninfo_url: String,
    pub facebook_graph_url: String,
}

fn env_secs(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            access_secret: env::var("CASEDESK_JWT_ACCESS_SECRET")
                .unwrap_or_else(|_| "casedesk-dev-access-secret".to_string()),
            refresh_secret: env::var("CASEDESK_JWT_REFRESH_SECRET")
                .unwrap_or_else(|_| "casedesk-dev-refresh-secret".to_string()),
            access_token_ttl_secs: env_secs("CASEDESK_ACCESS_TOKEN_TTL_SECS", 86_400),
            refresh_token_ttl_secs: env_secs("CASEDESK_REFRESH_TOKEN_TTL_SECS", 2_592_000),
            reset_token_ttl_secs: env_secs("CASEDESK_RESET_TOKEN_TTL_SECS", 600),
            bcrypt_cost: env::var("CASEDESK_BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
            oauth_reprovision: env_flag("CASEDESK_OAUTH_REPROVISION", false),
            admin_email: env_opt("CASEDESK_ADMIN_EMAIL"),
            admin_password: env_opt("CASEDESK_ADMIN_PASSWORD"),
            admin_name: env::var("CASEDESK_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            google_tokeninfo_url: env::var("CASEDESK_GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/tokeninfo".to_string()),
            facebook_graph_url: env::var("CASEDESK_FACEBOOK_GRAPH_URL")
                .unwrap_or_else(|_| "https://graph.facebook.com/me".to_string()),
        }
    }
}
