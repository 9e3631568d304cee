use std::env;

use super::{env_flag, env_opt};

/// SMTP settings; email delivery is disabled when no host is configured
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            smtp_host: env_opt("CASEDESK_SMTP_HOST"),
            smtp_port: env::var("CASEDESK_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username: env::var("CASEDESK_SMTP_USERNAME").unwrap_or_default(),
            password: env::var("CASEDESK_SMTP_PASSWORD").unwrap_or_default(),
            from_address: env::var("CASEDESK_SMTP_FROM")
                .unwrap_or_else(|_| "no-reply@casedesk.local".to_string()),
            from_name: env::var("CASEDESK_SMTP_FROM_NAME").unwrap_or_else(|_| "Casedesk".to_string()),
            use_tls: env_flag("CASEDESK_SMTP_TLS", true),
        }
    }
}
