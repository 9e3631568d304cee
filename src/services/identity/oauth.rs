//! Social sign-in assertion checks

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::auth::AuthConfig;
use crate::error::{AppError, Result};
use crate::models::user::LoginMethod;

/// Identity confirmed by an external provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: String,
    pub email_verified: bool,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, provider: LoginMethod, assertion: &str) -> Result<VerifiedIdentity>;
}

#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    email: Option<String>,
    name: Option<String>,
    /// Google sends this as the string "true" in tokeninfo responses
    #[serde(default)]
    email_verified: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct FacebookMe {
    email: Option<String>,
    name: Option<String>,
}

fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Verifies Google id tokens and Facebook access tokens against the provider APIs
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    google_tokeninfo_url: String,
    facebook_graph_url: String,
}

impl HttpIdentityVerifier {
    pub fn from_config(config: &AuthConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            google_tokeninfo_url: config.google_tokeninfo_url.clone(),
            facebook_graph_url: config.facebook_graph_url.clone(),
        })
    }

    async fn verify_google(&self, id_token: &str) -> Result<VerifiedIdentity> {
        let response = self
            .client
            .get(&self.google_tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Google verification failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized("Invalid Google credential".to_string()));
        }

        let info: GoogleTokenInfo = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Unexpected Google response: {}", e)))?;

        let email = info
            .email
            .ok_or_else(|| AppError::Unauthorized("Google account has no email".to_string()))?;

        Ok(VerifiedIdentity {
            name: info.name.unwrap_or_else(|| email.clone()),
            email_verified: truthy(&info.email_verified),
            email,
        })
    }

    async fn verify_facebook(&self, access_token: &str) -> Result<VerifiedIdentity> {
        let response = self
            .client
            .get(&self.facebook_graph_url)
            .query(&[("fields", "id,name,email"), ("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Facebook verification failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(
                "Invalid Facebook credential".to_string(),
            ));
        }

        let me: FacebookMe = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Unexpected Facebook response: {}", e)))?;

        // Graph only returns confirmed addresses
        let email = me
            .email
            .ok_or_else(|| AppError::Unauthorized("Facebook account has no email".to_string()))?;

        Ok(VerifiedIdentity {
            name: me.name.unwrap_or_else(|| email.clone()),
            email_verified: true,
            email,
        })
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, provider: LoginMethod, assertion: &str) -> Result<VerifiedIdentity> {
        match provider {
            LoginMethod::Google => self.verify_google(assertion).await,
            LoginMethod::Facebook => self.verify_facebook(assertion).await,
            LoginMethod::Email => Err(AppError::BadRequest(
                "Email login does not use an identity provider".to_string(),
            )),
        }
    }
}
