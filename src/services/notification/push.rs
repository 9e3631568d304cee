use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{PushSender, SendResult};
use crate::application::config::push::PushConfig;
use crate::error::Result;

/// Push gateway client speaking the FCM-style HTTP send API
pub struct HttpPushSender {
    client: reqwest::Client,
    endpoint: String,
    server_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(default)]
    failure: u32,
}

impl HttpPushSender {
    /// `None` when no endpoint is configured
    pub fn from_config(config: &PushConfig, timeout: Duration) -> Result<Option<Self>> {
        let Some(endpoint) = config.endpoint.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Some(Self {
            client,
            endpoint,
            server_key: config.server_key.clone(),
        }))
    }
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send_to_token(&self, token: &str, title: &str, body: &str) -> SendResult {
        let payload = serde_json::json!({
            "to": token,
            "notification": {
                "title": title,
                "body": body,
            },
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.server_key {
            request = request.header("Authorization", format!("key={}", key));
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return SendResult::failed(format!("Push request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return SendResult::failed(format!("Push gateway returned {}", status));
        }

        // The gateway answers 200 with a per-token failure count for dead registrations
        match response.json::<GatewayResponse>().await {
            Ok(body) if body.failure > 0 => SendResult::failed("Token rejected by push gateway"),
            _ => SendResult::ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_endpoint_is_none() {
        let config = PushConfig {
            endpoint: None,
            server_key: Some("key".to_string()),
        };
        assert!(HttpPushSender::from_config(&config, Duration::from_secs(1))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_from_config_keeps_endpoint_and_key() {
        let config = PushConfig {
            endpoint: Some("https://push.example.test/send".to_string()),
            server_key: Some("key".to_string()),
        };
        let sender = HttpPushSender::from_config(&config, Duration::from_secs(1))
            .unwrap()
            .unwrap();
        assert_eq!(sender.endpoint, "https://push.example.test/send");
        assert_eq!(sender.server_key.as_deref(), Some("key"));
    }
}
