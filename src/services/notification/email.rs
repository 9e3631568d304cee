use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

use super::{EmailSender, SendResult};
use crate::application::config::email::EmailConfig;
use crate::error::{AppError, Result};

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    from_name: String,
}

impl SmtpEmailSender {
    /// Build a sender from configuration; `None` when SMTP is not configured
    pub fn from_config(config: &EmailConfig, timeout: Duration) -> Result<Option<Self>> {
        let Some(host) = config.smtp_host.as_deref() else {
            return Ok(None);
        };

        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
                .port(config.smtp_port)
                .credentials(creds)
                .timeout(Some(timeout))
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(config.smtp_port)
                .credentials(creds)
                .timeout(Some(timeout))
                .build()
        };

        Ok(Some(Self {
            transport,
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        }))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> SendResult {
        let from = format!("{} <{}>", self.from_name, self.from_address);

        let to_mailbox = match to.parse() {
            Ok(mbox) => mbox,
            Err(_) => return SendResult::failed("Invalid recipient email address"),
        };

        let from_mailbox = match from.parse() {
            Ok(mbox) => mbox,
            Err(_) => match self.from_address.parse() {
                Ok(mbox) => mbox,
                Err(_) => return SendResult::failed("Invalid from email address"),
            },
        };

        let email = match Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
        {
            Ok(email) => email,
            Err(e) => return SendResult::failed(format!("Failed to build email: {}", e)),
        };

        match self.transport.send(email).await {
            Ok(_) => SendResult::ok(),
            Err(e) => SendResult::failed(format!("Failed to send email: {}", e)),
        }
    }
}

/// Stand-in used when no SMTP host is configured; every send reports failure
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> SendResult {
        tracing::warn!(recipient = %to, subject = %subject, "Email transport not configured, dropping email");
        SendResult::failed("Email transport not configured")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_host_is_none() {
        let config = EmailConfig {
            smtp_host: None,
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_address: "no-reply@casedesk.local".to_string(),
            from_name: "Casedesk".to_string(),
            use_tls: true,
        };

        let sender = SmtpEmailSender::from_config(&config, Duration::from_secs(5)).unwrap();
        assert!(sender.is_none());
    }

    #[tokio::test]
    async fn test_disabled_sender_reports_failure() {
        let result = DisabledEmailSender
            .send("a@example.com", "Hello", "<p>hi</p>")
            .await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_rejected_before_transport() {
        let config = EmailConfig {
            smtp_host: Some("localhost".to_string()),
            smtp_port: 2525,
            username: "u".to_string(),
            password: "p".to_string(),
            from_address: "no-reply@casedesk.local".to_string(),
            from_name: "Casedesk".to_string(),
            use_tls: false,
        };
        let sender = SmtpEmailSender::from_config(&config, Duration::from_secs(1))
            .unwrap()
            .unwrap();

        let result = sender.send("not-an-address", "Hi", "<p>x</p>").await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Invalid recipient email address")
        );
    }
}
