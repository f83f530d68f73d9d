// src/email_sender/mod.rs
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::EmailError;
use crate::models::BulkSendReport;

const SEND_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const FROM_DISPLAY_NAME: &str = "Outreach Agent";

/// Transactional email transport. One connection per send, no pooling, no
/// retries at this layer.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        from: Option<&str>,
    ) -> Result<(), EmailError>;

    /// Sends to each recipient independently, continuing past failures.
    /// Error descriptions keep the order of the recipient list.
    async fn send_bulk(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
        from: Option<&str>,
    ) -> BulkSendReport {
        let mut report = BulkSendReport {
            total: recipients.len(),
            ..Default::default()
        };
        info!("Starting bulk email send to {} recipients", recipients.len());

        for recipient in recipients {
            match self.send(recipient, subject, body, from).await {
                Ok(()) => report.successful += 1,
                Err(e) => {
                    error!("Error in bulk send to {}: {}", recipient, e);
                    report.failed += 1;
                    report.errors.push(format!("Error sending to {recipient}: {e}"));
                }
            }
        }

        info!(
            "Bulk email completed: {} successful, {} failed",
            report.successful, report.failed
        );
        report
    }

    async fn check_connectivity(&self) -> bool;
}

/// Recipient, subject, and body are required; the recipient must at least
/// look like an address. Checked before any connection is opened.
fn validate_send_input(to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
    if to.is_empty() || subject.is_empty() || body.is_empty() {
        return Err(EmailError::InvalidInput(
            "recipient, subject, and body are required".to_string(),
        ));
    }
    if !to.contains('@') {
        return Err(EmailError::InvalidInput(format!(
            "invalid recipient email address: {to}"
        )));
    }
    Ok(())
}

pub struct SmtpMailer {
    server: String,
    port: u16,
    username: String,
    password: String,
}

impl SmtpMailer {
    pub fn new(server: String, port: u16, username: String, password: String) -> Self {
        info!(
            "Email sender initialized for {} via {}:{}",
            username, server, port
        );
        Self {
            server,
            port,
            username,
            password,
        }
    }

    pub fn server_info(&self) -> String {
        format!("{}:{} as {} (STARTTLS)", self.server, self.port, self.username)
    }

    fn transport(
        &self,
        timeout: Duration,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.server)?
                .port(self.port)
                .credentials(Credentials::new(
                    self.username.clone(),
                    self.password.clone(),
                ))
                .timeout(Some(timeout))
                .build(),
        )
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        from: Option<&str>,
    ) -> Result<(), EmailError> {
        validate_send_input(to, subject, body)?;

        info!("Sending email to {}", to);
        let from_address = from.unwrap_or(&self.username);
        let from_mailbox: Mailbox = format!("{FROM_DISPLAY_NAME} <{from_address}>").parse()?;

        let message = Message::builder()
            .from(from_mailbox)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        // Fresh connection per send; dropped when this call returns.
        let mailer = self.transport(SEND_TIMEOUT)?;
        mailer.send(message).await?;

        info!("Successfully sent email to {}", to);
        Ok(())
    }

    async fn check_connectivity(&self) -> bool {
        let mailer = match self.transport(PROBE_TIMEOUT) {
            Ok(mailer) => mailer,
            Err(e) => {
                error!("SMTP connection test failed: {}", e);
                return false;
            }
        };

        match mailer.test_connection().await {
            Ok(true) => {
                info!("SMTP connection test successful");
                true
            }
            Ok(false) => {
                warn!("SMTP server refused the connection test");
                false
            }
            Err(e) => {
                error!("SMTP connection test failed: {}", e);
                false
            }
        }
    }
}
