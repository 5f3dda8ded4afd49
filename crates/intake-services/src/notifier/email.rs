//! SMTP notifier that mails the submission summary to the operator.

use async_trait::async_trait;
use intake_core::models::SubmissionRecord;
use intake_core::{NotifyConfig, NotifyError};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

use super::render::{render_html, render_text};
use super::Notifier;

/// Sends the HTML summary (with a plain-text alternative) over SMTP.
#[derive(Clone)]
pub struct EmailNotifier {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    recipient: Mailbox,
    subject: String,
}

impl EmailNotifier {
    /// Create the notifier from config. Sender and recipient are required.
    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| NotifyError::NotConfigured("SMTP_HOST is not set".to_string()))?;
        let from = parse_mailbox(config.from.as_deref(), "NOTIFY_FROM")?;
        let recipient = parse_mailbox(config.recipient.as_deref(), "NOTIFY_RECIPIENT")?;
        let port = config.smtp_port;
        let credentials = match (&config.smtp_user, &config.smtp_password) {
            (Some(u), Some(p)) => Some(Credentials::new(u.clone(), p.clone())),
            _ => None,
        };

        let mailer = if config.smtp_tls {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| NotifyError::NotConfigured(e.to_string()))?
                .port(port);
            let b = match credentials {
                Some(c) => b.credentials(c),
                None => b,
            };
            tracing::info!(
                host = %host,
                port = port,
                "Email notifier initialized (SMTP with STARTTLS)"
            );
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = match credentials {
                Some(c) => b.credentials(c),
                None => b,
            };
            tracing::info!(host = %host, port = port, "Email notifier initialized (SMTP)");
            b.build()
        };

        Ok(Self {
            mailer: Arc::new(mailer),
            from,
            recipient,
            subject: config.subject.clone(),
        })
    }

    fn build_message(&self, records: &[SubmissionRecord]) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.recipient.clone())
            .subject(self.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                render_text(records),
                render_html(records),
            ))
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

fn parse_mailbox(value: Option<&str>, variable: &str) -> Result<Mailbox, NotifyError> {
    let value = value.ok_or_else(|| NotifyError::NotConfigured(format!("{} is not set", variable)))?;
    value
        .parse()
        .map_err(|e| NotifyError::Address(format!("{} '{}': {}", variable, value, e)))
}

#[async_trait]
impl Notifier for EmailNotifier {
    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    async fn send(&self, records: &[SubmissionRecord]) -> Result<(), NotifyError> {
        if records.is_empty() {
            return Err(NotifyError::Empty);
        }

        let email = self.build_message(records)?;
        let start = std::time::Instant::now();

        self.mailer.send(email).await.map_err(|e| {
            tracing::error!(
                error = %e,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Notification email delivery failed"
            );
            NotifyError::Delivery(e.to_string())
        })?;

        tracing::info!(
            count = records.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Notification email sent"
        );
        Ok(())
    }
}
