//! services/relay/src/mailer.rs
//!
//! Outbound delivery. The route talks to a [`Mailer`]; production uses SMTP.

use crate::{config::RelayConfig, error::MailError};
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Deserialize;
use tracing::info;

/// One message as posted to `/api/send-email`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Builds the multipart text and HTML message sent from `from`.
pub fn build_message(from: &str, email: &OutgoingEmail) -> Result<Message, MailError> {
    Ok(Message::builder()
        .from(parse_mailbox(from)?)
        .to(parse_mailbox(&email.to)?)
        .subject(email.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))?)
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Implicit-TLS transport signed in as the configured mail account.
    pub fn new(config: &RelayConfig) -> Result<Self, lettre::transport::smtp::Error> {
        let creds = Credentials::new(config.email_user.clone(), config.email_pass.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        info!(host = %config.smtp_host, port = config.smtp_port, "SMTP transport configured");
        Ok(Self {
            transport,
            from: config.email_user.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(&self.from, email)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            subject: "New comment on Blues Guitar".to_string(),
            text: "A student commented".to_string(),
            html: "<p>A student commented</p>".to_string(),
        }
    }

    #[test]
    fn builds_multipart_message() {
        let message = build_message("school@example.com", &email("tutor@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: tutor@example.com"));
        assert!(raw.contains("Subject: New comment on Blues Guitar"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("<p>A student commented</p>"));
    }

    #[test]
    fn rejects_bad_recipient() {
        let err = build_message("school@example.com", &email("not an address")).unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress { ref address, .. } if address == "not an address"));
    }
}
