//! Email delivery for login passcodes.
//!
//! Uses SMTP via lettre with Askama text and HTML templates. Without SMTP
//! configuration the [`LogMailer`] writes messages to the log instead.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use blood_connect_core::{Email, Passcode};

use crate::config::EmailConfig;

const PASSCODE_SUBJECT: &str = "Your BloodConnect login code";

/// HTML template for the passcode email.
#[derive(Template)]
#[template(path = "email/passcode.html")]
struct PasscodeEmailHtml<'a> {
    code: &'a str,
    ttl_minutes: i64,
}

/// Plain text template for the passcode email.
#[derive(Template)]
#[template(path = "email/passcode.txt")]
struct PasscodeEmailText<'a> {
    code: &'a str,
    ttl_minutes: i64,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Email,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl OutgoingEmail {
    /// Render the login passcode email.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Template` if a template fails to render.
    pub fn passcode(to: &Email, code: &Passcode, ttl_minutes: i64) -> Result<Self, EmailError> {
        let code = code.as_str();
        Ok(Self {
            to: to.clone(),
            subject: PASSCODE_SUBJECT.to_string(),
            text_body: PasscodeEmailText { code, ttl_minutes }.render()?,
            html_body: PasscodeEmailHtml { code, ttl_minutes }.render()?,
        })
    }
}

/// Something that can deliver an email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `email`; fails if the recipient cannot be reached.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// SMTP mailer.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .as_str()
                .parse()
                .map_err(|_| EmailError::InvalidAddress(email.to.to_string()))?)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )?;

        self.transport.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

/// Development mailer that logs messages instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        tracing::warn!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text_body,
            "SMTP not configured - email logged (dev mode)"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_passcode_email_contains_code() {
        let to = Email::parse("donor@example.com").unwrap();
        let email = OutgoingEmail::passcode(&to, &Passcode::from_number(4_821), 10).unwrap();

        assert_eq!(email.subject, PASSCODE_SUBJECT);
        assert!(email.text_body.contains("004821"));
        assert!(email.text_body.contains("10 minutes"));
        assert!(email.html_body.contains("004821"));
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let to = Email::parse("donor@example.com").unwrap();
        let email = OutgoingEmail::passcode(&to, &Passcode::from_number(1), 10).unwrap();
        assert!(LogMailer.send(&email).await.is_ok());
    }
}
