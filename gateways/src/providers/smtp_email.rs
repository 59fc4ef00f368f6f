//! SMTP email transport using Lettre.

use crate::error::{GatewayError, Result};
use crate::providers::notification::{DeliveryReceipt, EmailMessage, EmailTransport};
use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP connection settings.
///
/// - `server`: SMTP server address (e.g., "smtp.gmail.com")
/// - `port`: usually 587 for STARTTLS, 465 for implicit TLS
/// - `username`/`password`: SMTP authentication
/// - `from_email`/`from_name`: sender identity
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server address.
    pub server: String,
    /// SMTP server port.
    pub port: u16,
    /// Authentication user.
    pub username: String,
    /// Authentication password.
    pub password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
}

/// SMTP transport using Lettre.
///
/// Sends real emails, suitable for production use.
#[derive(Clone)]
pub struct SmtpEmailTransport {
    server: String,
    port: u16,
    credentials: Credentials,
    from: lettre::message::Mailbox,
}

impl SmtpEmailTransport {
    /// Create a new SMTP transport.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the sender address is invalid.
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| GatewayError::Configuration(format!("Invalid from address: {e}")))?;
        Ok(Self {
            server: config.server,
            port: config.port,
            credentials: Credentials::new(config.username, config.password),
            from,
        })
    }

    /// Build SMTP transport for sending emails.
    ///
    /// Creates a new transport for each email to avoid connection pooling issues.
    fn build_transport(&self) -> Result<SmtpTransport> {
        let transport = SmtpTransport::relay(&self.server)
            .map_err(|e| GatewayError::Delivery(format!("SMTP relay error: {e}")))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl EmailTransport for SmtpEmailTransport {
    async fn deliver(&self, message: EmailMessage) -> Result<DeliveryReceipt> {
        let to = message
            .to
            .parse()
            .map_err(|e| GatewayError::Delivery(format!("Invalid to address: {e}")))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(message.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(message.html),
                    ),
            )
            .map_err(|e| GatewayError::Delivery(format!("Failed to build email: {e}")))?;

        let mailer = self.build_transport()?;

        let response = tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| GatewayError::Delivery(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| GatewayError::Delivery(format!("Email task failed: {e}")))??;

        let message_id = response
            .first_line()
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);
        tracing::debug!(message_id = %message_id, "Email accepted by SMTP relay");
        Ok(DeliveryReceipt { message_id })
    }
}
