//! Console email transport for development.

use crate::error::Result;
use crate::providers::notification::{DeliveryReceipt, EmailMessage, EmailTransport};
use async_trait::async_trait;
use tracing::info;

/// Console email transport.
///
/// Logs emails instead of sending them. Selected automatically when no SMTP
/// server is configured.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailTransport;

impl ConsoleEmailTransport {
    /// Create a new console transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailTransport for ConsoleEmailTransport {
    async fn deliver(&self, message: EmailMessage) -> Result<DeliveryReceipt> {
        let message_id = format!("console-{}", uuid::Uuid::new_v4());
        info!(
            message_id = %message_id,
            to = %message.to,
            subject = %message.subject,
            "📧 Email (Development Mode)"
        );
        println!("\n──────────────────────── EMAIL ────────────────────────");
        println!("To: {}", message.to);
        println!("Subject: {}", message.subject);
        println!("───────────────────────────────────────────────────────");
        println!("{}", message.text);
        println!("───────────────────────────────────────────────────────\n");
        Ok(DeliveryReceipt { message_id })
    }
}
