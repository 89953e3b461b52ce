// OTP email delivery over SMTP

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{MailConfig, OtpConfig};

/// Error types for mail composition and delivery
#[derive(Debug, Error)]
pub enum MailError {
    #[error(transparent)]
    Address(#[from] lettre::address::AddressError),

    #[error(transparent)]
    Message(#[from] lettre::error::Error),

    #[error(transparent)]
    Transport(#[from] lettre::transport::smtp::Error),

    /// Failure reported by a non-SMTP delivery backend
    #[error("{0}")]
    Rejected(String),
}

/// Delivers one-time passcodes to users
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, email: &str, name: &str, code: &str) -> Result<(), MailError>;
}

/// Mailer sending plain-text messages through an SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    ttl_minutes: u64,
}

impl SmtpMailer {
    /// Builds the transport; STARTTLS is used whenever credentials are configured
    pub fn new(mail: &MailConfig, otp: &OtpConfig) -> Result<Self, MailError> {
        let from: Mailbox = mail.from_address.parse()?;

        let transport = match (&mail.smtp_user, &mail.smtp_password) {
            (Some(user), Some(password)) => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.smtp_host)?
                    .port(mail.smtp_port)
                    .credentials(Credentials::new(user.clone(), password.clone()))
                    .build()
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&mail.smtp_host)
                .port(mail.smtp_port)
                .build(),
        };

        Ok(Self {
            transport,
            from,
            ttl_minutes: otp.ttl_minutes,
        })
    }

    fn compose(&self, email: &str, name: &str, code: &str) -> Result<Message, MailError> {
        let address: Address = email.parse()?;
        let to = Mailbox::new(Some(name.to_string()), address);
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain());

        let body = format!(
            "Hello {},\n\n\
             Your one-time passcode is {}. It expires in {} minutes.\n\n\
             If you did not request this code, you can ignore this email.\n",
            name, code, self.ttl_minutes
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your verification code")
            .message_id(Some(message_id))
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(&self, email: &str, name: &str, code: &str) -> Result<(), MailError> {
        let message = self.compose(email, name, code)?;
        let response = self.transport.send(message).await?;
        tracing::debug!(code = ?response.code(), "OTP email accepted by relay");
        Ok(())
    }
}
