// One-time passcode issuance

use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

use crate::services::mail::{MailError, Mailer};

/// Failure of one of the OTP collaborators; displays the collaborator's message
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("{0}")]
    Generation(String),

    #[error(transparent)]
    Delivery(#[from] MailError),
}

/// Produces a passcode for an identity
pub trait OtpGenerator: Send + Sync {
    fn generate(&self, email: &str) -> Result<String, OtpError>;
}

/// Uniformly random numeric passcodes
pub struct RandomOtpGenerator {
    length: usize,
}

impl RandomOtpGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl OtpGenerator for RandomOtpGenerator {
    fn generate(&self, _email: &str) -> Result<String, OtpError> {
        if self.length == 0 {
            return Err(OtpError::Generation(
                "OTP length must be at least one digit".to_string(),
            ));
        }

        let mut rng = rand::thread_rng();
        Ok((0..self.length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect())
    }
}

/// Generates a passcode and hands it to the mailer
#[derive(Clone)]
pub struct OtpService {
    generator: Arc<dyn OtpGenerator>,
    mailer: Arc<dyn Mailer>,
}

impl OtpService {
    pub fn new(generator: Arc<dyn OtpGenerator>, mailer: Arc<dyn Mailer>) -> Self {
        Self { generator, mailer }
    }

    /// Issues a fresh code for `email`. Every call generates and sends a new one.
    pub async fn issue(&self, email: &str) -> Result<(), OtpError> {
        let code = self.generator.generate(email)?;
        self.mailer.send_otp(email, "User", &code).await?;
        tracing::info!(email, "OTP email dispatched");
        Ok(())
    }
}
