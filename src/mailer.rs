use lettre::transport::smtp::authentication::Credentials;
use lettre::SmtpTransport;
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("smtp server '{0}' rejected the connection check")]
    Rejected(String),
}

/// Builds the STARTTLS transport and authenticates against the relay once,
/// so bad credentials surface at startup instead of on the first send.
pub fn connect(config: &SmtpConfig) -> Result<SmtpTransport, MailerError> {
    let transport = SmtpTransport::starttls_relay(&config.hostname)?
        .port(config.tls_port)
        .credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ))
        .build();

    if !transport.test_connection()? {
        return Err(MailerError::Rejected(config.hostname.clone()));
    }
    Ok(transport)
}
