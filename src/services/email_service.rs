use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::auth::ApiError;
use crate::config::SmtpConfig;

/// Outbound transactional mail. In dev mode nothing leaves the process;
/// the message is logged instead, links included, so flows stay testable
/// without an SMTP account.
#[derive(Clone)]
pub struct EmailService {
    config: SmtpConfig,
    public_base_url: String,
    dev_mode: bool,
}

impl EmailService {
    pub fn new(config: SmtpConfig, public_base_url: String, dev_mode: bool) -> Self {
        Self {
            config,
            public_base_url,
            dev_mode,
        }
    }

    pub fn send_verification_email(&self, to: &str, token: &str) -> Result<(), ApiError> {
        let link = format!("{}/auth/verify-email?token={}", self.public_base_url, token);
        let body = format!(
            "Welcome to MindWell!\n\nPlease verify your email address by visiting:\n{link}\n\n\
             The link expires in 60 minutes.",
        );
        self.send(to, "Verify your MindWell account", body)
    }

    pub fn send_password_reset_email(&self, to: &str, token: &str) -> Result<(), ApiError> {
        let link = format!(
            "{}/auth/reset-password?token={}",
            self.public_base_url, token
        );
        let body = format!(
            "A password reset was requested for your MindWell account.\n\n\
             Reset it by visiting:\n{link}\n\n\
             The link expires in 15 minutes. If you did not ask for this, ignore this email.",
        );
        self.send(to, "Reset your MindWell password", body)
    }

    fn send(&self, to: &str, subject: &str, body: String) -> Result<(), ApiError> {
        if self.dev_mode {
            tracing::info!(to = %to, subject = %subject, body = %body, "dev mode, email not sent");
            return Ok(());
        }

        let message = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|err| {
                        ApiError::Internal(anyhow::anyhow!("invalid sender address: {err}"))
                    })?,
            )
            .to(to.parse().map_err(|err| {
                ApiError::validation(format!("invalid recipient address: {err}"))
            })?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|err| ApiError::Internal(anyhow::anyhow!("building email failed: {err}")))?;

        let mailer = SmtpTransport::starttls_relay(&self.config.host)
            .map_err(|err| ApiError::Internal(anyhow::anyhow!("smtp relay setup failed: {err}")))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        mailer
            .send(&message)
            .map_err(|err| ApiError::Internal(anyhow::anyhow!("sending email failed: {err}")))?;

        tracing::info!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}
