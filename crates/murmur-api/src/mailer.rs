use futures_util::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay returned status {0}")]
    Rejected(u16),
}

/// Outbound email used for verification codes.
pub trait Mailer: Send + Sync {
    fn send_verification<'a>(
        &'a self,
        email: &'a str,
        username: &'a str,
        code: &'a str,
    ) -> BoxFuture<'a, Result<(), MailError>>;
}

pub const VERIFICATION_SUBJECT: &str = "Verification Code";

pub fn render_verification_email(username: &str, code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{VERIFICATION_SUBJECT}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Hello {username},</h2>
    <p>Thank you for registering. Please use the following verification code to complete your registration:</p>
    <p style="font-size: 24px; font-weight: bold; color: #007bff;">{code}</p>
    <p>If you did not request this code, please ignore this email.</p>
  </div>
</body>
</html>"#
    )
}

/// Sends mail through an HTTP relay that accepts `{from, to, subject, html}`.
pub struct HttpMailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct OutboundMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

impl Mailer for HttpMailer {
    fn send_verification<'a>(
        &'a self,
        email: &'a str,
        username: &'a str,
        code: &'a str,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let mail = OutboundMail {
                from: &self.from,
                to: email,
                subject: VERIFICATION_SUBJECT,
                html: render_verification_email(username, code),
            };

            let resp = self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&mail)
                .send()
                .await?;

            if !resp.status().is_success() {
                warn!("Mail relay rejected message for {}: {}", username, resp.status());
                return Err(MailError::Rejected(resp.status().as_u16()));
            }

            info!("Verification email sent to {}", username);
            Ok(())
        })
    }
}

/// Development mailer: writes the code to the log instead of sending it.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_verification<'a>(
        &'a self,
        email: &'a str,
        username: &'a str,
        code: &'a str,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            info!(
                "No mail relay configured; verification code for {} <{}> is {}",
                username, email, code
            );
            Ok(())
        })
    }
}
