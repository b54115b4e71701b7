use crate::config::Config;
use crate::models::quiz::EmailStatus;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

const EMAIL_SUBJECT: &str = "Your AI Skill Bridge Quiz Link";

/// Sends the quiz link over SMTP. Delivery is one attempt per transport:
/// STARTTLS on the submission port first, then implicit TLS on the SSL
/// port. The outcome is returned as an `EmailStatus`, never as an error.
#[derive(Clone)]
pub struct EmailService {
    host: Option<String>,
    port: u16,
    ssl_port: u16,
    user: Option<String>,
    pass: Option<String>,
    sender: String,
    frontend_base_url: String,
}

impl EmailService {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            ssl_port: config.smtp_ssl_port,
            user: config.smtp_user.clone(),
            pass: config.smtp_pass.clone(),
            sender: config.smtp_sender(),
            frontend_base_url: config.frontend_base_url.clone(),
        }
    }

    pub fn configured(&self) -> bool {
        self.host.is_some() && self.user.is_some() && self.pass.is_some()
    }

    pub async fn send_quiz_link(&self, to_email: &str, quiz_id: &str) -> EmailStatus {
        let (Some(host), Some(user), Some(pass)) = (&self.host, &self.user, &self.pass) else {
            tracing::info!("SMTP not configured; skipping send");
            return EmailStatus::not_configured();
        };

        let quiz_url = format!(
            "{}/quiz/{}",
            self.frontend_base_url.trim_end_matches('/'),
            quiz_id
        );

        let message = match self.build_message(to_email, &quiz_url) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "could not build quiz email");
                return EmailStatus::failed(e);
            }
        };

        let creds = Credentials::new(user.clone(), pass.clone());

        let starttls = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map(|builder| {
                builder
                    .port(self.port)
                    .credentials(creds.clone())
                    .timeout(Some(Duration::from_secs(20)))
                    .build()
            });
        let starttls_err = match starttls {
            Ok(mailer) => match mailer.send(message.clone()).await {
                Ok(_) => {
                    tracing::info!(to = to_email, quiz_id, "sent quiz link");
                    return EmailStatus::sent();
                }
                Err(e) => e.to_string(),
            },
            Err(e) => e.to_string(),
        };

        // STARTTLS path failed; retry once over implicit TLS.
        tracing::warn!(error = %starttls_err, "STARTTLS send failed; trying SSL port");
        let ssl = AsyncSmtpTransport::<Tokio1Executor>::relay(host).map(|builder| {
            builder
                .port(self.ssl_port)
                .credentials(creds)
                .timeout(Some(Duration::from_secs(20)))
                .build()
        });
        match ssl {
            Ok(mailer) => match mailer.send(message).await {
                Ok(_) => {
                    tracing::info!(to = to_email, quiz_id, "sent quiz link over SSL");
                    EmailStatus::sent()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "quiz email failed");
                    EmailStatus::failed(e.to_string())
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "quiz email failed");
                EmailStatus::failed(e.to_string())
            }
        }
    }

    fn build_message(&self, to_email: &str, quiz_url: &str) -> Result<Message, String> {
        let from: Mailbox = self.sender.parse().map_err(|_| {
            format!("invalid sender address: {}", self.sender)
        })?;
        let to: Mailbox = to_email
            .parse()
            .map_err(|_| format!("invalid recipient address: {}", to_email))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(EMAIL_SUBJECT)
            .body(format!(
                "Your quiz is ready. Click the link to start: {}\n\nThis link opens your personalized enrollment quiz. Good luck!",
                quiz_url
            ))
            .map_err(|e| e.to_string())
    }
}
