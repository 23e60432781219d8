//! Best-effort transactional email.
//!
//! Every message in a flow is rendered and sent independently. Failures
//! (template, address, transport) are logged and dropped; the request that
//! triggered them carries on regardless.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::{authentication::Credentials, PoolConfig},
    Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use serde_json::Value;
use suzstar_common::AppError;

use crate::config::{EmailConfig, SmtpEncryption};
use crate::templates::TemplateEngine;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, AppError> {
        let builder = match config.smtp_encryption {
            SmtpEncryption::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| AppError::Internal(format!("SMTP relay error: {}", e)))?,
            SmtpEncryption::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .map_err(|e| AppError::Internal(format!("SMTP relay error: {}", e)))?
            }
            SmtpEncryption::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            }
        };

        let mut builder = builder
            .port(config.smtp_port)
            .pool_config(PoolConfig::new().max_size(10));
        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        let address: Address = config
            .from_email
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        Ok(Self {
            transport: builder.build(),
            from: Mailbox::new(Some(config.from_name.clone()), address),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| AppError::Validation(format!("Invalid to address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to send email: {}", e)))?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

/// Used when `EMAIL_ENABLED` is off.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), AppError> {
        tracing::info!(to = %to, subject = %subject, "Email disabled, skipping");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Keeps messages in memory instead of sending them.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<SentEmail>>,
    reject: Option<String>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose transport refuses messages to `address`.
    pub fn rejecting(address: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: Some(address.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        if self.reject.as_deref() == Some(to) {
            return Err(AppError::ExternalService(format!("Mailbox {} unavailable", to)));
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| AppError::Internal("Mailer lock poisoned".to_string()))?;
        sent.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub template: &'static str,
    pub context: Value,
}

impl OutgoingEmail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, template: &'static str, context: Value) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            template,
            context,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    templates: Arc<TemplateEngine>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, templates: Arc<TemplateEngine>) -> Self {
        Self { mailer, templates }
    }

    pub fn from_config(config: &EmailConfig, templates: Arc<TemplateEngine>) -> Result<Self, AppError> {
        let mailer: Arc<dyn Mailer> = if config.enabled {
            Arc::new(SmtpMailer::new(config)?)
        } else {
            tracing::warn!("Email delivery disabled; notifications will be logged only");
            Arc::new(DisabledMailer)
        };
        Ok(Self::new(mailer, templates))
    }

    pub async fn dispatch(&self, emails: Vec<OutgoingEmail>) -> DispatchReport {
        let mut report = DispatchReport::default();
        for email in emails {
            report.attempted += 1;
            match self.deliver(&email).await {
                Ok(()) => report.delivered += 1,
                Err(e) => tracing::warn!(
                    to = %email.to,
                    template = email.template,
                    error = %e,
                    "Notification not delivered"
                ),
            }
        }
        report
    }

    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let body = self.templates.render_email(email.template, &email.context)?;
        self.mailer.send(&email.to, &email.subject, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notifier(mailer: Arc<MemoryMailer>) -> Notifier {
        Notifier::new(mailer, Arc::new(TemplateEngine::new().unwrap()))
    }

    #[tokio::test]
    async fn failed_message_does_not_stop_the_next() {
        let mailer = Arc::new(MemoryMailer::rejecting("client@example.com"));
        let report = notifier(mailer.clone())
            .dispatch(vec![
                OutgoingEmail::new(
                    "client@example.com",
                    "Welcome to Suzstar Counseling Newsletter",
                    "newsletter_welcome",
                    json!({"first_name": "Wanjiru"}),
                ),
                OutgoingEmail::new(
                    "admin@example.com",
                    "New Testimonial Awaiting Approval",
                    "admin_testimonial_notification",
                    json!({
                        "client_name": "Wanjiru K",
                        "client_initials": "W.K.",
                        "location": "Nakuru",
                        "rating": 5,
                        "testimonial": "Very supportive."
                    }),
                ),
            ])
            .await;

        assert_eq!(report, DispatchReport { attempted: 2, delivered: 1 });
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "admin@example.com");
        assert!(sent[0].body.contains("W.K."));
    }

    #[tokio::test]
    async fn template_errors_are_swallowed() {
        let mailer = Arc::new(MemoryMailer::new());
        let report = notifier(mailer.clone())
            .dispatch(vec![OutgoingEmail::new(
                "client@example.com",
                "Appointment Request Received - Suzstar Counseling",
                "appointment_confirmation",
                json!({"name": "Otieno", "preferred_date": null}),
            )])
            .await;

        assert_eq!(report.attempted, 1);
        assert_eq!(report.delivered, 0);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn welcome_falls_back_to_generic_greeting() {
        let mailer = Arc::new(MemoryMailer::new());
        notifier(mailer.clone())
            .dispatch(vec![OutgoingEmail::new(
                "reader@example.com",
                "Welcome to Suzstar Counseling Newsletter",
                "newsletter_welcome",
                json!({"first_name": ""}),
            )])
            .await;
        assert!(mailer.sent()[0].body.starts_with("Dear there,"));
    }
}
