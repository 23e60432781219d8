use serde_json::json;
use sqlx::PgPool;
use suzstar_common::AppError;
use suzstar_database::ContactMessage;

use super::{AppState, SettingsService};
use crate::forms::NewContactMessage;
use crate::notifications::{DispatchReport, Notifier, OutgoingEmail};

pub struct ContactService {
    db_pool: PgPool,
    notifier: Notifier,
    settings: SettingsService,
}

impl ContactService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            notifier: state.notifier.clone(),
            settings: SettingsService::new(state),
        }
    }

    /// Saves the message unread, then alerts staff and acknowledges the sender.
    pub async fn submit(&self, message: NewContactMessage) -> Result<(ContactMessage, DispatchReport), AppError> {
        let saved = sqlx::query_as::<_, ContactMessage>(
            "INSERT INTO contact_messages (name, email, phone, subject, message) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.phone)
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(&self.db_pool)
        .await
        .map_err(AppError::from_db)?;

        tracing::info!(message_id = saved.id, "Contact message received");

        let context = json!({
            "name": saved.name,
            "email": saved.email,
            "phone": saved.phone,
            "subject": saved.subject,
            "message": saved.message,
        });
        let admin_email = self.settings.alert_recipient().await;
        let report = self
            .notifier
            .dispatch(vec![
                OutgoingEmail::new(
                    admin_email,
                    format!("New Contact Message: {}", saved.subject),
                    "contact_notification",
                    context.clone(),
                ),
                OutgoingEmail::new(
                    saved.email.clone(),
                    "Thank you for contacting Suzstar Counseling",
                    "contact_autoreply",
                    context,
                ),
            ])
            .await;

        Ok((saved, report))
    }
}
