use serde_json::json;
use sqlx::PgPool;
use suzstar_common::AppError;
use suzstar_database::NewsletterSubscriber;

use super::AppState;
use crate::forms::NewSubscriber;
use crate::notifications::{Notifier, OutgoingEmail};

pub struct NewsletterService {
    db_pool: PgPool,
    notifier: Notifier,
}

impl NewsletterService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            notifier: state.notifier.clone(),
        }
    }

    /// Creates the subscription or reactivates a lapsed one; an active
    /// subscription is left as it is. The welcome email goes out either way.
    pub async fn subscribe(&self, request: NewSubscriber) -> Result<NewsletterSubscriber, AppError> {
        let subscriber = sqlx::query_as::<_, NewsletterSubscriber>(
            r#"
            INSERT INTO newsletter_subscribers (email, first_name)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET
                is_active = TRUE,
                unsubscribed_date = NULL,
                first_name = CASE
                    WHEN EXCLUDED.first_name <> '' THEN EXCLUDED.first_name
                    ELSE newsletter_subscribers.first_name
                END
            WHERE NOT newsletter_subscribers.is_active
            RETURNING *
            "#,
        )
        .bind(&request.email)
        .bind(&request.first_name)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(AppError::from_db)?;

        let subscriber = match subscriber {
            Some(subscriber) => {
                tracing::info!(subscriber_id = subscriber.id, "Newsletter subscription active");
                subscriber
            }
            None => self.find(&request.email).await?.ok_or_else(|| {
                AppError::Internal("Subscriber vanished during subscribe".to_string())
            })?,
        };

        self.notifier
            .dispatch(vec![OutgoingEmail::new(
                request.email.clone(),
                "Welcome to Suzstar Counseling Newsletter",
                "newsletter_welcome",
                json!({ "first_name": request.first_name }),
            )])
            .await;

        Ok(subscriber)
    }

    /// Returns `false` when the address was never subscribed.
    pub async fn unsubscribe(&self, email: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE newsletter_subscribers SET is_active = FALSE, unsubscribed_date = NOW() \
             WHERE email = $1",
        )
        .bind(email)
        .execute(&self.db_pool)
        .await?;

        let found = result.rows_affected() > 0;
        tracing::info!(found, "Newsletter unsubscribe");
        Ok(found)
    }

    pub async fn find(&self, email: &str) -> Result<Option<NewsletterSubscriber>, AppError> {
        sqlx::query_as::<_, NewsletterSubscriber>("SELECT * FROM newsletter_subscribers WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(AppError::Database)
    }
}
