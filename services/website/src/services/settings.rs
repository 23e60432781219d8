use sqlx::PgPool;
use suzstar_common::AppError;
use suzstar_database::SiteSetting;

use super::AppState;

pub struct SettingsService {
    db_pool: PgPool,
    fallback_email: String,
}

impl SettingsService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            fallback_email: state.config.site.contact_email.clone(),
        }
    }

    /// The singleton settings row, if one has been created.
    pub async fn current(&self) -> Result<Option<SiteSetting>, AppError> {
        sqlx::query_as::<_, SiteSetting>("SELECT * FROM site_settings ORDER BY id LIMIT 1")
            .fetch_optional(&self.db_pool)
            .await
            .map_err(AppError::Database)
    }

    /// Where staff alerts go: the settings email, else the configured contact address.
    pub async fn admin_email(&self) -> Result<String, AppError> {
        let settings = self.current().await?;
        Ok(admin_recipient(settings.as_ref(), &self.fallback_email))
    }

    /// Recipient for alerts sent after a submission is saved. A failed
    /// lookup falls back to the configured contact address.
    pub async fn alert_recipient(&self) -> String {
        match self.admin_email().await {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(error = %e, "Site settings lookup failed, using configured contact email");
                self.fallback_email.clone()
            }
        }
    }
}

pub(crate) fn admin_recipient(settings: Option<&SiteSetting>, fallback: &str) -> String {
    settings
        .map(|s| s.email.trim())
        .filter(|email| !email.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
