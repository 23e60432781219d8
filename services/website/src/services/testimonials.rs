use serde_json::json;
use sqlx::PgPool;
use suzstar_common::{AppError, FieldErrors};
use suzstar_database::{Condition, ListQuery, Page, Paginator, PublicTestimonial, Testimonial};

use super::content::TESTIMONIAL_ORDER;
use super::{AppState, SettingsService};
use crate::forms::{invalid_choice, NewTestimonial};
use crate::notifications::{Notifier, OutgoingEmail};

pub const TESTIMONIALS_PER_PAGE: i64 = 12;

pub struct TestimonialService {
    db_pool: PgPool,
    notifier: Notifier,
    settings: SettingsService,
}

impl TestimonialService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            notifier: state.notifier.clone(),
            settings: SettingsService::new(state),
        }
    }

    pub async fn approved_page(&self, page: Option<&str>) -> Result<Page<PublicTestimonial>, AppError> {
        let page: Page<Testimonial> = ListQuery::new("testimonials", TESTIMONIAL_ORDER)
            .filter(Condition::Bool("is_approved", true))
            .fetch_page(&self.db_pool, Paginator::new(TESTIMONIALS_PER_PAGE), page)
            .await?;
        Ok(page.map(PublicTestimonial::from))
    }

    /// Stores a client story unapproved and alerts staff.
    pub async fn submit(&self, request: NewTestimonial) -> Result<Testimonial, AppError> {
        if let Some(service_id) = request.service_id {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM services WHERE id = $1 AND is_active)",
            )
            .bind(service_id)
            .fetch_one(&self.db_pool)
            .await?;
            if !exists {
                let mut errors = FieldErrors::new();
                errors.add("service", invalid_choice(&service_id.to_string()));
                return Err(errors.into());
            }
        }

        let testimonial = sqlx::query_as::<_, Testimonial>(
            "INSERT INTO testimonials (client_name, client_initials, location, testimonial, rating, service_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&request.client_name)
        .bind(&request.client_initials)
        .bind(&request.location)
        .bind(&request.testimonial)
        .bind(request.rating)
        .bind(request.service_id)
        .fetch_one(&self.db_pool)
        .await
        .map_err(AppError::from_db)?;

        tracing::info!(testimonial_id = testimonial.id, "Testimonial submitted for approval");

        let admin_email = self.settings.alert_recipient().await;
        self.notifier
            .dispatch(vec![OutgoingEmail::new(
                admin_email,
                "New Testimonial Awaiting Approval",
                "admin_testimonial_notification",
                json!({
                    "client_name": testimonial.client_name,
                    "client_initials": testimonial.client_initials,
                    "location": testimonial.location,
                    "rating": testimonial.rating,
                    "testimonial": testimonial.testimonial,
                }),
            )])
            .await;

        Ok(testimonial)
    }
}
