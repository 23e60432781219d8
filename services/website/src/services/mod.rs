use std::sync::Arc;

use sqlx::PgPool;
use suzstar_auth::JwtService;

use crate::config::WebsiteConfig;
use crate::notifications::Notifier;
use crate::storage::FileStore;
use crate::templates::TemplateEngine;

pub mod appointments;
pub mod blog;
pub mod contact;
pub mod content;
pub mod dashboard;
pub mod events;
pub mod newsletter;
pub mod resources;
pub mod search;
pub mod settings;
pub mod staff;
pub mod testimonials;

pub use appointments::AppointmentService;
pub use blog::BlogService;
pub use contact::ContactService;
pub use content::ContentService;
pub use dashboard::DashboardService;
pub use events::EventService;
pub use newsletter::NewsletterService;
pub use resources::ResourceService;
pub use search::SearchService;
pub use settings::SettingsService;
pub use staff::StaffService;
pub use testimonials::TestimonialService;

/// Non-blank filters encoded as `&key=value...`, appended to pagination links.
pub fn filter_query(pairs: &[(&str, Option<&str>)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        if let Some(value) = suzstar_database::non_empty(*value) {
            serializer.append_pair(key, value);
        }
    }
    let query = serializer.finish();
    if query.is_empty() {
        query
    } else {
        format!("&{}", query)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub notifier: Notifier,
    pub templates: Arc<TemplateEngine>,
    pub file_store: FileStore,
    pub config: Arc<WebsiteConfig>,
}
