use chrono::{DateTime, NaiveDate, NaiveTime};
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;

use suzstar_common::{
    AppError, AppointmentStatus, AppointmentType, BlogCategory, Choice, EventType, FaqCategory,
    ResourceType, ServiceType, SessionMode,
};

const LAYOUT: &str = include_str!("../templates/pages/layout.hbs");

const PAGES: &[(&str, &str)] = &[
    ("home", include_str!("../templates/pages/home.hbs")),
    ("about", include_str!("../templates/pages/about.hbs")),
    ("services", include_str!("../templates/pages/services.hbs")),
    ("service_detail", include_str!("../templates/pages/service_detail.hbs")),
    ("blog_list", include_str!("../templates/pages/blog_list.hbs")),
    ("blog_detail", include_str!("../templates/pages/blog_detail.hbs")),
    ("blog_category", include_str!("../templates/pages/blog_category.hbs")),
    ("contact", include_str!("../templates/pages/contact.hbs")),
    ("book_appointment", include_str!("../templates/pages/book_appointment.hbs")),
    ("appointment_success", include_str!("../templates/pages/appointment_success.hbs")),
    ("resources", include_str!("../templates/pages/resources.hbs")),
    ("resource_detail", include_str!("../templates/pages/resource_detail.hbs")),
    ("events", include_str!("../templates/pages/events.hbs")),
    ("event_detail", include_str!("../templates/pages/event_detail.hbs")),
    ("event_register", include_str!("../templates/pages/event_register.hbs")),
    ("faq", include_str!("../templates/pages/faq.hbs")),
    ("counselors", include_str!("../templates/pages/counselors.hbs")),
    ("counselor_detail", include_str!("../templates/pages/counselor_detail.hbs")),
    ("testimonials", include_str!("../templates/pages/testimonials.hbs")),
    ("testimonial_share", include_str!("../templates/pages/testimonial_share.hbs")),
    ("search", include_str!("../templates/pages/search.hbs")),
    ("dashboard", include_str!("../templates/pages/dashboard.hbs")),
];

const EMAILS: &[(&str, &str)] = &[
    ("contact_notification", include_str!("../templates/emails/contact_notification.txt")),
    ("contact_autoreply", include_str!("../templates/emails/contact_autoreply.txt")),
    ("appointment_confirmation", include_str!("../templates/emails/appointment_confirmation.txt")),
    ("admin_appointment_notification", include_str!("../templates/emails/admin_appointment_notification.txt")),
    ("event_registration", include_str!("../templates/emails/event_registration.txt")),
    ("newsletter_welcome", include_str!("../templates/emails/newsletter_welcome.txt")),
    ("admin_testimonial_notification", include_str!("../templates/emails/admin_testimonial_notification.txt")),
];

/// Formats an RFC 3339 timestamp, a `YYYY-MM-DD` date or an `HH:MM:SS`
/// time with a chrono format string; anything else is returned unchanged.
pub fn format_temporal(value: &str, fmt: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format(fmt).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.format(fmt).to_string();
    }
    if let Ok(time) = NaiveTime::parse_from_str(value, "%H:%M:%S") {
        return time.format(fmt).to_string();
    }
    value.to_string()
}

fn label<T: Choice + std::str::FromStr>(value: &str) -> Option<&'static str> {
    value.parse::<T>().ok().map(|c| c.label())
}

/// Human label for a stored choice value, e.g. `("session_mode", "in_person")`.
pub fn choice_label(kind: &str, value: &str) -> String {
    let found = match kind {
        "service_type" => label::<ServiceType>(value),
        "blog_category" | "category" => label::<BlogCategory>(value),
        "appointment_type" => label::<AppointmentType>(value),
        "session_mode" => label::<SessionMode>(value),
        "status" | "appointment_status" => label::<AppointmentStatus>(value),
        "resource_type" => label::<ResourceType>(value),
        "faq_category" => label::<FaqCategory>(value),
        "event_type" => label::<EventType>(value),
        _ => None,
    };
    found.map(str::to_string).unwrap_or_else(|| value.to_string())
}

/// Compares form values, which arrive as strings, against ids and numbers.
fn as_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

handlebars_helper!(date_helper: |value: str, fmt: str| format_temporal(value, fmt));
handlebars_helper!(choice_label_helper: |kind: str, value: str| choice_label(kind, value));
handlebars_helper!(same_helper: |left: Json, right: Json| as_text(left) == as_text(right));
handlebars_helper!(truncate_helper: |value: str, max: u64| {
    let max = max as usize;
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let cut: String = value.chars().take(max).collect();
        format!("{}…", cut.trim_end())
    }
});

pub struct TemplateEngine {
    pages: Handlebars<'static>,
    emails: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, AppError> {
        let mut pages = Handlebars::new();
        pages
            .register_partial("layout", LAYOUT)
            .map_err(|e| AppError::Internal(format!("Template registration error: {}", e)))?;
        for (name, source) in PAGES {
            pages
                .register_template_string(name, *source)
                .map_err(|e| AppError::Internal(format!("Template registration error ({}): {}", name, e)))?;
        }

        // Plain-text bodies, no HTML escaping
        let mut emails = Handlebars::new();
        emails.register_escape_fn(handlebars::no_escape);
        for (name, source) in EMAILS {
            emails
                .register_template_string(name, *source)
                .map_err(|e| AppError::Internal(format!("Template registration error ({}): {}", name, e)))?;
        }

        for registry in [&mut pages, &mut emails] {
            registry.register_helper("date", Box::new(date_helper));
            registry.register_helper("choice_label", Box::new(choice_label_helper));
            registry.register_helper("truncate", Box::new(truncate_helper));
            registry.register_helper("same", Box::new(same_helper));
        }

        Ok(Self { pages, emails })
    }

    pub fn render_page<T: Serialize>(&self, name: &str, context: &T) -> Result<String, AppError> {
        self.pages
            .render(name, context)
            .map_err(|e| AppError::Internal(format!("Template rendering error ({}): {}", name, e)))
    }

    pub fn render_email<T: Serialize>(&self, name: &str, context: &T) -> Result<String, AppError> {
        self.emails
            .render(name, context)
            .map_err(|e| AppError::Internal(format!("Email template error ({}): {}", name, e)))
    }
}
