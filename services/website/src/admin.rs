//! Staff CRUD over every entity, driven by per-model metadata.
//!
//! Payloads are typed per model (all fields optional, absent keys left
//! untouched) and validated before the write. Rows are written through
//! `jsonb_populate_record`, so a single statement shape serves every table
//! and each column is coerced by PostgreSQL to its declared type.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use validator::Validate;

use suzstar_auth::Claims;
use suzstar_common::{
    AppError, AppointmentStatus, AppointmentType, BlogCategory, EventType, FaqCategory, FieldErrors,
    ResourceType, ServiceType, SessionMode,
};
use suzstar_database::{
    Appointment, BlogPost, Condition, ContactMessage, Counselor, Event, EventRegistration, Faq,
    ListQuery, NewsletterSubscriber, Page, Paginator, Resource, Service, SiteSetting, Testimonial,
};

use crate::forms::{merge, validate_kenyan_phone, REQUIRED_MESSAGE};

pub const ADMIN_PER_PAGE: i64 = 100;

pub trait AdminModel: Send + Sync + 'static {
    type Record: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin;
    type Input: DeserializeOwned + Serialize + Validate + Send;

    const TABLE: &'static str;
    /// Writable columns; payload keys outside this list are refused.
    const COLUMNS: &'static [&'static str];
    /// Columns a create payload must carry.
    const REQUIRED: &'static [&'static str];
    const SEARCH_FIELDS: &'static [&'static str];
    const LIST_FILTER: &'static [&'static str];
    const ORDERING: &'static str;
    const SINGLETON: bool = false;
    const HAS_UPDATED_AT: bool = false;

    /// Fills derived values before the write.
    fn prepare(_input: &mut Self::Input, _claims: &Claims, _creating: bool) {}
}

/// Lowercase ASCII words joined by hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Validates a payload and returns the column values it sets.
pub fn payload<M: AdminModel>(
    raw: Value,
    claims: &Claims,
    creating: bool,
) -> Result<Map<String, Value>, AppError> {
    let mut input: M::Input = serde_json::from_value(raw)
        .map_err(|e| AppError::Validation(format!("Invalid {} payload: {}", M::TABLE, e)))?;
    M::prepare(&mut input, claims, creating);

    let mut errors = FieldErrors::new();
    merge(&mut errors, input.validate());

    let values = match serde_json::to_value(&input) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => return Err(AppError::Internal(format!("Payload encoding failed: {}", e))),
    };

    if creating {
        for column in M::REQUIRED {
            if values.get(*column).map_or(true, blank) {
                errors.add(*column, REQUIRED_MESSAGE);
            }
        }
    }
    for key in values.keys() {
        if !M::COLUMNS.contains(&key.as_str()) {
            errors.add(key, "Unknown field.");
        }
    }

    errors.into_result(values).map_err(AppError::from)
}

/// Static column names for the keys present in `values`, in declaration order.
fn columns_of<M: AdminModel>(values: &Map<String, Value>) -> Vec<&'static str> {
    M::COLUMNS
        .iter()
        .copied()
        .filter(|column| values.contains_key(*column))
        .collect()
}

pub async fn list<M: AdminModel>(
    pool: &PgPool,
    params: &HashMap<String, String>,
) -> Result<Page<M::Record>, AppError> {
    let mut query = ListQuery::new(M::TABLE, M::ORDERING);
    if !M::SEARCH_FIELDS.is_empty() {
        query = query.search(M::SEARCH_FIELDS, params.get("q").map(String::as_str));
    }
    for field in M::LIST_FILTER {
        if let Some(value) = params.get(*field).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            query = query.filter(Condition::TextCast(*field, value.to_string()));
        }
    }
    query
        .fetch_page(pool, Paginator::new(ADMIN_PER_PAGE), params.get("page").map(String::as_str))
        .await
}

pub async fn get<M: AdminModel>(pool: &PgPool, id: i64) -> Result<M::Record, AppError> {
    let sql = format!("SELECT * FROM {} WHERE id = $1", M::TABLE);
    sqlx::query_as::<_, M::Record>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} record {}", M::TABLE, id)))
}

async fn first<M: AdminModel>(pool: &PgPool) -> Result<M::Record, AppError> {
    let sql = format!("SELECT * FROM {} ORDER BY id LIMIT 1", M::TABLE);
    sqlx::query_as::<_, M::Record>(&sql)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(M::TABLE.to_string()))
}

/// Inserts a row; for a singleton that already exists, returns the existing row.
pub async fn create<M: AdminModel>(pool: &PgPool, values: Map<String, Value>) -> Result<M::Record, AppError> {
    let columns = columns_of::<M>(&values).join(", ");
    let sql = format!(
        "INSERT INTO {table} ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1){conflict} RETURNING *",
        table = M::TABLE,
        columns = columns,
        conflict = if M::SINGLETON { " ON CONFLICT DO NOTHING" } else { "" },
    );

    let created = sqlx::query_as::<_, M::Record>(&sql)
        .bind(Json(Value::Object(values)))
        .fetch_optional(pool)
        .await
        .map_err(AppError::from_db)?;

    match created {
        Some(record) => {
            tracing::info!(table = M::TABLE, "Admin created record");
            Ok(record)
        }
        None if M::SINGLETON => {
            tracing::info!(table = M::TABLE, "Singleton already exists, create ignored");
            first::<M>(pool).await
        }
        None => Err(AppError::Internal(format!("Insert into {} returned no row", M::TABLE))),
    }
}

pub async fn update<M: AdminModel>(
    pool: &PgPool,
    id: i64,
    values: Map<String, Value>,
) -> Result<M::Record, AppError> {
    let columns = columns_of::<M>(&values);
    if columns.is_empty() {
        return get::<M>(pool, id).await;
    }

    let mut assignments: Vec<String> = columns.iter().map(|c| format!("{c} = r.{c}")).collect();
    if M::HAS_UPDATED_AT {
        assignments.push("updated_at = NOW()".to_string());
    }
    let sql = format!(
        "UPDATE {table} SET {assignments} FROM jsonb_populate_record(NULL::{table}, $2) AS r \
         WHERE {table}.id = $1 RETURNING {table}.*",
        table = M::TABLE,
        assignments = assignments.join(", "),
    );

    let record = sqlx::query_as::<_, M::Record>(&sql)
        .bind(id)
        .bind(Json(Value::Object(values)))
        .fetch_optional(pool)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFound(format!("{} record {}", M::TABLE, id)))?;

    tracing::info!(table = M::TABLE, id, "Admin updated record");
    Ok(record)
}

pub async fn delete<M: AdminModel>(pool: &PgPool, id: i64) -> Result<(), AppError> {
    if M::SINGLETON {
        return Err(AppError::Validation(format!("{} cannot be deleted", M::TABLE)));
    }
    let sql = format!("DELETE FROM {} WHERE id = $1", M::TABLE);
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::from_db)?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("{} record {}", M::TABLE, id)));
    }
    tracing::info!(table = M::TABLE, id, "Admin deleted record");
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-model metadata and payloads

pub struct Services;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ServiceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

impl AdminModel for Services {
    type Record = Service;
    type Input = ServiceInput;
    const TABLE: &'static str = "services";
    const COLUMNS: &'static [&'static str] = &[
        "name", "service_type", "short_description", "description", "icon_name", "price_range",
        "duration", "is_active", "display_order",
    ];
    const REQUIRED: &'static [&'static str] = &["name", "service_type", "short_description", "description"];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "short_description"];
    const LIST_FILTER: &'static [&'static str] = &["service_type", "is_active"];
    const ORDERING: &'static str = "display_order, name";
    const HAS_UPDATED_AT: bool = true;
}

pub struct Counselors;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CounselorInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub experience_years: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

impl AdminModel for Counselors {
    type Record = Counselor;
    type Input = CounselorInput;
    const TABLE: &'static str = "counselors";
    const COLUMNS: &'static [&'static str] = &[
        "name", "title", "bio", "image", "specialties", "languages", "experience_years", "email",
        "is_active", "display_order",
    ];
    const REQUIRED: &'static [&'static str] = &["name", "title", "bio"];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "title", "specialties"];
    const LIST_FILTER: &'static [&'static str] = &["is_active"];
    const ORDERING: &'static str = "display_order, name";
}

pub struct BlogPosts;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BlogPostInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<BlogCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl AdminModel for BlogPosts {
    type Record = BlogPost;
    type Input = BlogPostInput;
    const TABLE: &'static str = "blog_posts";
    const COLUMNS: &'static [&'static str] = &[
        "title", "slug", "author", "featured_image", "excerpt", "content", "category", "tags",
        "is_featured", "published_date", "is_published",
    ];
    const REQUIRED: &'static [&'static str] = &["title", "slug", "excerpt", "content", "category"];
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "content", "tags"];
    const LIST_FILTER: &'static [&'static str] = &["category", "is_featured", "is_published"];
    const ORDERING: &'static str = "published_date DESC";
    const HAS_UPDATED_AT: bool = true;

    fn prepare(input: &mut BlogPostInput, claims: &Claims, creating: bool) {
        if !creating {
            return;
        }
        let missing_slug = input.slug.as_deref().map_or(true, |s| s.trim().is_empty());
        if missing_slug {
            input.slug = input.title.as_deref().map(slugify).filter(|s| !s.is_empty());
        }
        if input.author.as_deref().map_or(true, |a| a.trim().is_empty()) {
            input.author = Some(claims.display_name().to_string());
        }
    }
}

pub struct Appointments;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppointmentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_kenyan_phone")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_type: Option<AppointmentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_mode: Option<SessionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counselor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concerns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new_client: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hear_about_us: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AdminModel for Appointments {
    type Record = Appointment;
    type Input = AppointmentInput;
    const TABLE: &'static str = "appointments";
    const COLUMNS: &'static [&'static str] = &[
        "name", "email", "phone", "preferred_date", "preferred_time", "appointment_type",
        "session_mode", "counselor_id", "concerns", "is_new_client", "hear_about_us", "status", "notes",
    ];
    const REQUIRED: &'static [&'static str] = &[
        "name", "email", "phone", "preferred_date", "preferred_time", "appointment_type", "concerns",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email", "phone"];
    const LIST_FILTER: &'static [&'static str] = &["status", "appointment_type", "session_mode", "preferred_date"];
    const ORDERING: &'static str = "preferred_date DESC, preferred_time DESC";
    const HAS_UPDATED_AT: bool = true;
}

pub struct ContactMessages;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ContactMessageInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_replied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replied_at: Option<DateTime<Utc>>,
}

impl AdminModel for ContactMessages {
    type Record = ContactMessage;
    type Input = ContactMessageInput;
    const TABLE: &'static str = "contact_messages";
    const COLUMNS: &'static [&'static str] = &[
        "name", "email", "phone", "subject", "message", "is_read", "is_replied", "replied_at",
    ];
    const REQUIRED: &'static [&'static str] = &["name", "email", "subject", "message"];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email", "subject", "message"];
    const LIST_FILTER: &'static [&'static str] = &["is_read", "is_replied"];
    const ORDERING: &'static str = "created_at DESC";
}

pub struct Resources;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ResourceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_upload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub downloads_count: Option<i32>,
}

impl AdminModel for Resources {
    type Record = Resource;
    type Input = ResourceInput;
    const TABLE: &'static str = "resources";
    const COLUMNS: &'static [&'static str] = &[
        "title", "resource_type", "description", "content", "external_url", "file_upload",
        "category", "is_featured", "downloads_count",
    ];
    const REQUIRED: &'static [&'static str] = &["title", "resource_type", "description"];
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description"];
    const LIST_FILTER: &'static [&'static str] = &["resource_type", "category", "is_featured"];
    const ORDERING: &'static str = "created_at DESC";
    const HAS_UPDATED_AT: bool = true;
}

pub struct Testimonials;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TestimonialInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 10, message = "Initials must be 10 characters or less"))]
    pub client_initials: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testimonial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
}

impl AdminModel for Testimonials {
    type Record = Testimonial;
    type Input = TestimonialInput;
    const TABLE: &'static str = "testimonials";
    const COLUMNS: &'static [&'static str] = &[
        "client_name", "client_initials", "location", "testimonial", "rating", "service_id",
        "is_featured", "is_approved",
    ];
    const REQUIRED: &'static [&'static str] = &["client_name", "client_initials", "testimonial"];
    const SEARCH_FIELDS: &'static [&'static str] = &["client_name", "testimonial"];
    const LIST_FILTER: &'static [&'static str] = &["rating", "is_featured", "is_approved"];
    const ORDERING: &'static str = "created_at DESC";
}

pub struct Faqs;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct FaqInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FaqCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl AdminModel for Faqs {
    type Record = Faq;
    type Input = FaqInput;
    const TABLE: &'static str = "faqs";
    const COLUMNS: &'static [&'static str] = &["question", "answer", "category", "display_order", "is_active"];
    const REQUIRED: &'static [&'static str] = &["question", "answer", "category"];
    const SEARCH_FIELDS: &'static [&'static str] = &["question", "answer"];
    const LIST_FILTER: &'static [&'static str] = &["category", "is_active"];
    const ORDERING: &'static str = "category, display_order";
}

pub struct Events;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EventInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub online_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub max_participants: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub current_participants: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl AdminModel for Events {
    type Record = Event;
    type Input = EventInput;
    const TABLE: &'static str = "events";
    const COLUMNS: &'static [&'static str] = &[
        "title", "event_type", "description", "featured_image", "start_date", "end_date", "location",
        "is_online", "online_link", "max_participants", "current_participants", "price",
        "is_featured", "is_published",
    ];
    const REQUIRED: &'static [&'static str] =
        &["title", "event_type", "description", "start_date", "end_date", "location"];
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description", "location"];
    const LIST_FILTER: &'static [&'static str] = &["event_type", "is_online", "is_published"];
    const ORDERING: &'static str = "start_date";
}

pub struct EventRegistrations;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EventRegistrationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_kenyan_phone")]
    pub phone: Option<String>,
}

impl AdminModel for EventRegistrations {
    type Record = EventRegistration;
    type Input = EventRegistrationInput;
    const TABLE: &'static str = "event_registrations";
    const COLUMNS: &'static [&'static str] = &["event_id", "name", "email", "phone"];
    const REQUIRED: &'static [&'static str] = &["event_id", "name", "email", "phone"];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email"];
    const LIST_FILTER: &'static [&'static str] = &["event_id"];
    const ORDERING: &'static str = "created_at DESC";
}

pub struct NewsletterSubscribers;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewsletterSubscriberInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed_date: Option<DateTime<Utc>>,
}

impl AdminModel for NewsletterSubscribers {
    type Record = NewsletterSubscriber;
    type Input = NewsletterSubscriberInput;
    const TABLE: &'static str = "newsletter_subscribers";
    const COLUMNS: &'static [&'static str] = &["email", "first_name", "is_active", "unsubscribed_date"];
    const REQUIRED: &'static [&'static str] = &["email"];
    const SEARCH_FIELDS: &'static [&'static str] = &["email", "first_name"];
    const LIST_FILTER: &'static [&'static str] = &["is_active"];
    const ORDERING: &'static str = "subscribed_date DESC";
}

pub struct SiteSettings;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SiteSettingInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_kenyan_phone")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday_friday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_analytics_id: Option<String>,
}

impl AdminModel for SiteSettings {
    type Record = SiteSetting;
    type Input = SiteSettingInput;
    const TABLE: &'static str = "site_settings";
    const COLUMNS: &'static [&'static str] = &[
        "site_name", "tagline", "logo", "favicon", "primary_color", "secondary_color", "phone",
        "whatsapp", "email", "address", "monday_friday", "saturday", "sunday", "facebook", "twitter",
        "instagram", "linkedin", "youtube", "meta_description", "meta_keywords", "google_analytics_id",
    ];
    const REQUIRED: &'static [&'static str] = &["phone", "email"];
    const SEARCH_FIELDS: &'static [&'static str] = &[];
    const LIST_FILTER: &'static [&'static str] = &[];
    const ORDERING: &'static str = "id";
    const SINGLETON: bool = true;
}

// ---------------------------------------------------------------------------
// Bulk actions

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub ids: Vec<i64>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub ids: Vec<i64>,
    #[serde(default = "default_true")]
    pub is_read: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub updated: u64,
}

fn default_true() -> bool {
    true
}

pub async fn set_appointment_status(pool: &PgPool, request: &SetStatusRequest) -> Result<BulkResult, AppError> {
    let result = sqlx::query("UPDATE appointments SET status = $1, updated_at = NOW() WHERE id = ANY($2)")
        .bind(request.status.as_str())
        .bind(&request.ids)
        .execute(pool)
        .await?;
    tracing::info!(status = request.status.as_str(), updated = result.rows_affected(), "Appointment status changed");
    Ok(BulkResult {
        updated: result.rows_affected(),
    })
}

pub async fn mark_messages_read(pool: &PgPool, request: &MarkReadRequest) -> Result<BulkResult, AppError> {
    let result = sqlx::query("UPDATE contact_messages SET is_read = $1 WHERE id = ANY($2)")
        .bind(request.is_read)
        .bind(&request.ids)
        .execute(pool)
        .await?;
    Ok(BulkResult {
        updated: result.rows_affected(),
    })
}

/// Selected subscribers (all of them when no ids are given).
pub async fn subscribers_for_export(pool: &PgPool, ids: &[i64]) -> Result<Vec<NewsletterSubscriber>, AppError> {
    let query = if ids.is_empty() {
        sqlx::query_as::<_, NewsletterSubscriber>(
            "SELECT * FROM newsletter_subscribers ORDER BY subscribed_date DESC",
        )
    } else {
        sqlx::query_as::<_, NewsletterSubscriber>(
            "SELECT * FROM newsletter_subscribers WHERE id = ANY($1) ORDER BY subscribed_date DESC",
        )
        .bind(ids)
    };
    query.fetch_all(pool).await.map_err(AppError::Database)
}

pub fn subscribers_csv(subscribers: &[NewsletterSubscriber]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |e: csv::Error| AppError::Internal(format!("CSV export failed: {}", e));

    writer
        .write_record(["Email", "First Name", "Subscribed Date"])
        .map_err(csv_error)?;
    for subscriber in subscribers {
        let subscribed = subscriber.subscribed_date.format("%Y-%m-%d %H:%M:%S%:z").to_string();
        writer
            .write_record([subscriber.email.as_str(), subscriber.first_name.as_str(), subscribed.as_str()])
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::INITIALS_MESSAGE;
    use serde_json::json;
    use suzstar_common::JwtConfig;
    use uuid::Uuid;

    fn claims(full_name: &str) -> Claims {
        let config = JwtConfig {
            secret: "secret".to_string(),
            expiration_hours: 1,
            issuer: "suzstar-counseling".to_string(),
        };
        Claims::new(
            Uuid::new_v4(),
            "njeri".to_string(),
            "njeri@example.com".to_string(),
            full_name.to_string(),
            &config,
        )
    }

    #[test]
    fn slugify_matches_url_conventions() {
        assert_eq!(slugify("Coping with Exam Stress!"), "coping-with-exam-stress");
        assert_eq!(slugify("  5 Ways -- to Rest  "), "5-ways-to-rest");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn blog_create_derives_slug_and_author() {
        let values = payload::<BlogPosts>(
            json!({
                "title": "Sleep and Anxiety",
                "excerpt": "Why rest matters",
                "content": "<p>...</p>",
                "category": "anxiety"
            }),
            &claims("Njeri Mwangi"),
            true,
        )
        .unwrap();
        assert_eq!(values["slug"], "sleep-and-anxiety");
        assert_eq!(values["author"], "Njeri Mwangi");

        let values = payload::<BlogPosts>(
            json!({"title": "T", "excerpt": "E", "content": "C", "category": "general"}),
            &claims(""),
            true,
        )
        .unwrap();
        assert_eq!(values["author"], "njeri");
    }

    #[test]
    fn update_payload_carries_only_given_fields() {
        let values = payload::<Services>(json!({"is_active": false}), &claims("A"), false).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(columns_of::<Services>(&values), vec!["is_active"]);
    }

    #[test]
    fn create_reports_missing_required_fields() {
        let err = payload::<Faqs>(json!({"question": "Is it private?"}), &claims("A"), true).unwrap_err();
        match err {
            AppError::InvalidForm(errors) => {
                assert_eq!(errors.get("answer"), Some(REQUIRED_MESSAGE));
                assert_eq!(errors.get("category"), Some(REQUIRED_MESSAGE));
                assert!(!errors.contains("question"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_values_are_rejected_before_the_write() {
        let err = payload::<Testimonials>(
            json!({"client_initials": "ABCDEFGHIJK", "rating": 6}),
            &claims("A"),
            false,
        )
        .unwrap_err();
        let AppError::InvalidForm(errors) = err else { panic!("expected field errors") };
        assert_eq!(errors.get("client_initials"), Some(INITIALS_MESSAGE));
        assert!(errors.contains("rating"));

        let err = payload::<Appointments>(json!({"status": "lost"}), &claims("A"), false).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = payload::<SiteSettings>(json!({"phone": "12345"}), &claims("A"), false).unwrap_err();
        assert!(matches!(err, AppError::InvalidForm(_)));

        let err = payload::<Services>(json!({"id": 4}), &claims("A"), false).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn subscriber_export_has_expected_header() {
        let subscribers = vec![NewsletterSubscriber {
            id: 1,
            email: "amani@example.com".to_string(),
            first_name: "Amani".to_string(),
            is_active: true,
            subscribed_date: DateTime::parse_from_rfc3339("2024-03-01T08:15:00Z")
                .unwrap()
                .with_timezone(&Utc),
            unsubscribed_date: None,
        }];
        let csv = String::from_utf8(subscribers_csv(&subscribers).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Email,First Name,Subscribed Date\namani@example.com,Amani,2024-03-01 08:15:00+00:00\n"
        );
    }
}
