use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use suzstar_common::*;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub id: i64,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub service_type: ServiceType,
    pub short_description: String,
    pub description: String,
    pub icon_name: String,
    pub price_range: Option<String>,
    pub duration: String,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Counselor {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub image: Option<String>,
    pub specialties: Vec<String>, // PostgreSQL text array
    pub languages: Vec<String>,
    pub experience_years: i32,
    pub email: String,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub featured_image: Option<String>,
    pub excerpt: String,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub category: BlogCategory,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub views_count: i32,
    pub published_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    #[sqlx(try_from = "String")]
    pub appointment_type: AppointmentType,
    #[sqlx(try_from = "String")]
    pub session_mode: SessionMode,
    pub counselor_id: Option<i64>,
    pub concerns: String,
    pub is_new_client: bool,
    pub hear_about_us: String,
    #[sqlx(try_from = "String")]
    pub status: AppointmentStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub is_replied: bool,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resource {
    pub id: i64,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub resource_type: ResourceType,
    pub description: String,
    pub content: Option<String>,
    pub external_url: Option<String>,
    /// Path relative to the media root.
    pub file_upload: Option<String>,
    pub category: String,
    pub is_featured: bool,
    pub downloads_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Testimonial {
    pub id: i64,
    pub client_name: String,
    pub client_initials: String,
    pub location: String,
    pub testimonial: String,
    pub rating: i32,
    pub service_id: Option<i64>,
    pub is_featured: bool,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// What public pages may show of a testimonial; the client's name stays private.
#[derive(Debug, Clone, Serialize)]
pub struct PublicTestimonial {
    pub id: i64,
    pub client_initials: String,
    pub location: String,
    pub testimonial: String,
    pub rating: i32,
    pub service_id: Option<i64>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Testimonial> for PublicTestimonial {
    fn from(t: Testimonial) -> Self {
        Self {
            id: t.id,
            client_initials: t.client_initials,
            location: t.location,
            testimonial: t.testimonial,
            rating: t.rating,
            service_id: t.service_id,
            is_featured: t.is_featured,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
    #[sqlx(try_from = "String")]
    pub category: FaqCategory,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub event_type: EventType,
    pub description: String,
    pub featured_image: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub is_online: bool,
    pub online_link: Option<String>,
    /// 0 means unlimited.
    pub max_participants: i32,
    pub current_participants: i32,
    pub price: Decimal,
    pub is_featured: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.max_participants > 0 && self.current_participants >= self.max_participants
    }

    /// `None` when the event has no participant limit.
    pub fn spots_left(&self) -> Option<i32> {
        if self.max_participants == 0 {
            None
        } else {
            Some((self.max_participants - self.current_participants).max(0))
        }
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_date >= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRegistration {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NewsletterSubscriber {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub is_active: bool,
    pub subscribed_date: DateTime<Utc>,
    pub unsubscribed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SiteSetting {
    pub id: i64,
    pub site_name: String,
    pub tagline: String,
    pub logo: Option<String>,
    pub favicon: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub phone: String,
    pub whatsapp: String,
    pub email: String,
    pub address: String,
    pub monday_friday: String,
    pub saturday: String,
    pub sunday: String,
    pub facebook: String,
    pub twitter: String,
    pub instagram: String,
    pub linkedin: String,
    pub youtube: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub google_analytics_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StaffUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl StaffUser {
    /// Full name, or the username when no name was recorded.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}
