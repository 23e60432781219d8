use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use suzstar_auth::JwtService;
use suzstar_common::DatabaseConfig;
use suzstar_database::{create_pool, MigrationRunner};
use suzstar_website::{
    build_app,
    config::WebsiteConfig,
    notifications::{MemoryMailer, Notifier},
    services::{AppState, SettingsService},
    storage::FileStore,
    templates::TemplateEngine,
};

struct TestApp {
    server: TestServer,
    mailer: Arc<MemoryMailer>,
    pool: PgPool,
    media: tempfile::TempDir,
}

fn state_with_pool(pool: PgPool, media: &std::path::Path) -> (AppState, Arc<MemoryMailer>) {
    let config = WebsiteConfig::from_env();
    let templates = Arc::new(TemplateEngine::new().expect("Templates must compile"));
    let mailer = Arc::new(MemoryMailer::new());

    let state = AppState {
        db_pool: pool,
        jwt_service: JwtService::new(&config.jwt),
        notifier: Notifier::new(mailer.clone(), templates.clone()),
        templates,
        file_store: FileStore::new(media, "/media"),
        config: Arc::new(config),
    };
    (state, mailer)
}

fn app_with_pool(pool: PgPool) -> TestApp {
    let media = tempfile::tempdir().expect("Failed to create media dir");
    let (state, mailer) = state_with_pool(pool.clone(), media.path());

    TestApp {
        server: TestServer::new(build_app(state)).expect("Failed to start test server"),
        mailer,
        pool,
        media,
    }
}

async fn test_app() -> Option<TestApp> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            println!("Skipping website test - DATABASE_URL not set");
            return None;
        }
    };

    let config = DatabaseConfig::from_url(&url).expect("DATABASE_URL must be a postgres URL");
    let pool = create_pool(&config).await.expect("Failed to connect to database");
    MigrationRunner::new(pool.clone())
        .run_all_migrations()
        .await
        .expect("Failed to run migrations");
    Some(app_with_pool(pool))
}

/// An app whose pool never connects; for routes that must not touch the database.
fn offline_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(300))
        .connect_lazy("postgres://nobody@127.0.0.1:1/none")
        .expect("Lazy pool")
}

fn offline_app() -> TestApp {
    app_with_pool(offline_pool())
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

fn location(response: &axum_test::TestResponse) -> String {
    response
        .header(header::LOCATION)
        .to_str()
        .expect("Location header")
        .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = offline_app();
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_admin_requires_staff_token() {
    let app = offline_app();
    let response = app.server.get("/admin/faqs").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/dashboard")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer not-a-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_contact_submission_saves_and_notifies() {
    let Some(app) = test_app().await else { return };
    let email = format!("{}@example.com", unique("contact"));

    let response = app
        .server
        .post("/contact")
        .form(&[
            ("name", "Amani Otieno"),
            ("email", email.as_str()),
            ("phone", ""),
            ("subject", "Fees"),
            ("message", "How much is a session?"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/contact?notice=contact-sent");

    let (is_read, is_replied): (bool, bool) =
        sqlx::query_as("SELECT is_read, is_replied FROM contact_messages WHERE email = $1")
            .bind(&email)
            .fetch_one(&app.pool)
            .await
            .expect("Message stored");
    assert!(!is_read && !is_replied);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().any(|m| m.to == email));
}

#[tokio::test]
async fn test_invalid_contact_form_is_rerendered() {
    let Some(app) = test_app().await else { return };
    let email = format!("{}@example.com", unique("bad-phone"));

    let response = app
        .server
        .post("/contact")
        .form(&[
            ("name", "Amani"),
            ("email", email.as_str()),
            ("phone", "12345"),
            ("subject", "Hello"),
            ("message", "Hi"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Enter a valid Kenyan phone number"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE email = $1")
        .bind(&email)
        .fetch_one(&app.pool)
        .await
        .expect("Count");
    assert_eq!(count, 0);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_appointment_booking_is_pending() {
    let Some(app) = test_app().await else { return };
    let email = format!("{}@example.com", unique("booking"));
    let date = (chrono::Utc::now().date_naive() + chrono::Duration::days(7))
        .format("%Y-%m-%d")
        .to_string();

    let response = app
        .server
        .post("/book-appointment")
        .form(&[
            ("name", "Wanjiru Kamau"),
            ("email", email.as_str()),
            ("phone", "0799999999"),
            ("preferred_date", date.as_str()),
            ("preferred_time", "10:00"),
            ("appointment_type", "individual"),
            ("session_mode", "online_video"),
            ("counselor", ""),
            ("concerns", "Exam stress"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    let (id, status): (i64, String) =
        sqlx::query_as("SELECT id, status FROM appointments WHERE email = $1")
            .bind(&email)
            .fetch_one(&app.pool)
            .await
            .expect("Appointment stored");
    assert_eq!(status, "pending");
    assert_eq!(
        location(&response),
        format!("/appointment-success/{}?notice=appointment-booked", id)
    );

    let page = app.server.get(&format!("/appointment-success/{}", id)).await;
    assert_eq!(page.status_code(), StatusCode::OK);
    assert!(page.text().contains("Wanjiru Kamau"));
}

#[tokio::test]
async fn test_blog_views_increase_per_request() {
    let Some(app) = test_app().await else { return };
    let slug = unique("views");

    sqlx::query(
        "INSERT INTO blog_posts (title, slug, excerpt, content, category) \
         VALUES ('Counting views', $1, 'Excerpt', 'Body', 'general')",
    )
    .bind(&slug)
    .execute(&app.pool)
    .await
    .expect("Post stored");

    for _ in 0..3 {
        let response = app.server.get(&format!("/blog/{}", slug)).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let views: i32 = sqlx::query_scalar("SELECT views_count FROM blog_posts WHERE slug = $1")
        .bind(&slug)
        .fetch_one(&app.pool)
        .await
        .expect("Views");
    assert_eq!(views, 3);

    let missing = app.server.get(&format!("/blog/{}", unique("missing"))).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

async fn insert_event(pool: &PgPool, max: i32, current: i32) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO events (title, event_type, description, start_date, end_date, location, \
         max_participants, current_participants) \
         VALUES ($1, 'workshop', 'Desc', NOW() + INTERVAL '3 days', NOW() + INTERVAL '3 days 2 hours', \
         'Nairobi', $2, $3) RETURNING id",
    )
    .bind(unique("event"))
    .bind(max)
    .bind(current)
    .fetch_one(pool)
    .await
    .expect("Event stored")
}

#[tokio::test]
async fn test_full_event_refuses_registration() {
    let Some(app) = test_app().await else { return };
    let event_id = insert_event(&app.pool, 1, 1).await;

    let response = app
        .server
        .post(&format!("/events/{}/register", event_id))
        .form(&[("name", "Baraka"), ("email", "baraka@example.com"), ("phone", "+254712345678")])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/events/{}?notice=event-full", event_id));

    let current: i32 = sqlx::query_scalar("SELECT current_participants FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_one(&app.pool)
        .await
        .expect("Event");
    assert_eq!(current, 1);
}

#[tokio::test]
async fn test_registration_counts_participant() {
    let Some(app) = test_app().await else { return };
    let event_id = insert_event(&app.pool, 2, 0).await;

    let response = app
        .server
        .post(&format!("/events/{}/register", event_id))
        .form(&[("name", "Baraka"), ("email", "baraka@example.com"), ("phone", "0712345678")])
        .await;
    assert_eq!(location(&response), format!("/events/{}?notice=registered", event_id));

    let (current, registrations): (i32, i64) = sqlx::query_as(
        "SELECT current_participants, (SELECT COUNT(*) FROM event_registrations WHERE event_id = $1) \
         FROM events WHERE id = $1",
    )
    .bind(event_id)
    .fetch_one(&app.pool)
    .await
    .expect("Event");
    assert_eq!((current, registrations), (1, 1));
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_newsletter_resubscribe_reactivates() {
    let Some(app) = test_app().await else { return };
    let email = format!("{}@example.com", unique("news"));

    let response = app
        .server
        .post("/newsletter/subscribe")
        .add_header(header::REFERER, HeaderValue::from_static("http://localhost:8000/blog"))
        .form(&[("email", email.as_str()), ("first_name", "Zawadi")])
        .await;
    assert_eq!(location(&response), "/blog?notice=subscribed");

    let response = app.server.get(&format!("/newsletter/unsubscribe/{}", email)).await;
    assert_eq!(location(&response), "/?notice=unsubscribed");

    app.server
        .post("/newsletter/subscribe")
        .form(&[("email", email.as_str()), ("first_name", "")])
        .await;

    let rows: Vec<(bool, String, Option<chrono::DateTime<chrono::Utc>>)> = sqlx::query_as(
        "SELECT is_active, first_name, unsubscribed_date FROM newsletter_subscribers WHERE email = $1",
    )
    .bind(&email)
    .fetch_all(&app.pool)
    .await
    .expect("Subscriber");
    assert_eq!(rows.len(), 1);
    assert!(rows[0].0);
    assert_eq!(rows[0].1, "Zawadi");
    assert!(rows[0].2.is_none());

    let response = app
        .server
        .post("/newsletter/subscribe")
        .form(&[("email", "not-an-email")])
        .await;
    assert_eq!(location(&response), "/?notice=newsletter-invalid");
}

#[tokio::test]
async fn test_short_search_returns_nothing() {
    let Some(app) = test_app().await else { return };
    let token = unique("zq");
    sqlx::query(
        "INSERT INTO blog_posts (title, slug, excerpt, content, category) \
         VALUES ($1, $1, 'Excerpt', 'Body', 'general')",
    )
    .bind(&token)
    .execute(&app.pool)
    .await
    .expect("Post stored");

    let short = app.server.get("/search").add_query_param("q", "zq").await;
    assert_eq!(short.status_code(), StatusCode::OK);
    assert!(!short.text().contains(&token));

    let found = app.server.get("/search").add_query_param("q", &token).await;
    assert!(found.text().contains(&token));
}

async fn staff_token(app: &TestApp) -> (String, Uuid) {
    let username = unique("staff");
    let email = format!("{}@suzstar.test", username);
    let staff = MigrationRunner::new(app.pool.clone())
        .create_staff_user(&username, &email, "Njeri Mwangi", "counsel2024")
        .await
        .expect("Staff created");

    let response = app
        .server
        .post("/admin/login")
        .json(&json!({ "email": email, "password": "counsel2024" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let token = body["data"]["token"].as_str().expect("token").to_string();
    (token, staff.user_id)
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).expect("Header")
}

#[tokio::test]
async fn test_admin_crud_round() {
    let Some(app) = test_app().await else { return };
    let (token, _) = staff_token(&app).await;
    let question = unique("confidential");

    let created = app
        .server
        .post("/admin/faqs")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "question": question, "answer": "Yes.", "category": "privacy" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let id = created.json::<Value>()["data"]["id"].as_i64().expect("id");

    let updated = app
        .server
        .put(&format!("/admin/faqs/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "is_active": false }))
        .await;
    let body: Value = updated.json();
    assert_eq!(body["data"]["is_active"], false);
    assert_eq!(body["data"]["answer"], "Yes.");

    let listed = app
        .server
        .get("/admin/faqs")
        .add_query_param("q", &question)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(listed.json::<Value>()["data"]["total_count"], 1);

    let missing = app
        .server
        .post("/admin/faqs")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "question": "Only a question" }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);

    let deleted = app
        .server
        .delete(&format!("/admin/faqs/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_site_settings_cannot_be_deleted() {
    let Some(app) = test_app().await else { return };
    MigrationRunner::new(app.pool.clone())
        .seed_initial_data("hello@suzstar.test")
        .await
        .expect("Seed");
    let (token, _) = staff_token(&app).await;

    let id: i64 = sqlx::query_scalar("SELECT id FROM site_settings LIMIT 1")
        .fetch_one(&app.pool)
        .await
        .expect("Settings row");

    let created = app
        .server
        .post("/admin/site-settings")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "phone": "0711111111", "email": "second@suzstar.test" }))
        .await;
    assert_eq!(created.json::<Value>()["data"]["id"], id);

    let deleted = app
        .server
        .delete(&format!("/admin/site-settings/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deactivated_staff_token_is_refused() {
    let Some(app) = test_app().await else { return };
    let (token, user_id) = staff_token(&app).await;

    let ok = app
        .server
        .get("/dashboard")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(ok.status_code(), StatusCode::OK);

    sqlx::query("UPDATE staff_users SET is_active = FALSE WHERE user_id = $1")
        .bind(user_id)
        .execute(&app.pool)
        .await
        .expect("Deactivate");

    let refused = app
        .server
        .get("/dashboard")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(refused.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_alert_recipient_survives_settings_failure() {
    let media = tempfile::tempdir().expect("Failed to create media dir");
    let (state, _) = state_with_pool(offline_pool(), media.path());
    let settings = SettingsService::new(&state);

    assert!(settings.admin_email().await.is_err());
    assert_eq!(settings.alert_recipient().await, state.config.site.contact_email);
}

#[tokio::test]
async fn test_public_pages_render() {
    let Some(app) = test_app().await else { return };
    let tag = unique("page");

    let service_id: i64 = sqlx::query_scalar(
        "INSERT INTO services (name, service_type, short_description, description) \
         VALUES ($1, 'individual', 'One to one', 'Long description') RETURNING id",
    )
    .bind(&tag)
    .fetch_one(&app.pool)
    .await
    .expect("Service");
    let counselor_id: i64 = sqlx::query_scalar(
        "INSERT INTO counselors (name, title, bio, specialties) \
         VALUES ($1, 'Counseling Psychologist', 'Bio', '{Anxiety,Grief}') RETURNING id",
    )
    .bind(&tag)
    .fetch_one(&app.pool)
    .await
    .expect("Counselor");
    sqlx::query(
        "INSERT INTO blog_posts (title, slug, excerpt, content, category, tags) \
         VALUES ($1, $1, 'Excerpt', 'Body', 'self_care', '{sleep}')",
    )
    .bind(&tag)
    .execute(&app.pool)
    .await
    .expect("Post");
    let resource_id: i64 = sqlx::query_scalar(
        "INSERT INTO resources (title, resource_type, description, category) \
         VALUES ($1, 'guide', 'Description', 'Stress') RETURNING id",
    )
    .bind(&tag)
    .fetch_one(&app.pool)
    .await
    .expect("Resource");
    let event_id = insert_event(&app.pool, 10, 2).await;
    sqlx::query("INSERT INTO faqs (question, answer, category) VALUES ($1, 'Yes.', 'fees')")
        .bind(&tag)
        .execute(&app.pool)
        .await
        .expect("FAQ");
    sqlx::query(
        "INSERT INTO testimonials (client_name, client_initials, testimonial, service_id, is_approved) \
         VALUES ('Achieng', 'A.O.', $1, $2, TRUE)",
    )
    .bind(&tag)
    .bind(service_id)
    .execute(&app.pool)
    .await
    .expect("Testimonial");

    let paths = [
        "/".to_string(),
        "/about".to_string(),
        "/services".to_string(),
        format!("/services/{}", service_id),
        "/blog".to_string(),
        format!("/blog/{}", tag),
        "/blog/category/self_care".to_string(),
        "/resources".to_string(),
        format!("/resources/{}", resource_id),
        "/events".to_string(),
        format!("/events/{}", event_id),
        format!("/events/{}/register", event_id),
        "/faq".to_string(),
        "/counselors".to_string(),
        format!("/counselors/{}", counselor_id),
        "/testimonials".to_string(),
        "/testimonials/share".to_string(),
        "/contact".to_string(),
        "/book-appointment".to_string(),
    ];
    for path in &paths {
        let response = app.server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::OK, "GET {}", path);
    }

    let faq = app.server.get("/faq").await;
    assert!(faq.text().contains(&tag));

    let booking = app.server.get("/book-appointment").await;
    assert!(booking.text().contains("Individual Counseling"));

    let found = app.server.get("/search").add_query_param("q", &tag).await;
    assert_eq!(found.status_code(), StatusCode::OK);
    assert!(found.text().contains(&format!("/blog/{}", tag)));
}

#[tokio::test]
async fn test_unknown_blog_category_lists_nothing() {
    let Some(app) = test_app().await else { return };
    let response = app.server.get("/blog/category/astrology").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("astrology"));
}

#[tokio::test]
async fn test_search_caps_each_bucket() {
    let Some(app) = test_app().await else { return };
    let token = unique("cap");
    for n in 0..7 {
        sqlx::query(
            "INSERT INTO blog_posts (title, slug, excerpt, content, category) \
             VALUES ($1, $1, 'Excerpt', 'Body', 'general')",
        )
        .bind(format!("{}-{}", token, n))
        .execute(&app.pool)
        .await
        .expect("Post stored");
    }

    let response = app.server.get("/search").add_query_param("q", &token).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let hits = response.text().matches(&format!("href=\"/blog/{}-", token)).count();
    assert_eq!(hits, 5);
}

#[tokio::test]
async fn test_resource_download_counts_and_streams() {
    let Some(app) = test_app().await else { return };
    let file_name = format!("resources/{}.pdf", unique("guide"));
    let full = app.media.path().join(&file_name);
    std::fs::create_dir_all(full.parent().expect("Parent")).expect("Media subdir");
    std::fs::write(&full, b"%PDF-1.4 breathing").expect("Write file");

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO resources (title, resource_type, description, file_upload) \
         VALUES ('Breathing guide', 'guide', 'Desc', $1) RETURNING id",
    )
    .bind(&file_name)
    .fetch_one(&app.pool)
    .await
    .expect("Resource");

    let response = app.server.get(&format!("/resources/download/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        format!("attachment; filename=\"{}\"", file_name).as_str()
    );
    assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.4 breathing");

    let count: i32 = sqlx::query_scalar("SELECT downloads_count FROM resources WHERE id = $1")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .expect("Count");
    assert_eq!(count, 1);

    let no_file: i64 = sqlx::query_scalar(
        "INSERT INTO resources (title, resource_type, description) \
         VALUES ('Article', 'article', 'Desc') RETURNING id",
    )
    .fetch_one(&app.pool)
    .await
    .expect("Resource");
    let response = app.server.get(&format!("/resources/download/{}", no_file)).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/resources/{}?notice=download-unavailable", no_file)
    );
}

#[tokio::test]
async fn test_admin_bulk_actions() {
    let Some(app) = test_app().await else { return };
    let (token, _) = staff_token(&app).await;
    let email = format!("{}@example.com", unique("bulk"));

    let appointment: i64 = sqlx::query_scalar(
        "INSERT INTO appointments (name, email, phone, preferred_date, preferred_time, appointment_type, concerns) \
         VALUES ('Kip', $1, '0712345678', CURRENT_DATE + 3, '09:00', 'individual', 'Sleep') RETURNING id",
    )
    .bind(&email)
    .fetch_one(&app.pool)
    .await
    .expect("Appointment");
    let response = app
        .server
        .post("/admin/appointments/actions/set-status")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "ids": [appointment], "status": "confirmed" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"]["updated"], 1);
    let status: String = sqlx::query_scalar("SELECT status FROM appointments WHERE id = $1")
        .bind(appointment)
        .fetch_one(&app.pool)
        .await
        .expect("Status");
    assert_eq!(status, "confirmed");

    let message: i64 = sqlx::query_scalar(
        "INSERT INTO contact_messages (name, email, subject, message) \
         VALUES ('Kip', $1, 'Hello', 'Hi') RETURNING id",
    )
    .bind(&email)
    .fetch_one(&app.pool)
    .await
    .expect("Message");
    let response = app
        .server
        .post("/admin/contact-messages/actions/mark-read")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "ids": [message] }))
        .await;
    assert_eq!(response.json::<Value>()["data"]["updated"], 1);
    let is_read: bool = sqlx::query_scalar("SELECT is_read FROM contact_messages WHERE id = $1")
        .bind(message)
        .fetch_one(&app.pool)
        .await
        .expect("Read flag");
    assert!(is_read);

    let subscriber: i64 = sqlx::query_scalar(
        "INSERT INTO newsletter_subscribers (email, first_name) VALUES ($1, 'Kip') RETURNING id",
    )
    .bind(&email)
    .fetch_one(&app.pool)
    .await
    .expect("Subscriber");
    let response = app
        .server
        .post("/admin/newsletter-subscribers/actions/export")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "ids": [subscriber] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "text/csv");
    let csv = response.text();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Email,First Name,Subscribed Date"));
    assert!(lines.next().is_some_and(|row| row.starts_with(&format!("{},Kip,", email))));
}
