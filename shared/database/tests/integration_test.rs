use suzstar_common::DatabaseConfig;
use suzstar_database::{create_pool, Condition, ListQuery, MigrationRunner, Paginator, SiteSetting, Faq};

async fn test_pool() -> Option<sqlx::PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            println!("Skipping database test - DATABASE_URL not set");
            return None;
        }
    };

    let config = DatabaseConfig::from_url(&url).expect("DATABASE_URL must be a postgres URL");
    let pool = create_pool(&config).await.expect("Failed to connect to database");
    MigrationRunner::new(pool.clone())
        .run_all_migrations()
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

#[tokio::test]
async fn test_migrations_create_tables() {
    let Some(pool) = test_pool().await else { return };

    let runner = MigrationRunner::new(pool.clone());
    let status = runner.check_migration_status().await.expect("Failed to read status");
    assert!(status.is_up_to_date, "{}", status);

    let table_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'public' \
         AND table_name IN ('services', 'counselors', 'blog_posts', 'appointments', 'contact_messages', \
         'resources', 'testimonials', 'faqs', 'events', 'event_registrations', \
         'newsletter_subscribers', 'site_settings', 'staff_users')",
    )
    .fetch_one(&pool)
    .await
    .expect("Failed to count tables");

    assert_eq!(table_count, 13);
}

#[tokio::test]
async fn test_site_settings_stay_singleton() {
    let Some(pool) = test_pool().await else { return };

    let runner = MigrationRunner::new(pool.clone());
    runner.seed_initial_data("hello@suzstar.test").await.expect("Failed to seed");
    runner.seed_initial_data("other@suzstar.test").await.expect("Seeding twice must succeed");

    let rows: Vec<SiteSetting> = sqlx::query_as("SELECT * FROM site_settings")
        .fetch_all(&pool)
        .await
        .expect("Failed to load settings");
    assert_eq!(rows.len(), 1);

    let second = sqlx::query(
        "INSERT INTO site_settings (phone, email) VALUES ('0700000000', 'x@y.z') ON CONFLICT DO NOTHING",
    )
    .execute(&pool)
    .await
    .expect("Conflicting insert should be ignored");
    assert_eq!(second.rows_affected(), 0);
}

#[tokio::test]
async fn test_seeded_faqs_are_listed_in_order() {
    let Some(pool) = test_pool().await else { return };

    MigrationRunner::new(pool.clone())
        .seed_initial_data("hello@suzstar.test")
        .await
        .expect("Failed to seed");

    let page = ListQuery::new("faqs", "category, display_order")
        .filter(Condition::Bool("is_active", true))
        .fetch_page::<Faq>(&pool, Paginator::new(100), None)
        .await
        .expect("Failed to list FAQs");

    assert!(page.total_count >= 5);
    let categories: Vec<&str> = page.items.iter().map(|f| f.category.as_str()).collect();
    let mut sorted = categories.clone();
    sorted.sort();
    assert_eq!(categories, sorted);
}
