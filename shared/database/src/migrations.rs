use sqlx::migrate::Migrate;
use sqlx::PgPool;
use suzstar_auth::PasswordService;
use suzstar_common::{AppError, FaqCategory};

use crate::models::StaffUser;

const DEFAULT_FAQS: &[(FaqCategory, &str, &str)] = &[
    (
        FaqCategory::General,
        "Who can benefit from counseling?",
        "Anyone facing stress, anxiety, low mood, relationship difficulties or life transitions. You do not need a crisis to seek support.",
    ),
    (
        FaqCategory::Appointments,
        "How do I book a session?",
        "Use the Book Appointment page. We confirm every request by phone or email within one working day.",
    ),
    (
        FaqCategory::Online,
        "Do you offer online sessions?",
        "Yes. Sessions are available by video, voice call or phone for clients anywhere in Kenya.",
    ),
    (
        FaqCategory::Fees,
        "How much does a session cost?",
        "Fees depend on the service. Each service page lists its price range, and sliding-scale rates are available on request.",
    ),
    (
        FaqCategory::Privacy,
        "Is what I share kept confidential?",
        "Yes. Everything discussed in session stays between you and your counselor, except where the law requires disclosure to keep someone safe.",
    ),
];

pub struct MigrationRunner {
    pool: PgPool,
}

impl MigrationRunner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_all_migrations(&self) -> Result<(), AppError> {
        tracing::info!("Starting database migrations...");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.into()))?;

        tracing::info!("All migrations completed successfully");
        Ok(())
    }

    pub async fn check_migration_status(&self) -> Result<MigrationStatus, AppError> {
        let migrator = sqlx::migrate!("./migrations");
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;

        conn.ensure_migrations_table()
            .await
            .map_err(|e| AppError::Database(e.into()))?;
        let applied = conn
            .list_applied_migrations()
            .await
            .map_err(|e| AppError::Database(e.into()))?;

        let total_migrations = migrator.iter().count();
        let applied_count = applied.len();
        let pending_count = total_migrations.saturating_sub(applied_count);

        Ok(MigrationStatus {
            total: total_migrations,
            applied: applied_count,
            pending: pending_count,
            is_up_to_date: pending_count == 0,
        })
    }

    /// Inserts the settings row (when absent) and the default FAQ entries
    /// (when the table is empty). Safe to run repeatedly.
    pub async fn seed_initial_data(&self, contact_email: &str) -> Result<(), AppError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO site_settings (site_name, tagline, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind("Suzstar Counseling")
        .bind("Walking with you towards mental wellness")
        .bind("0712345678")
        .bind(contact_email)
        .bind("Nairobi, Kenya")
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?
        .rows_affected();

        if inserted > 0 {
            tracing::info!("Site settings created");
        }

        let faq_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM faqs")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if faq_count == 0 {
            for (order, (category, question, answer)) in DEFAULT_FAQS.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO faqs (question, answer, category, display_order) VALUES ($1, $2, $3, $4)",
                )
                .bind(*question)
                .bind(*answer)
                .bind(category.as_str())
                .bind(order as i32)
                .execute(&self.pool)
                .await
                .map_err(AppError::Database)?;
            }
            tracing::info!(count = DEFAULT_FAQS.len(), "Default FAQs created");
        }

        Ok(())
    }

    pub async fn create_staff_user(
        &self,
        username: &str,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<StaffUser, AppError> {
        PasswordService::validate_password_strength(password)?;
        let hashed_password = PasswordService::hash_password(password)?;

        let user = sqlx::query_as::<_, StaffUser>(
            r#"
            INSERT INTO staff_users (username, email, full_name, hashed_password)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email.to_lowercase())
        .bind(full_name)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_db)?;

        tracing::info!(username = %user.username, "Staff user created");
        Ok(user)
    }
}

#[derive(Debug)]
pub struct MigrationStatus {
    pub total: usize,
    pub applied: usize,
    pub pending: usize,
    pub is_up_to_date: bool,
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Migrations: {}/{} applied, {} pending",
            self.applied, self.total, self.pending
        )
    }
}
