use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use suzstar_common::{AppError, AppointmentType};
use suzstar_database::Appointment;

use super::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TypeCount {
    #[sqlx(try_from = "String")]
    pub appointment_type: AppointmentType,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_appointments: i64,
    pub pending_appointments: i64,
    pub confirmed_appointments: i64,
    pub completed_appointments: i64,
    pub recent_appointments: Vec<Appointment>,
    pub total_blog_posts: i64,
    pub published_posts: i64,
    pub unread_messages: i64,
    pub total_subscribers: i64,
    pub upcoming_events: i64,
    pub last_7_days: Vec<DayCount>,
    pub appointment_types: Vec<TypeCount>,
}

#[derive(FromRow)]
struct Totals {
    total_appointments: i64,
    pending_appointments: i64,
    confirmed_appointments: i64,
    completed_appointments: i64,
    total_blog_posts: i64,
    published_posts: i64,
    unread_messages: i64,
    total_subscribers: i64,
    upcoming_events: i64,
}

/// One entry per day from six days ago through `today`, zero-filled.
pub fn week_series(today: NaiveDate, counts: &[(NaiveDate, i64)]) -> Vec<DayCount> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let count = counts
                .iter()
                .find(|(day, _)| *day == date)
                .map(|(_, count)| *count)
                .unwrap_or(0);
            DayCount {
                date,
                label: date.format("%a").to_string(),
                count,
            }
        })
        .collect()
}

pub struct DashboardService {
    db_pool: PgPool,
}

impl DashboardService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
        }
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let totals = sqlx::query_as::<_, Totals>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM appointments) AS total_appointments,
                (SELECT COUNT(*) FROM appointments WHERE status = 'pending') AS pending_appointments,
                (SELECT COUNT(*) FROM appointments WHERE status = 'confirmed') AS confirmed_appointments,
                (SELECT COUNT(*) FROM appointments WHERE status = 'completed') AS completed_appointments,
                (SELECT COUNT(*) FROM blog_posts) AS total_blog_posts,
                (SELECT COUNT(*) FROM blog_posts WHERE is_published) AS published_posts,
                (SELECT COUNT(*) FROM contact_messages WHERE NOT is_read) AS unread_messages,
                (SELECT COUNT(*) FROM newsletter_subscribers WHERE is_active) AS total_subscribers,
                (SELECT COUNT(*) FROM events WHERE is_published AND start_date >= NOW()) AS upcoming_events
            "#,
        )
        .fetch_one(&self.db_pool)
        .await?;

        let recent_appointments = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments ORDER BY created_at DESC LIMIT 10",
        )
        .fetch_all(&self.db_pool)
        .await?;

        let today = Utc::now().date_naive();
        let daily: Vec<(NaiveDate, i64)> = sqlx::query_as(
            "SELECT preferred_date, COUNT(*) FROM appointments \
             WHERE preferred_date BETWEEN $1 AND $2 GROUP BY preferred_date",
        )
        .bind(today - Duration::days(6))
        .bind(today)
        .fetch_all(&self.db_pool)
        .await?;

        let appointment_types = sqlx::query_as::<_, TypeCount>(
            "SELECT appointment_type, COUNT(*) AS count FROM appointments \
             GROUP BY appointment_type ORDER BY count DESC, appointment_type",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(DashboardStats {
            total_appointments: totals.total_appointments,
            pending_appointments: totals.pending_appointments,
            confirmed_appointments: totals.confirmed_appointments,
            completed_appointments: totals.completed_appointments,
            recent_appointments,
            total_blog_posts: totals.total_blog_posts,
            published_posts: totals.published_posts,
            unread_messages: totals.unread_messages,
            total_subscribers: totals.total_subscribers,
            upcoming_events: totals.upcoming_events,
            last_7_days: week_series(today, &daily),
            appointment_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_series_is_zero_filled_and_ordered() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
        let counts = vec![(today, 3), (today - Duration::days(6), 1)];
        let series = week_series(today, &counts);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(series[0].label, "Mon");
        assert_eq!(series[0].count, 1);
        assert_eq!(series[6].label, "Sun");
        assert_eq!(series[6].count, 3);
        assert!(series[1..6].iter().all(|d| d.count == 0));
    }
}
