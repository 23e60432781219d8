use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use suzstar_common::AppError;
use suzstar_database::{non_empty, Condition, Event, EventRegistration, ListQuery};

use super::AppState;
use crate::forms::NewRegistration;
use crate::notifications::{Notifier, OutgoingEmail};

pub const EVENT_ORDER: &str = "start_date";
pub const PAST_EVENT_LIMIT: i64 = 6;

/// An event together with the derived values pages display.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub is_full: bool,
    pub spots_left: Option<i32>,
    pub is_upcoming: bool,
    pub is_free: bool,
}

impl EventView {
    pub fn new(event: Event, now: DateTime<Utc>) -> Self {
        Self {
            is_full: event.is_full(),
            spots_left: event.spots_left(),
            is_upcoming: event.is_upcoming(now),
            is_free: event.price.is_zero(),
            event,
        }
    }
}

fn views(events: Vec<Event>) -> Vec<EventView> {
    let now = Utc::now();
    events.into_iter().map(|e| EventView::new(e, now)).collect()
}

pub struct EventService {
    db_pool: PgPool,
    notifier: Notifier,
}

impl EventService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            notifier: state.notifier.clone(),
        }
    }

    fn published() -> ListQuery {
        ListQuery::new("events", EVENT_ORDER).filter(Condition::Bool("is_published", true))
    }

    pub async fn upcoming(&self, event_type: Option<&str>, limit: Option<i64>) -> Result<Vec<EventView>, AppError> {
        let query = Self::published()
            .filter(Condition::Raw("start_date >= NOW()"))
            .filter_opt(non_empty(event_type).map(|t| Condition::Text("event_type", t.to_string())));
        let events = match limit {
            Some(limit) => query.fetch_limited(&self.db_pool, limit).await?,
            None => query.fetch_all(&self.db_pool).await?,
        };
        Ok(views(events))
    }

    pub async fn past(&self) -> Result<Vec<EventView>, AppError> {
        let events = Self::published()
            .filter(Condition::Raw("start_date < NOW()"))
            .fetch_limited(&self.db_pool, PAST_EVENT_LIMIT)
            .await?;
        Ok(views(events))
    }

    pub async fn published_event(&self, id: i64) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 AND is_published")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event".to_string()))
    }

    /// Takes a seat and records the registration in one transaction.
    ///
    /// The seat is claimed with a conditional update, so concurrent
    /// registrations can never push `current_participants` past the limit.
    /// A full event yields [`AppError::Capacity`] and changes nothing.
    pub async fn register(&self, event_id: i64, registration: NewRegistration) -> Result<(Event, EventRegistration), AppError> {
        let mut tx = self.db_pool.begin().await?;

        let claimed = sqlx::query_as::<_, Event>(
            "UPDATE events SET current_participants = current_participants + 1 \
             WHERE id = $1 AND is_published \
             AND (max_participants = 0 OR current_participants < max_participants) \
             RETURNING *",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(event) = claimed else {
            tx.rollback().await?;
            self.published_event(event_id).await?;
            tracing::info!(event_id, "Registration refused, event is full");
            return Err(AppError::Capacity("Sorry, this event is already full.".to_string()));
        };

        let record = sqlx::query_as::<_, EventRegistration>(
            "INSERT INTO event_registrations (event_id, name, email, phone) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(event_id)
        .bind(&registration.name)
        .bind(&registration.email)
        .bind(&registration.phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from_db)?;

        tx.commit().await?;

        tracing::info!(
            event_id,
            registration_id = record.id,
            participants = event.current_participants,
            "Event registration recorded"
        );

        self.notifier
            .dispatch(vec![OutgoingEmail::new(
                record.email.clone(),
                format!("Registration Confirmation: {}", event.title),
                "event_registration",
                json!({
                    "name": record.name,
                    "title": event.title,
                    "start_date": event.start_date,
                    "is_online": event.is_online,
                    "location": event.location,
                    "online_link": event.online_link,
                }),
            )])
            .await;

        Ok((event, record))
    }
}
