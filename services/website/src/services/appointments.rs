use serde_json::{json, Value};
use sqlx::PgPool;
use suzstar_common::{AppError, FieldErrors};
use suzstar_database::{Appointment, Counselor};

use super::{AppState, SettingsService};
use crate::forms::{invalid_choice, NewAppointment};
use crate::notifications::{Notifier, OutgoingEmail};

pub struct AppointmentService {
    db_pool: PgPool,
    notifier: Notifier,
    settings: SettingsService,
}

impl AppointmentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            notifier: state.notifier.clone(),
            settings: SettingsService::new(state),
        }
    }

    /// Stores a booking request as `pending` and notifies the client and staff.
    ///
    /// A chosen counselor must exist and be active; otherwise the form error
    /// is returned on the `counselor` field.
    pub async fn book(&self, request: NewAppointment) -> Result<Appointment, AppError> {
        let counselor = match request.counselor_id {
            Some(id) => match self.active_counselor(id).await? {
                Some(counselor) => Some(counselor),
                None => {
                    let mut errors = FieldErrors::new();
                    errors.add("counselor", invalid_choice(&id.to_string()));
                    return Err(errors.into());
                }
            },
            None => None,
        };

        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                name, email, phone, preferred_date, preferred_time, appointment_type,
                session_mode, counselor_id, concerns, is_new_client, hear_about_us
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(request.preferred_date)
        .bind(request.preferred_time)
        .bind(request.appointment_type.as_str())
        .bind(request.session_mode.as_str())
        .bind(request.counselor_id)
        .bind(&request.concerns)
        .bind(request.is_new_client)
        .bind(&request.hear_about_us)
        .fetch_one(&self.db_pool)
        .await
        .map_err(AppError::from_db)?;

        tracing::info!(
            appointment_id = appointment.id,
            appointment_type = appointment.appointment_type.as_str(),
            "Appointment requested"
        );

        let context = email_context(&appointment, counselor.as_ref());
        let admin_email = self.settings.alert_recipient().await;
        self.notifier
            .dispatch(vec![
                OutgoingEmail::new(
                    appointment.email.clone(),
                    "Appointment Request Received - Suzstar Counseling",
                    "appointment_confirmation",
                    context.clone(),
                ),
                OutgoingEmail::new(
                    admin_email,
                    format!("New Appointment Booking: {}", appointment.name),
                    "admin_appointment_notification",
                    context,
                ),
            ])
            .await;

        Ok(appointment)
    }

    pub async fn get(&self, id: i64) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment".to_string()))
    }

    /// The counselor an appointment names, active or not.
    pub async fn counselor_for(&self, appointment: &Appointment) -> Result<Option<Counselor>, AppError> {
        let Some(id) = appointment.counselor_id else {
            return Ok(None);
        };
        sqlx::query_as::<_, Counselor>("SELECT * FROM counselors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(AppError::Database)
    }

    async fn active_counselor(&self, id: i64) -> Result<Option<Counselor>, AppError> {
        sqlx::query_as::<_, Counselor>("SELECT * FROM counselors WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(AppError::Database)
    }
}

fn email_context(appointment: &Appointment, counselor: Option<&Counselor>) -> Value {
    json!({
        "name": appointment.name,
        "email": appointment.email,
        "phone": appointment.phone,
        "preferred_date": appointment.preferred_date,
        "preferred_time": appointment.preferred_time,
        "appointment_type": appointment.appointment_type,
        "session_mode": appointment.session_mode,
        "counselor_name": counselor.map(|c| c.name.as_str()),
        "concerns": appointment.concerns,
        "is_new_client": appointment.is_new_client,
        "hear_about_us": appointment.hear_about_us,
    })
}
