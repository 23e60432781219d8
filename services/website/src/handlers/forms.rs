//! Public forms: GET renders the empty form, POST validates and either
//! re-renders with field errors or writes and redirects with a notice.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Form,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use suzstar_common::{AppError, AppointmentType, Choice, FieldErrors, SessionMode};

use super::render;
use crate::error::PageError;
use crate::forms::{AppointmentForm, ContactForm, EventRegistrationForm, NewsletterForm, TestimonialForm};
use crate::notice::{redirect_with, Flash, Notice};
use crate::services::{
    AppState, AppointmentService, ContactService, ContentService, EventService, NewsletterService,
    TestimonialService,
};

type FormResult = Result<Response, PageError>;

const RATINGS: [i32; 5] = [1, 2, 3, 4, 5];

fn with_form<F: Serialize>(mut context: Value, form: &F, errors: &FieldErrors) -> Value {
    context["form"] = json!(form);
    context["errors"] = json!(errors);
    context
}

// ---------------------------------------------------------------------------
// Contact

async fn contact_page(state: &AppState, flash: Flash, form: &ContactForm, errors: &FieldErrors) -> FormResult {
    let context = with_form(json!({}), form, errors);
    Ok(render(state, flash, "contact", "Contact Us", context).await?.into_response())
}

pub async fn contact(State(state): State<AppState>, flash: Flash) -> FormResult {
    contact_page(&state, flash, &ContactForm::default(), &FieldErrors::new()).await
}

pub async fn contact_submit(State(state): State<AppState>, Form(form): Form<ContactForm>) -> FormResult {
    let message = match form.clone().clean() {
        Ok(message) => message,
        Err(errors) => return contact_page(&state, Flash::default(), &form, &errors).await,
    };

    let (saved, report) = ContactService::new(&state).submit(message).await?;
    tracing::info!(message_id = saved.id, delivered = report.delivered, "Contact form handled");
    Ok(redirect_with("/contact", Notice::ContactSent).into_response())
}

// ---------------------------------------------------------------------------
// Appointment booking

async fn booking_page(
    state: &AppState,
    flash: Flash,
    form: &AppointmentForm,
    errors: &FieldErrors,
) -> FormResult {
    let counselors = ContentService::new(state).counselors().await?;
    let context = with_form(
        json!({
            "appointment_types": AppointmentType::options(),
            "session_modes": SessionMode::options(),
            "counselors": counselors,
            "min_date": Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        }),
        form,
        errors,
    );
    Ok(render(state, flash, "book_appointment", "Book an Appointment", context)
        .await?
        .into_response())
}

pub async fn book_appointment(State(state): State<AppState>, flash: Flash) -> FormResult {
    booking_page(&state, flash, &AppointmentForm::initial(), &FieldErrors::new()).await
}

pub async fn book_appointment_submit(
    State(state): State<AppState>,
    Form(form): Form<AppointmentForm>,
) -> FormResult {
    let request = match form.clone().clean(Utc::now().date_naive()) {
        Ok(request) => request,
        Err(errors) => return booking_page(&state, Flash::default(), &form, &errors).await,
    };

    match AppointmentService::new(&state).book(request).await {
        Ok(appointment) => Ok(redirect_with(
            &format!("/appointment-success/{}", appointment.id),
            Notice::AppointmentBooked,
        )
        .into_response()),
        Err(AppError::InvalidForm(errors)) => booking_page(&state, Flash::default(), &form, &errors).await,
        Err(e) => Err(e.into()),
    }
}

pub async fn appointment_success(
    State(state): State<AppState>,
    flash: Flash,
    Path(id): Path<i64>,
) -> FormResult {
    let appointments = AppointmentService::new(&state);
    let appointment = appointments.get(id).await?;
    let counselor = appointments.counselor_for(&appointment).await?;
    let context = json!({ "appointment": appointment, "counselor": counselor });
    Ok(render(&state, flash, "appointment_success", "Appointment Requested", context)
        .await?
        .into_response())
}

// ---------------------------------------------------------------------------
// Event registration

async fn registration_page(
    state: &AppState,
    flash: Flash,
    event_id: i64,
    form: &EventRegistrationForm,
    errors: &FieldErrors,
) -> FormResult {
    let event = EventService::new(state).published_event(event_id).await?;
    let title = format!("Register: {}", event.title);
    let context = with_form(json!({ "event": event }), form, errors);
    Ok(render(state, flash, "event_register", &title, context).await?.into_response())
}

pub async fn event_register(State(state): State<AppState>, flash: Flash, Path(id): Path<i64>) -> FormResult {
    registration_page(&state, flash, id, &EventRegistrationForm::default(), &FieldErrors::new()).await
}

pub async fn event_register_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<EventRegistrationForm>,
) -> FormResult {
    let registration = match form.clone().clean() {
        Ok(registration) => registration,
        Err(errors) => return registration_page(&state, Flash::default(), id, &form, &errors).await,
    };

    let event_page = format!("/events/{}", id);
    match EventService::new(&state).register(id, registration).await {
        Ok(_) => Ok(redirect_with(&event_page, Notice::Registered).into_response()),
        Err(AppError::Capacity(reason)) => {
            tracing::info!(event_id = id, reason = %reason, "Registration refused");
            Ok(redirect_with(&event_page, Notice::EventFull).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Newsletter

/// Path of the page the form was posted from; `/` when absent or foreign.
fn referer_path(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| url::Url::parse(value).ok())
        .map(|url| url.path().to_string())
        .filter(|path| path.starts_with('/'))
        .unwrap_or_else(|| "/".to_string())
}

pub async fn newsletter_subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<NewsletterForm>,
) -> FormResult {
    let back = referer_path(&headers);
    let request = match form.clean() {
        Ok(request) => request,
        Err(errors) => {
            tracing::debug!(errors = %errors, "Newsletter signup rejected");
            return Ok(redirect_with(&back, Notice::NewsletterInvalid).into_response());
        }
    };

    NewsletterService::new(&state).subscribe(request).await?;
    Ok(redirect_with(&back, Notice::Subscribed).into_response())
}

pub async fn newsletter_unsubscribe(State(state): State<AppState>, Path(email): Path<String>) -> FormResult {
    let notice = if NewsletterService::new(&state).unsubscribe(&email).await? {
        Notice::Unsubscribed
    } else {
        Notice::SubscriberNotFound
    };
    Ok(redirect_with("/", notice).into_response())
}

// ---------------------------------------------------------------------------
// Testimonial sharing

async fn share_page(state: &AppState, flash: Flash, form: &TestimonialForm, errors: &FieldErrors) -> FormResult {
    let services = ContentService::new(state).active_service_list().await?;
    let context = with_form(json!({ "ratings": RATINGS, "services": services }), form, errors);
    Ok(render(state, flash, "testimonial_share", "Share Your Story", context)
        .await?
        .into_response())
}

pub async fn testimonial_share(State(state): State<AppState>, flash: Flash) -> FormResult {
    share_page(&state, flash, &TestimonialForm::initial(), &FieldErrors::new()).await
}

pub async fn testimonial_share_submit(
    State(state): State<AppState>,
    Form(form): Form<TestimonialForm>,
) -> FormResult {
    let request = match form.clone().clean() {
        Ok(request) => request,
        Err(errors) => return share_page(&state, Flash::default(), &form, &errors).await,
    };

    match TestimonialService::new(&state).submit(request).await {
        Ok(_) => Ok(redirect_with("/testimonials", Notice::TestimonialReceived).into_response()),
        Err(AppError::InvalidForm(errors)) => share_page(&state, Flash::default(), &form, &errors).await,
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn referer_path_drops_host_and_query() {
        let mut headers = HeaderMap::new();
        assert_eq!(referer_path(&headers), "/");

        headers.insert(
            header::REFERER,
            HeaderValue::from_static("http://localhost:8000/blog/sleep-and-anxiety?notice=subscribed"),
        );
        assert_eq!(referer_path(&headers), "/blog/sleep-and-anxiety");

        headers.insert(header::REFERER, HeaderValue::from_static("not a url"));
        assert_eq!(referer_path(&headers), "/");
    }
}
