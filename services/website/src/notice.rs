use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use serde::Serialize;
use std::convert::Infallible;

/// Short messages carried across a redirect in the `notice` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ContactSent,
    AppointmentBooked,
    EventFull,
    Registered,
    DownloadUnavailable,
    Subscribed,
    NewsletterInvalid,
    Unsubscribed,
    SubscriberNotFound,
    TestimonialReceived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoticeView {
    pub message: &'static str,
    pub level: NoticeLevel,
}

impl Notice {
    const ALL: [Notice; 10] = [
        Notice::ContactSent,
        Notice::AppointmentBooked,
        Notice::EventFull,
        Notice::Registered,
        Notice::DownloadUnavailable,
        Notice::Subscribed,
        Notice::NewsletterInvalid,
        Notice::Unsubscribed,
        Notice::SubscriberNotFound,
        Notice::TestimonialReceived,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Notice::ContactSent => "contact-sent",
            Notice::AppointmentBooked => "appointment-booked",
            Notice::EventFull => "event-full",
            Notice::Registered => "registered",
            Notice::DownloadUnavailable => "download-unavailable",
            Notice::Subscribed => "subscribed",
            Notice::NewsletterInvalid => "newsletter-invalid",
            Notice::Unsubscribed => "unsubscribed",
            Notice::SubscriberNotFound => "subscriber-not-found",
            Notice::TestimonialReceived => "testimonial-received",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::ContactSent => "Thank you for your message. We will get back to you soon!",
            Notice::AppointmentBooked => "Your appointment request has been submitted successfully!",
            Notice::EventFull => "Sorry, this event is already full.",
            Notice::Registered => "You have successfully registered for this event!",
            Notice::DownloadUnavailable => "This resource is not available for download.",
            Notice::Subscribed => "Thank you for subscribing to our newsletter!",
            Notice::NewsletterInvalid => "Please enter a valid email address.",
            Notice::Unsubscribed => "You have been unsubscribed from our newsletter.",
            Notice::SubscriberNotFound => "Email not found in our subscription list.",
            Notice::TestimonialReceived => {
                "Thank you for sharing your experience! It will appear once approved."
            }
        }
    }

    pub fn level(self) -> NoticeLevel {
        match self {
            Notice::EventFull
            | Notice::DownloadUnavailable
            | Notice::NewsletterInvalid
            | Notice::SubscriberNotFound => NoticeLevel::Error,
            _ => NoticeLevel::Success,
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.slug() == slug)
    }

    pub fn view(self) -> NoticeView {
        NoticeView {
            message: self.message(),
            level: self.level(),
        }
    }
}

/// 303 redirect to `path` carrying the notice.
pub fn redirect_with(path: &str, notice: Notice) -> Redirect {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{}{}notice={}", path, separator, notice.slug()))
}

/// Extracts the notice named by the request's `notice` query parameter, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flash(pub Option<Notice>);

impl Flash {
    pub fn view(&self) -> Option<NoticeView> {
        self.0.map(Notice::view)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Flash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let notice = parts.uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "notice")
                .and_then(|(_, value)| Notice::from_slug(&value))
        });
        Ok(Flash(notice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};
    use axum::response::IntoResponse;

    #[test]
    fn slugs_round_trip() {
        for notice in Notice::ALL {
            assert_eq!(Notice::from_slug(notice.slug()), Some(notice));
        }
        assert_eq!(Notice::from_slug("bogus"), None);
    }

    #[test]
    fn redirect_is_see_other_with_query() {
        let response = redirect_with("/contact", Notice::ContactSent).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/contact?notice=contact-sent"
        );

        let response = redirect_with("/blog?page=2", Notice::Subscribed).into_response();
        assert_eq!(response.headers()[header::LOCATION], "/blog?page=2&notice=subscribed");
    }

    #[tokio::test]
    async fn flash_reads_notice_parameter() {
        let request = Request::builder()
            .uri("/events/4?notice=event-full")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let Flash(notice) = Flash::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(notice, Some(Notice::EventFull));
        assert_eq!(Notice::EventFull.level(), NoticeLevel::Error);
    }
}
