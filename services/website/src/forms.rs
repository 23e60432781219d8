//! Public form submissions.
//!
//! Each form deserializes leniently (every field defaults to empty so a
//! missing input is reported as a field error rather than rejected by the
//! extractor) and is turned into a normalized record by `clean`, which
//! returns either the record or a field -> message map. Nothing is written
//! until `clean` succeeds.

use std::borrow::Cow;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use suzstar_common::{AppointmentType, Choice, FieldErrors, SessionMode};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const PHONE_MESSAGE: &str =
    "Enter a valid Kenyan phone number (e.g., 0712345678 or +254712345678)";
pub const INITIALS_MESSAGE: &str = "Initials must be 10 characters or less";
pub const EMAIL_MESSAGE: &str = "Enter a valid email address.";
pub const DATE_MESSAGE: &str = "Enter a valid date.";
pub const TIME_MESSAGE: &str = "Enter a valid time.";
pub const PAST_DATE_MESSAGE: &str = "Please choose a date that is today or later.";

static KENYAN_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+254|0)7[0-9]{8}$").expect("phone pattern is valid")
});

pub fn is_kenyan_phone(phone: &str) -> bool {
    KENYAN_PHONE.is_match(phone)
}

pub fn validate_kenyan_phone(phone: &str) -> Result<(), ValidationError> {
    if is_kenyan_phone(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("kenyan_phone");
        err.message = Some(Cow::Borrowed(PHONE_MESSAGE));
        Err(err)
    }
}

/// Same rule, but an empty value is accepted.
pub fn validate_optional_kenyan_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        Ok(())
    } else {
        validate_kenyan_phone(phone)
    }
}

pub fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {} is not one of the available choices.", value)
}

fn require(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED_MESSAGE);
    }
}

pub(crate) fn merge(errors: &mut FieldErrors, result: Result<(), ValidationErrors>) {
    if let Err(validation) = result {
        for (field, list) in validation.field_errors() {
            for err in list {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                errors.add(field, message);
            }
        }
    }
}

fn parse_choice<T: Choice + FromStr>(errors: &mut FieldErrors, field: &str, value: &str) -> Option<T> {
    if value.is_empty() {
        return None;
    }
    match value.parse::<T>() {
        Ok(choice) => Some(choice),
        Err(_) => {
            errors.add(field, invalid_choice(value));
            None
        }
    }
}

fn parse_optional_id(errors: &mut FieldErrors, field: &str, value: &str) -> Option<i64> {
    if value.is_empty() {
        return None;
    }
    match value.parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.add(field, invalid_choice(value));
            None
        }
    }
}

fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

// ---------------------------------------------------------------------------
// Contact

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContactForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom = "validate_optional_kenyan_phone")]
    pub phone: String,
    #[validate(length(max = 300, message = "Ensure this value has at most 300 characters."))]
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn clean(mut self) -> Result<NewContactMessage, FieldErrors> {
        for field in [&mut self.name, &mut self.email, &mut self.phone, &mut self.subject, &mut self.message] {
            trim(field);
        }

        let mut errors = FieldErrors::new();
        require(&mut errors, "name", &self.name);
        require(&mut errors, "email", &self.email);
        require(&mut errors, "subject", &self.subject);
        require(&mut errors, "message", &self.message);
        merge(&mut errors, self.validate());

        errors.into_result(NewContactMessage {
            name: self.name,
            email: self.email,
            phone: self.phone,
            subject: self.subject,
            message: self.message,
        })
    }
}

// ---------------------------------------------------------------------------
// Appointment booking

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppointmentForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom = "validate_kenyan_phone")]
    pub phone: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub appointment_type: String,
    pub session_mode: String,
    pub counselor: String,
    pub concerns: String,
    /// Checkbox: present when ticked.
    pub is_new_client: Option<String>,
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub hear_about_us: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub appointment_type: AppointmentType,
    pub session_mode: SessionMode,
    pub counselor_id: Option<i64>,
    pub concerns: String,
    pub is_new_client: bool,
    pub hear_about_us: String,
}

impl AppointmentForm {
    /// Values the empty booking form starts with.
    pub fn initial() -> Self {
        Self {
            session_mode: SessionMode::default().as_str().to_string(),
            is_new_client: Some("on".to_string()),
            ..Self::default()
        }
    }

    pub fn clean(mut self, today: NaiveDate) -> Result<NewAppointment, FieldErrors> {
        for field in [
            &mut self.name,
            &mut self.email,
            &mut self.phone,
            &mut self.preferred_date,
            &mut self.preferred_time,
            &mut self.appointment_type,
            &mut self.session_mode,
            &mut self.counselor,
            &mut self.concerns,
            &mut self.hear_about_us,
        ] {
            trim(field);
        }

        let mut errors = FieldErrors::new();
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("preferred_date", &self.preferred_date),
            ("preferred_time", &self.preferred_time),
            ("appointment_type", &self.appointment_type),
            ("concerns", &self.concerns),
        ] {
            require(&mut errors, field, value);
        }
        merge(&mut errors, self.validate());

        let preferred_date = if self.preferred_date.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(&self.preferred_date, "%Y-%m-%d") {
                Ok(date) if date < today => {
                    errors.add("preferred_date", PAST_DATE_MESSAGE);
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("preferred_date", DATE_MESSAGE);
                    None
                }
            }
        };

        let preferred_time = if self.preferred_time.is_empty() {
            None
        } else {
            let parsed = NaiveTime::parse_from_str(&self.preferred_time, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(&self.preferred_time, "%H:%M:%S"));
            match parsed {
                Ok(time) => Some(time),
                Err(_) => {
                    errors.add("preferred_time", TIME_MESSAGE);
                    None
                }
            }
        };

        let appointment_type =
            parse_choice::<AppointmentType>(&mut errors, "appointment_type", &self.appointment_type);
        let session_mode = if self.session_mode.is_empty() {
            Some(SessionMode::default())
        } else {
            parse_choice::<SessionMode>(&mut errors, "session_mode", &self.session_mode)
        };
        let counselor_id = parse_optional_id(&mut errors, "counselor", &self.counselor);

        match (preferred_date, preferred_time, appointment_type, session_mode) {
            (Some(preferred_date), Some(preferred_time), Some(appointment_type), Some(session_mode))
                if errors.is_empty() =>
            {
                Ok(NewAppointment {
                    name: self.name,
                    email: self.email,
                    phone: self.phone,
                    preferred_date,
                    preferred_time,
                    appointment_type,
                    session_mode,
                    counselor_id,
                    concerns: self.concerns,
                    is_new_client: self.is_new_client.is_some(),
                    hear_about_us: self.hear_about_us,
                })
            }
            _ => Err(errors),
        }
    }
}

// ---------------------------------------------------------------------------
// Event registration

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EventRegistrationForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom = "validate_kenyan_phone")]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl EventRegistrationForm {
    pub fn clean(mut self) -> Result<NewRegistration, FieldErrors> {
        for field in [&mut self.name, &mut self.email, &mut self.phone] {
            trim(field);
        }

        let mut errors = FieldErrors::new();
        require(&mut errors, "name", &self.name);
        require(&mut errors, "email", &self.email);
        require(&mut errors, "phone", &self.phone);
        merge(&mut errors, self.validate());

        errors.into_result(NewRegistration {
            name: self.name,
            email: self.email,
            phone: self.phone,
        })
    }
}

// ---------------------------------------------------------------------------
// Newsletter

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NewsletterForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscriber {
    pub email: String,
    /// Empty when not supplied.
    pub first_name: String,
}

impl NewsletterForm {
    pub fn clean(mut self) -> Result<NewSubscriber, FieldErrors> {
        trim(&mut self.email);
        trim(&mut self.first_name);

        let mut errors = FieldErrors::new();
        require(&mut errors, "email", &self.email);
        merge(&mut errors, self.validate());

        errors.into_result(NewSubscriber {
            email: self.email,
            first_name: self.first_name,
        })
    }
}

// ---------------------------------------------------------------------------
// Testimonial sharing

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TestimonialForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub client_name: String,
    #[validate(length(max = 10, message = "Initials must be 10 characters or less"))]
    pub client_initials: String,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub location: String,
    pub testimonial: String,
    pub rating: String,
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestimonial {
    pub client_name: String,
    pub client_initials: String,
    pub location: String,
    pub testimonial: String,
    pub rating: i32,
    pub service_id: Option<i64>,
}

impl TestimonialForm {
    pub fn initial() -> Self {
        Self {
            rating: "5".to_string(),
            ..Self::default()
        }
    }

    pub fn clean(mut self) -> Result<NewTestimonial, FieldErrors> {
        for field in [
            &mut self.client_name,
            &mut self.client_initials,
            &mut self.location,
            &mut self.testimonial,
            &mut self.rating,
            &mut self.service,
        ] {
            trim(field);
        }

        let mut errors = FieldErrors::new();
        require(&mut errors, "client_name", &self.client_name);
        require(&mut errors, "client_initials", &self.client_initials);
        require(&mut errors, "testimonial", &self.testimonial);
        require(&mut errors, "rating", &self.rating);
        merge(&mut errors, self.validate());

        let rating = match self.rating.parse::<i32>() {
            Ok(r) if (1..=5).contains(&r) => r,
            _ => {
                if !self.rating.is_empty() {
                    errors.add("rating", invalid_choice(&self.rating));
                }
                0
            }
        };
        let service_id = parse_optional_id(&mut errors, "service", &self.service);

        errors.into_result(NewTestimonial {
            client_name: self.client_name,
            client_initials: self.client_initials,
            location: self.location,
            testimonial: self.testimonial,
            rating,
            service_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn appointment() -> AppointmentForm {
        AppointmentForm {
            name: "Achieng Otieno".to_string(),
            email: "achieng@example.com".to_string(),
            phone: "0799999999".to_string(),
            preferred_date: "2024-06-12".to_string(),
            preferred_time: "14:30".to_string(),
            appointment_type: "individual".to_string(),
            session_mode: String::new(),
            counselor: String::new(),
            concerns: "Work stress".to_string(),
            is_new_client: None,
            hear_about_us: String::new(),
        }
    }

    #[test]
    fn kenyan_phone_pattern() {
        for ok in ["0712345678", "+254712345678", "0799999999"] {
            assert!(is_kenyan_phone(ok), "{ok} should be accepted");
        }
        for bad in ["0812345678", "071234567", "07123456789", "254712345678", "+2540712345678", "07a2345678", ""] {
            assert!(!is_kenyan_phone(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn contact_requires_core_fields_but_not_phone() {
        let errors = ContactForm::default().clean().unwrap_err();
        assert_eq!(errors.get("name"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("email"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("subject"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("message"), Some(REQUIRED_MESSAGE));
        assert!(!errors.contains("phone"));
    }

    #[test]
    fn contact_checks_phone_only_when_given() {
        let form = ContactForm {
            name: " Jane ".to_string(),
            email: "jane@example.com".to_string(),
            phone: "12345".to_string(),
            subject: "Hello".to_string(),
            message: "Question about fees".to_string(),
        };
        let errors = form.clone().clean().unwrap_err();
        assert_eq!(errors.get("phone"), Some(PHONE_MESSAGE));

        let cleaned = ContactForm { phone: String::new(), ..form }.clean().unwrap();
        assert_eq!(cleaned.name, "Jane");
        assert_eq!(cleaned.phone, "");
    }

    #[test]
    fn appointment_defaults_session_mode() {
        let cleaned = appointment().clean(today()).unwrap();
        assert_eq!(cleaned.session_mode, SessionMode::OnlineVideo);
        assert_eq!(cleaned.appointment_type, AppointmentType::Individual);
        assert_eq!(cleaned.counselor_id, None);
        assert!(!cleaned.is_new_client);
        assert_eq!(cleaned.preferred_time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn appointment_rejects_bad_phone_with_fixed_message() {
        let form = AppointmentForm {
            phone: "0612345678".to_string(),
            ..appointment()
        };
        let errors = form.clean(today()).unwrap_err();
        assert_eq!(errors.get("phone"), Some(PHONE_MESSAGE));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn appointment_rejects_past_and_malformed_dates() {
        let past = AppointmentForm {
            preferred_date: "2024-06-09".to_string(),
            ..appointment()
        };
        assert_eq!(past.clean(today()).unwrap_err().get("preferred_date"), Some(PAST_DATE_MESSAGE));

        let same_day = AppointmentForm {
            preferred_date: "2024-06-10".to_string(),
            ..appointment()
        };
        assert!(same_day.clean(today()).is_ok());

        let garbage = AppointmentForm {
            preferred_date: "next tuesday".to_string(),
            preferred_time: "25:99".to_string(),
            ..appointment()
        };
        let errors = garbage.clean(today()).unwrap_err();
        assert_eq!(errors.get("preferred_date"), Some(DATE_MESSAGE));
        assert_eq!(errors.get("preferred_time"), Some(TIME_MESSAGE));
    }

    #[test]
    fn appointment_rejects_unknown_choices() {
        let form = AppointmentForm {
            appointment_type: "hypnosis".to_string(),
            session_mode: "carrier_pigeon".to_string(),
            counselor: "abc".to_string(),
            ..appointment()
        };
        let errors = form.clean(today()).unwrap_err();
        assert!(errors.get("appointment_type").unwrap().contains("hypnosis"));
        assert!(errors.contains("session_mode"));
        assert!(errors.contains("counselor"));
    }

    #[test]
    fn registration_requires_valid_phone() {
        let form = EventRegistrationForm {
            name: "Kamau".to_string(),
            email: "kamau@example.com".to_string(),
            phone: "+254712345678".to_string(),
        };
        assert!(form.clone().clean().is_ok());

        let errors = EventRegistrationForm { phone: "0712".to_string(), ..form }.clean().unwrap_err();
        assert_eq!(errors.get("phone"), Some(PHONE_MESSAGE));
    }

    #[test]
    fn newsletter_needs_a_valid_email() {
        let errors = NewsletterForm { email: "not-an-email".to_string(), first_name: String::new() }
            .clean()
            .unwrap_err();
        assert_eq!(errors.get("email"), Some(EMAIL_MESSAGE));

        let ok = NewsletterForm { email: " reader@example.com ".to_string(), first_name: String::new() }
            .clean()
            .unwrap();
        assert_eq!(ok.email, "reader@example.com");
    }

    #[test]
    fn testimonial_initials_limit() {
        let form = TestimonialForm {
            client_name: "Mary Kamau".to_string(),
            client_initials: "M.K.".to_string(),
            location: "Mombasa".to_string(),
            testimonial: "Life changing.".to_string(),
            rating: "5".to_string(),
            service: String::new(),
        };
        assert_eq!(form.clone().clean().unwrap().rating, 5);

        let ten = TestimonialForm { client_initials: "ABCDEFGHIJ".to_string(), ..form.clone() };
        assert!(ten.clean().is_ok());

        let eleven = TestimonialForm { client_initials: "ABCDEFGHIJK".to_string(), ..form.clone() };
        assert_eq!(eleven.clean().unwrap_err().get("client_initials"), Some(INITIALS_MESSAGE));

        let bad_rating = TestimonialForm { rating: "6".to_string(), ..form };
        assert!(bad_rating.clean().unwrap_err().contains("rating"));
    }
}
