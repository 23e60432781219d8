use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Raised when a stored or submitted value is not one of an enum's choices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

/// A choice is a closed set of values stored as lowercase text.
pub trait Choice: Sized + Copy + 'static {
    const KIND: &'static str;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
    fn label(&self) -> &'static str;

    /// `(value, label)` pairs, for select inputs.
    fn options() -> Vec<ChoiceOption> {
        Self::ALL
            .iter()
            .map(|choice| ChoiceOption {
                value: choice.as_str(),
                label: choice.label(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $variant:ident => ($value:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant ),+
        }

        impl Choice for $name {
            const KIND: &'static str = $kind;
            const ALL: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $value ),+
                }
            }

            fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                Choice::as_str(self)
            }

            pub fn label(&self) -> &'static str {
                Choice::label(self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $value => Ok($name::$variant), )+
                    other => Err(UnknownChoice {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownChoice;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

choice_enum! {
    ServiceType, "service type" {
        Individual => ("individual", "Individual Counseling"),
        Group => ("group", "Group Therapy & Support Circles"),
        Workshop => ("workshop", "Psychoeducation Workshops"),
        Outreach => ("outreach", "Community Outreach & Awareness"),
    }
}

choice_enum! {
    BlogCategory, "blog category" {
        Anxiety => ("anxiety", "Anxiety & Stress"),
        Depression => ("depression", "Depression & Mood"),
        Relationships => ("relationships", "Relationships"),
        SelfCare => ("self_care", "Self-Care & Wellness"),
        Trauma => ("trauma", "Trauma & Recovery"),
        Youth => ("youth", "Youth & Teen Support"),
        General => ("general", "General Mental Health"),
    }
}

choice_enum! {
    AppointmentType, "appointment type" {
        Individual => ("individual", "Individual Counseling"),
        Group => ("group", "Group Therapy"),
        Workshop => ("workshop", "Workshop"),
        Consultation => ("consultation", "Initial Consultation"),
    }
}

choice_enum! {
    SessionMode, "session mode" {
        InPerson => ("in_person", "In-Person"),
        OnlineVideo => ("online_video", "Online Video"),
        OnlineVoice => ("online_voice", "Online Voice"),
        Phone => ("phone", "Phone Call"),
    }
}

impl Default for SessionMode {
    fn default() -> Self {
        SessionMode::OnlineVideo
    }
}

choice_enum! {
    /// Admin-driven; any status may move to any other.
    AppointmentStatus, "appointment status" {
        Pending => ("pending", "Pending Confirmation"),
        Confirmed => ("confirmed", "Confirmed"),
        Completed => ("completed", "Completed"),
        Cancelled => ("cancelled", "Cancelled"),
        Rescheduled => ("rescheduled", "Rescheduled"),
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Pending
    }
}

choice_enum! {
    ResourceType, "resource type" {
        Article => ("article", "Article"),
        Guide => ("guide", "Guide"),
        Video => ("video", "Video"),
        Exercise => ("exercise", "Exercise"),
        External => ("external", "External Link"),
    }
}

choice_enum! {
    FaqCategory, "FAQ category" {
        General => ("general", "General"),
        Services => ("services", "Services"),
        Appointments => ("appointments", "Appointments"),
        Fees => ("fees", "Fees & Payment"),
        Online => ("online", "Online Counseling"),
        Privacy => ("privacy", "Privacy & Confidentiality"),
    }
}

choice_enum! {
    EventType, "event type" {
        Workshop => ("workshop", "Workshop"),
        SupportGroup => ("support_group", "Support Circle"),
        Outreach => ("outreach", "Community Outreach"),
        Webinar => ("webinar", "Webinar"),
    }
}

// Common response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_round_trip_through_text() {
        assert_eq!("self_care".parse::<BlogCategory>().unwrap(), BlogCategory::SelfCare);
        assert_eq!(EventType::SupportGroup.as_str(), "support_group");
        assert_eq!(SessionMode::default(), SessionMode::OnlineVideo);
        assert_eq!(AppointmentStatus::default().label(), "Pending Confirmation");
    }

    #[test]
    fn unknown_choice_is_rejected() {
        let err = "therapy".parse::<ServiceType>().unwrap_err();
        assert_eq!(err.to_string(), "'therapy' is not a valid service type");
        assert!(AppointmentStatus::try_from("archived".to_string()).is_err());
    }

    #[test]
    fn choices_serialize_as_plain_strings() {
        let json = serde_json::to_string(&SessionMode::InPerson).unwrap();
        assert_eq!(json, "\"in_person\"");
        let mode: SessionMode = serde_json::from_str("\"phone\"").unwrap();
        assert_eq!(mode, SessionMode::Phone);
        assert!(serde_json::from_str::<SessionMode>("\"fax\"").is_err());
    }

    #[test]
    fn options_list_every_choice_in_order() {
        let options = FaqCategory::options();
        assert_eq!(options.len(), 6);
        assert_eq!(options[0].value, "general");
        assert_eq!(options[3].label, "Fees & Payment");
    }
}
