//! Wire schema for the meetings API.
//!
//! Field names follow the JSON contract (`startDate`, `duration`, `joinLink`);
//! timestamps go out as RFC 3339 UTC with millisecond precision.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::meeting::{CreatedMeeting, Meeting, MeetingCreate};

pub const MAX_TOPIC_CHARS: usize = 200;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("topic must be at most 200 characters, got {len}")]
    TopicTooLong { len: usize },

    #[error("startDate is not a valid date-time: {0}")]
    InvalidStartDate(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiMeeting {
    pub id: String,
    pub start_date: String,
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiCreatedMeeting {
    pub id: String,
    pub start_date: String,
    pub duration: u32,
    pub join_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListMeetingsResponse {
    pub meetings: Vec<ApiMeeting>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingCreateRequest {
    pub topic: String,
    pub start_date: String,
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<&Meeting> for ApiMeeting {
    fn from(meeting: &Meeting) -> Self {
        Self {
            id: meeting.id.to_string(),
            start_date: format_timestamp(&meeting.start_date),
            duration: meeting.duration_minutes,
        }
    }
}

impl From<&CreatedMeeting> for ApiCreatedMeeting {
    fn from(created: &CreatedMeeting) -> Self {
        Self {
            id: created.meeting.id.to_string(),
            start_date: format_timestamp(&created.meeting.start_date),
            duration: created.meeting.duration_minutes,
            join_link: created.join_link.clone(),
        }
    }
}

impl MeetingCreateRequest {
    /// Validate the request and convert it into a booking candidate.
    pub fn into_domain(self) -> Result<MeetingCreate, ValidationError> {
        let len = self.topic.chars().count();
        if len == 0 {
            return Err(ValidationError::EmptyTopic);
        }
        if len > MAX_TOPIC_CHARS {
            return Err(ValidationError::TopicTooLong { len });
        }

        let start_date = DateTime::parse_from_rfc3339(&self.start_date)
            .map_err(|e| ValidationError::InvalidStartDate(e.to_string()))?
            .with_timezone(&Utc);

        Ok(MeetingCreate {
            topic: self.topic,
            start_date,
            duration_minutes: self.duration,
        })
    }
}
