//! Shared data models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored user profile, read-only from the API.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    /// `None` when the flag was never set
    pub calendar_read_enabled: Option<bool>,
    pub calendar_access_token: Option<String>,
}

/// A calendar event as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<EventAttendee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_event_id: Option<String>,
}

/// Start or end of an event: `date_time` for timed events, `date` for all-day ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

/// Calendar endpoint response payload.
#[derive(Debug, Serialize)]
pub struct CalendarEventsResponse {
    pub events: Vec<CalendarEvent>,
}

/// Validated input for a roadmap search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub goal: String,
    pub current_department: Option<String>,
    pub current_institution: Option<String>,
    pub background: Option<String>,
    pub current_date: NaiveDate,
}

/// A source backing a search answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Answer text plus the sources it cites.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub text: String,
    pub sources: Vec<SearchSource>,
}

/// Echo of the search input.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub goal: String,
    pub current_department: Option<String>,
    pub current_institution: Option<String>,
    pub background: Option<String>,
    pub search_date: NaiveDate,
}

/// Roadmap search endpoint response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapSearchResponse {
    pub search_results: String,
    pub sources: Vec<SearchSource>,
    pub metadata: SearchMetadata,
}

impl RoadmapSearchResponse {
    pub fn new(query: SearchQuery, outcome: SearchOutcome) -> Self {
        Self {
            search_results: outcome.text,
            sources: outcome.sources,
            metadata: SearchMetadata {
                goal: query.goal,
                current_department: query.current_department,
                current_institution: query.current_institution,
                background: query.background,
                search_date: query.current_date,
            },
        }
    }
}
