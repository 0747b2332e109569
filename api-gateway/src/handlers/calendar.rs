//! GET /api/calendar/events - the signed-in user's events for one day.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use shared::{
    day_window, ApiRequest, ApiResponse, AuthenticatedUser, CalendarEventsResponse, Error,
    Permission, Result,
};
use tracing::{error, info};

use crate::router::Handler;
use crate::AppState;

pub struct CalendarEventsHandler;

#[async_trait]
impl Handler for CalendarEventsHandler {
    async fn handle(
        &self,
        state: &AppState,
        user: AuthenticatedUser,
        request: &ApiRequest,
    ) -> Result<ApiResponse> {
        let record = state
            .permissions
            .require(user.user_id, Permission::CalendarRead)
            .await?;

        let access_token = user
            .access_token
            .or(record.calendar_access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::Unauthenticated(
                    "Calendar access token missing. Please sign in again.".to_string(),
                )
            })?;

        let date = parse_date(request.query_param("date"))?;
        let timezone = parse_timezone(request.query_param("timezone"), state.default_timezone)?;
        let window = day_window(date, timezone, Utc::now());

        info!(
            "Fetching calendar events for user {} on {} ({})",
            user.user_id, window.date, timezone
        );

        let events = state
            .calendar
            .list_events(&access_token, &window)
            .await
            .map_err(|e| {
                error!("Calendar fetch failed for user {}: {}", user.user_id, e);
                Error::Upstream("Failed to fetch calendar events".to_string())
            })?;

        Ok(ApiResponse::ok(&CalendarEventsResponse { events }))
    }
}

/// Accepts `YYYY-MM-DD` or a full ISO timestamp, of which only the date is used.
/// Anything else, including a valid date followed by extra text, is rejected.
fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
        })
        .map(Some)
        .map_err(|_| Error::Validation(format!("Invalid date: {}", raw)))
}

fn parse_timezone(raw: Option<&str>, default: Tz) -> Result<Tz> {
    match raw.map(str::trim) {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| Error::Validation(format!("Invalid timezone: {}", name))),
        None => Ok(default),
    }
}
