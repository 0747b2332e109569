//! Calendar provider adapter.
//!
//! Lists the events of one local day from the user's primary calendar.

use async_trait::async_trait;
use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::CalendarEvent;

/// Offset of the last millisecond of a day from local midnight.
const END_OF_DAY_MILLIS: i64 = 24 * 60 * 60 * 1000 - 1;

/// Longest run of nonexistent local time we step across. Zones that moved
/// across the date line skipped a whole calendar day.
const MAX_GAP_MINUTES: i64 = 25 * 60;

const PAGE_SIZE: u32 = 250;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("calendar provider rejected the access token ({0})")]
    Unauthorized(u16),
    #[error("calendar API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("calendar request failed: {0}")]
    Transport(String),
    #[error("invalid calendar response: {0}")]
    InvalidResponse(String),
}

/// First and last instant of a calendar day in a timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub timezone: Tz,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// Compute the window for `date` in `tz`, defaulting to today as of `now`.
///
/// `start` is local 00:00:00.000 and `end` local 23:59:59.999. When local
/// midnight falls in a DST gap the first valid instant after it is used;
/// ambiguous times resolve outward (earliest start, latest end).
pub fn day_window(date: Option<NaiveDate>, tz: Tz, now: DateTime<Utc>) -> DayWindow {
    let date = date.unwrap_or_else(|| now.with_timezone(&tz).date_naive());
    let midnight = date.and_time(NaiveTime::MIN);
    let last_milli = midnight + Duration::milliseconds(END_OF_DAY_MILLIS);

    DayWindow {
        date,
        timezone: tz,
        start: resolve_local(tz, midnight, Edge::Start).fixed_offset(),
        end: resolve_local(tz, last_milli, Edge::End).fixed_offset(),
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Start,
    End,
}

fn resolve_local(tz: Tz, local: NaiveDateTime, edge: Edge) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => return dt,
        LocalResult::Ambiguous(earliest, latest) => {
            return match edge {
                Edge::Start => earliest,
                Edge::End => latest,
            }
        }
        LocalResult::None => {}
    }

    // Inside a DST gap: walk inward from the edge to the nearest valid time.
    let step = match edge {
        Edge::Start => Duration::minutes(1),
        Edge::End => Duration::minutes(-1),
    };
    let mut candidate = local;
    for _ in 0..MAX_GAP_MINUTES {
        candidate += step;
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt;
        }
    }

    // Unreachable with tzdb zones, whose gaps are all shorter than the walk.
    // Apply the zone's own offset so the result stays within hours of `local`.
    let offset = tz.offset_from_utc_datetime(&local).fix();
    tz.from_utc_datetime(&(local - Duration::seconds(i64::from(offset.local_minus_utc()))))
}

/// Reads events from a calendar provider.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn list_events(
        &self,
        access_token: &str,
        window: &DayWindow,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
    next_page_token: Option<String>,
}

/// Google Calendar v3 REST client.
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self, window: &DayWindow, page_token: Option<&str>) -> String {
        let mut url = format!(
            "{}/calendars/primary/events?timeMin={}&timeMax={}&timeZone={}\
            &singleEvents=true&orderBy=startTime&maxResults={}",
            self.base_url,
            urlencoding::encode(&window.start.to_rfc3339_opts(SecondsFormat::Millis, false)),
            urlencoding::encode(&window.end.to_rfc3339_opts(SecondsFormat::Millis, false)),
            urlencoding::encode(window.timezone.name()),
            PAGE_SIZE
        );

        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        url
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    async fn list_events(
        &self,
        access_token: &str,
        window: &DayWindow,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let mut all_events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let response = self
                .http_client
                .get(self.events_url(window, page_token.as_deref()))
                .bearer_auth(access_token)
                .send()
                .await
                .map_err(|e| CalendarError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            debug!(status, "Received calendar API response");

            if status == 401 || status == 403 {
                return Err(CalendarError::Unauthorized(status));
            }
            if !response.status().is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(CalendarError::Api { status, message });
            }

            let page: EventListResponse = response
                .json()
                .await
                .map_err(|e| CalendarError::InvalidResponse(e.to_string()))?;

            all_events.extend(page.items);

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        info!(
            "Fetched {} calendar events for {}",
            all_events.len(),
            window.date
        );

        Ok(all_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_window_spans_one_local_day() {
        let now = Utc::now();
        let expected = Duration::milliseconds(END_OF_DAY_MILLIS);

        for (tz, day) in [
            (Tz::UTC, date(2025, 1, 15)),
            (chrono_tz::Asia::Tokyo, date(2025, 6, 30)),
            (chrono_tz::Europe::Helsinki, date(2025, 3, 30)),
            (chrono_tz::America::New_York, date(2025, 11, 2)),
            (chrono_tz::Australia::Lord_Howe, date(2025, 4, 6)),
        ] {
            let window = day_window(Some(day), tz, now);
            assert_eq!(window.start.date_naive(), day, "{}", tz);
            assert_eq!(window.end.date_naive(), day, "{}", tz);
            assert_eq!(
                window.end.naive_local() - window.start.naive_local(),
                expected,
                "{}",
                tz
            );
        }

        // Nuuk springs forward at 23:00 local, so the last hour of 2024-03-30
        // does not exist and the day ends at 22:59:59.999.
        let day = date(2024, 3, 30);
        let window = day_window(Some(day), chrono_tz::America::Nuuk, now);
        assert_eq!(window.start.date_naive(), day);
        assert_eq!(window.end.date_naive(), day);
        assert_eq!(
            window.end.naive_local(),
            day.and_hms_milli_opt(22, 59, 59, 999).unwrap()
        );
        assert!(window.start < window.end);
    }

    #[test]
    fn test_day_window_offsets() {
        let window = day_window(Some(date(2025, 1, 15)), chrono_tz::Asia::Tokyo, Utc::now());
        assert_eq!(window.start.to_rfc3339(), "2025-01-15T00:00:00+09:00");
        assert_eq!(
            window.end.to_rfc3339_opts(SecondsFormat::Millis, false),
            "2025-01-15T23:59:59.999+09:00"
        );
        assert_eq!(window.end - window.start, Duration::milliseconds(END_OF_DAY_MILLIS));
    }

    #[test]
    fn test_day_window_defaults_to_today_in_timezone() {
        // 2025-01-15 20:00 UTC is already the 16th in Tokyo.
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 20, 0, 0).unwrap();
        let window = day_window(None, chrono_tz::Asia::Tokyo, now);
        assert_eq!(window.date, date(2025, 1, 16));

        let window = day_window(None, Tz::UTC, now);
        assert_eq!(window.date, date(2025, 1, 15));
    }

    #[test]
    fn test_day_window_midnight_in_dst_gap() {
        // Sao Paulo skipped 00:00-01:00 on 2018-11-04.
        let window = day_window(Some(date(2018, 11, 4)), chrono_tz::America::Sao_Paulo, Utc::now());
        assert_eq!(window.start.date_naive(), date(2018, 11, 4));
        assert_eq!(window.start.hour(), 1);
        assert_eq!(window.start.minute(), 0);
    }

    #[test]
    fn test_resolve_local_end_steps_back_out_of_gap() {
        // New York skipped 02:00-03:00 on 2025-03-09.
        let local = date(2025, 3, 9).and_hms_milli_opt(2, 30, 0, 999).unwrap();
        let resolved = resolve_local(chrono_tz::America::New_York, local, Edge::End);
        assert_eq!(
            resolved.naive_local(),
            date(2025, 3, 9).and_hms_milli_opt(1, 59, 0, 999).unwrap()
        );

        let resolved = resolve_local(chrono_tz::America::New_York, local, Edge::Start);
        assert_eq!(
            resolved.naive_local(),
            date(2025, 3, 9).and_hms_milli_opt(3, 0, 0, 999).unwrap()
        );
    }

    fn window() -> DayWindow {
        day_window(Some(date(2025, 3, 10)), chrono_tz::Europe::Helsinki, Utc::now())
    }

    #[tokio::test]
    async fn test_list_events_follows_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("Authorization", "Bearer ya29.token"))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "evt-2", "summary": "Review"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .and(query_param("timeZone", "Europe/Helsinki"))
            .and(query_param("timeMin", "2025-03-10T00:00:00.000+02:00"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "evt-1", "summary": "Standup"}],
                "nextPageToken": "page-2"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let client = GoogleCalendarClient::new(reqwest::Client::new(), server.uri());
        let events = client.list_events("ya29.token", &window()).await.unwrap();

        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["evt-1", "evt-2"]);
    }

    #[tokio::test]
    async fn test_list_events_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
            .mount(&server)
            .await;

        let client = GoogleCalendarClient::new(reqwest::Client::new(), server.uri());
        let err = client.list_events("expired", &window()).await.unwrap_err();
        assert!(matches!(err, CalendarError::Unauthorized(401)));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Backend Error"))
            .mount(&server)
            .await;

        let client = GoogleCalendarClient::new(reqwest::Client::new(), server.uri());
        let err = client.list_events("token", &window()).await.unwrap_err();
        assert!(matches!(err, CalendarError::Api { status: 503, .. }));
    }
}
