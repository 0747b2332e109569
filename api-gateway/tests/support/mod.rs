//! In-memory collaborators for endpoint tests.

#![allow(dead_code)]

use api_gateway::{api_router, AppState, Router};
use async_trait::async_trait;
use chrono_tz::Tz;
use lambda_http::http::Method;
use shared::{
    ApiRequest, CalendarClient, CalendarError, CalendarEvent, ClaimsSessionResolver, DayWindow,
    Result, SearchClient, SearchError, SearchOutcome, SearchQuery, SearchSource,
    SessionResolver, UserRecord, UserStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const USER_ID: &str = "6f1c2b4e-8d3a-4f5e-9a7b-1c2d3e4f5a6b";

pub fn user_id() -> Uuid {
    Uuid::parse_str(USER_ID).unwrap()
}

#[derive(Default)]
pub struct FakeUsers {
    users: HashMap<Uuid, UserRecord>,
    pub lookups: AtomicUsize,
}

impl FakeUsers {
    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.users.insert(user.id, user);
        self
    }
}

#[async_trait]
impl UserStore for FakeUsers {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.get(&user_id).cloned())
    }
}

pub struct FakeCalendar {
    result: Mutex<Option<std::result::Result<Vec<CalendarEvent>, CalendarError>>>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<(String, DayWindow)>>,
}

impl FakeCalendar {
    pub fn returning(events: Vec<CalendarEvent>) -> Self {
        Self::with_result(Ok(events))
    }

    pub fn failing(err: CalendarError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(result: std::result::Result<Vec<CalendarEvent>, CalendarError>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarClient for FakeCalendar {
    async fn list_events(
        &self,
        access_token: &str,
        window: &DayWindow,
    ) -> std::result::Result<Vec<CalendarEvent>, CalendarError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((access_token.to_string(), window.clone()));
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub struct FakeSearch {
    result: Mutex<Option<std::result::Result<SearchOutcome, SearchError>>>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<SearchQuery>>,
}

impl FakeSearch {
    pub fn returning(outcome: SearchOutcome) -> Self {
        Self::with_result(Ok(outcome))
    }

    pub fn failing(err: SearchError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(result: std::result::Result<SearchOutcome, SearchError>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchClient for FakeSearch {
    async fn search(&self, query: &SearchQuery) -> std::result::Result<SearchOutcome, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(query.clone());
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(SearchError::InvalidResponse("no result configured".to_string())))
    }
}

pub fn sample_event(id: &str) -> CalendarEvent {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "summary": "Journal review",
        "start": {"dateTime": "2025-03-10T09:00:00+02:00"},
        "end": {"dateTime": "2025-03-10T09:30:00+02:00"}
    }))
    .unwrap()
}

pub fn sample_outcome() -> SearchOutcome {
    SearchOutcome {
        text: "1. Talk to your advisor\n2. Apply by December".to_string(),
        sources: vec![SearchSource {
            title: Some("Graduate admissions".to_string()),
            url: "https://grad.example.edu/admissions".to_string(),
            date: None,
        }],
    }
}

pub fn calendar_user(enabled: Option<bool>, token: Option<&str>) -> UserRecord {
    UserRecord {
        id: user_id(),
        calendar_read_enabled: enabled,
        calendar_access_token: token.map(String::from),
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<FakeUsers>,
    pub calendar: Arc<FakeCalendar>,
    pub search: Arc<FakeSearch>,
}

impl TestApp {
    pub fn new(users: FakeUsers, calendar: FakeCalendar, search: FakeSearch) -> Self {
        Self::with_sessions(Arc::new(ClaimsSessionResolver), users, calendar, search)
    }

    pub fn with_sessions(
        sessions: Arc<dyn SessionResolver>,
        users: FakeUsers,
        calendar: FakeCalendar,
        search: FakeSearch,
    ) -> Self {
        let users = Arc::new(users);
        let calendar = Arc::new(calendar);
        let search = Arc::new(search);

        let state = AppState::new(
            sessions,
            users.clone(),
            calendar.clone(),
            search.clone(),
            Tz::UTC,
        );

        Self {
            router: api_router(Arc::new(state)),
            users,
            calendar,
            search,
        }
    }
}

/// Request carrying authorizer claims for the test user.
pub fn signed_in(method: Method, path: &str) -> ApiRequest {
    signed_in_with(method, path, serde_json::json!({"sub": USER_ID, "email": "test@example.com"}))
}

pub fn signed_in_with(method: Method, path: &str, claims: serde_json::Value) -> ApiRequest {
    ApiRequest::new(method, path).with_claims(claims)
}
