//! Shared library for Waypoint API functions.
//!
//! This crate provides the request/response types, session resolution,
//! permission checks and external service adapters used by the API Lambda.

pub mod auth;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod permissions;
pub mod search;
pub mod secrets;

pub use auth::{
    extract_user_from_context, AuthenticatedUser, ClaimsSessionResolver, JwtSessionResolver,
    SessionClaims, SessionResolver,
};
pub use calendar::{day_window, CalendarClient, CalendarError, DayWindow, GoogleCalendarClient};
pub use config::Config;
pub use db::{create_pool, PgUserStore, UserStore};
pub use error::{Error, Result};
pub use http::{ApiRequest, ApiResponse, ErrorBody};
pub use models::{
    CalendarEvent, CalendarEventsResponse, RoadmapSearchResponse, SearchOutcome, SearchQuery,
    SearchSource, UserRecord,
};
pub use permissions::{Permission, PermissionGate};
pub use search::{ChatSearchClient, SearchClient, SearchError};
pub use secrets::{get_database_credentials, get_search_api_key, get_secret, DatabaseCredentials};
