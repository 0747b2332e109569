//! Waypoint API endpoints.
//!
//! Endpoints:
//! - GET /api/calendar/events - Events for one day from the user's calendar
//! - POST /api/roadmap/search - Research a roadmap toward a goal

pub mod handlers;
pub mod router;
pub mod state;

pub use router::{api_router, Handler, Router, CALENDAR_EVENTS_PATH, ROADMAP_SEARCH_PATH};
pub use state::AppState;
