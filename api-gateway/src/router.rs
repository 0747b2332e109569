//! Routing table mapping method + path to a handler.

use async_trait::async_trait;
use lambda_http::http::Method;
use shared::{ApiRequest, ApiResponse, AuthenticatedUser, Error, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::handlers::{CalendarEventsHandler, RoadmapSearchHandler};
use crate::AppState;

pub const CALENDAR_EVENTS_PATH: &str = "/api/calendar/events";
pub const ROADMAP_SEARCH_PATH: &str = "/api/roadmap/search";

/// An authenticated endpoint.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        state: &AppState,
        user: AuthenticatedUser,
        request: &ApiRequest,
    ) -> Result<ApiResponse>;
}

pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub handler: Arc<dyn Handler>,
}

pub struct Router {
    state: Arc<AppState>,
    routes: Vec<Route>,
}

/// The API's routes.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new(state)
        .route(Method::GET, CALENDAR_EVENTS_PATH, CalendarEventsHandler)
        .route(Method::POST, ROADMAP_SEARCH_PATH, RoadmapSearchHandler)
}

impl Router {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            routes: Vec::new(),
        }
    }

    pub fn route(mut self, method: Method, path: &'static str, handler: impl Handler + 'static) -> Self {
        self.routes.push(Route {
            method,
            path,
            handler: Arc::new(handler),
        });
        self
    }

    /// Handle one request. Always produces a response.
    pub async fn dispatch(&self, request: ApiRequest) -> ApiResponse {
        let path = normalize_path(&request.path);
        info!("API request: {} {}", request.method, path);

        let candidates: Vec<&Route> = self.routes.iter().filter(|r| r.path == path).collect();
        if candidates.is_empty() {
            return Error::NotFound("Not found".to_string()).into();
        }
        if request.method == Method::OPTIONS {
            return ApiResponse::no_content();
        }
        let Some(route) = candidates.into_iter().find(|r| r.method == request.method) else {
            return Error::MethodNotAllowed("Method not allowed".to_string()).into();
        };

        let user = match self.state.sessions.resolve(&request).await {
            Ok(Some(user)) => user,
            Ok(None) => return ApiResponse::error(401, "Unauthorized"),
            Err(e) => {
                warn!("Failed to resolve session: {}", e);
                return ApiResponse::error(401, "Unauthorized");
            }
        };

        let user_id = user.user_id;
        match route.handler.handle(&self.state, user, &request).await {
            Ok(response) => response,
            Err(e) => {
                if e.status_code() >= 500 {
                    error!("{} {} failed for user {}: {}", request.method, path, user_id, e);
                } else {
                    info!("{} {} rejected for user {}: {}", request.method, path, user_id, e);
                }
                e.into()
            }
        }
    }
}

fn normalize_path(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/api/calendar/events/"), "/api/calendar/events");
        assert_eq!(normalize_path("/api/roadmap/search"), "/api/roadmap/search");
        assert_eq!(normalize_path("/"), "/");
    }
}
