//! POST /api/roadmap/search - research a roadmap toward the user's goal.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use shared::{
    ApiRequest, ApiResponse, AuthenticatedUser, Error, Result, RoadmapSearchResponse,
    SearchError, SearchQuery,
};
use tracing::{error, info, warn};

use crate::router::Handler;
use crate::AppState;

/// Raw body; fields are type-checked by hand for field-specific messages.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoadmapSearchRequest {
    goal: Option<Value>,
    current_department: Option<Value>,
    current_institution: Option<Value>,
    background: Option<Value>,
}

impl RoadmapSearchRequest {
    fn into_query(self, current_date: chrono::NaiveDate) -> Result<SearchQuery> {
        let goal = match self.goal {
            None | Some(Value::Null) => {
                return Err(Error::Validation("Goal is required".to_string()))
            }
            Some(Value::String(goal)) if !goal.trim().is_empty() => goal,
            Some(_) => {
                return Err(Error::Validation(
                    "Goal must be a non-empty string".to_string(),
                ))
            }
        };

        Ok(SearchQuery {
            goal,
            current_department: optional_string(self.current_department, "currentDepartment")?,
            current_institution: optional_string(self.current_institution, "currentInstitution")?,
            background: optional_string(self.background, "background")?,
            current_date,
        })
    }
}

fn optional_string(value: Option<Value>, field: &str) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(Error::Validation(format!("{} must be a string", field))),
    }
}

/// Map adapter failures by kind to what the caller sees.
fn search_error_response(err: SearchError) -> Error {
    match err {
        SearchError::MissingApiKey => {
            Error::Upstream("Search service is not configured: missing API key".to_string())
        }
        SearchError::Authentication(_) => {
            Error::Upstream("Search service authentication failed".to_string())
        }
        SearchError::RateLimited => {
            Error::RateLimited("Too many requests, please try again later".to_string())
        }
        SearchError::Api { .. } | SearchError::Transport(_) | SearchError::InvalidResponse(_) => {
            Error::Upstream("Failed to fetch roadmap search results".to_string())
        }
    }
}

pub struct RoadmapSearchHandler;

#[async_trait]
impl Handler for RoadmapSearchHandler {
    async fn handle(
        &self,
        state: &AppState,
        user: AuthenticatedUser,
        request: &ApiRequest,
    ) -> Result<ApiResponse> {
        let body: RoadmapSearchRequest = request.json()?;
        let query = body.into_query(Utc::now().date_naive())?;

        info!("Roadmap search for user {}", user.user_id);

        let outcome = match state.search.search(&query).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    SearchError::RateLimited => {
                        warn!("Roadmap search rate limited for user {}", user.user_id)
                    }
                    _ => error!("Roadmap search failed for user {}: {}", user.user_id, e),
                }
                return Err(search_error_response(e));
            }
        };

        Ok(ApiResponse::ok(&RoadmapSearchResponse::new(query, outcome)))
    }
}
