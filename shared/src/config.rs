//! Configuration management for the API Lambda.

use chrono_tz::Tz;
use std::env;

use crate::{Error, Result};

const DEFAULT_SEARCH_API_URL: &str = "https://api.perplexity.ai/chat/completions";
const DEFAULT_SEARCH_MODEL: &str = "sonar";
const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database host
    pub db_host: String,
    /// Database name
    pub db_name: String,
    /// ARN of the secret containing database credentials
    pub db_secret_arn: String,
    /// AWS region
    pub aws_region: String,
    /// Search API key given directly (local runs)
    pub search_api_key: Option<String>,
    /// ARN of the secret holding the search API key
    pub search_api_key_secret_arn: Option<String>,
    /// Chat-completions endpoint used for roadmap search
    pub search_api_url: String,
    /// Model requested from the search API
    pub search_model: String,
    /// Base URL of the calendar REST API
    pub calendar_api_url: String,
    /// HMAC secret for session JWTs; when unset, authorizer claims are used
    pub session_jwt_secret: Option<String>,
    /// Cookie carrying the session JWT
    pub session_cookie_name: String,
    /// Timezone used when a calendar request does not name one
    pub default_timezone: Tz,
    /// Timeout applied to outbound HTTP calls
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            get(key).ok_or_else(|| Error::Config(format!("{} not set", key)))
        };

        let default_timezone = match get("DEFAULT_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| Error::Config(format!("Invalid DEFAULT_TIMEZONE: {}", name)))?,
            None => Tz::UTC,
        };

        let http_timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("Invalid HTTP_TIMEOUT_SECS: {}", raw)))?,
            None => 30,
        };

        Ok(Self {
            db_host: required("DATABASE_HOST")?,
            db_name: get("DATABASE_NAME").unwrap_or_else(|| "waypoint".to_string()),
            db_secret_arn: required("DATABASE_URL_SECRET_ARN")?,
            aws_region: get("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            search_api_key: get("SEARCH_API_KEY").filter(|key| !key.trim().is_empty()),
            search_api_key_secret_arn: get("SEARCH_API_KEY_SECRET_ARN"),
            search_api_url: get("SEARCH_API_URL")
                .unwrap_or_else(|| DEFAULT_SEARCH_API_URL.to_string()),
            search_model: get("SEARCH_MODEL").unwrap_or_else(|| DEFAULT_SEARCH_MODEL.to_string()),
            calendar_api_url: get("CALENDAR_API_URL")
                .unwrap_or_else(|| DEFAULT_CALENDAR_API_URL.to_string()),
            session_jwt_secret: get("SESSION_JWT_SECRET"),
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| "session".to_string()),
            default_timezone,
            http_timeout_secs,
        })
    }
}
