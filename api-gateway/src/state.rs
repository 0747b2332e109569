//! Application state shared across requests.

use chrono_tz::Tz;
use shared::{
    create_pool, get_database_credentials, get_search_api_key, CalendarClient, ChatSearchClient,
    ClaimsSessionResolver, Config, Error, GoogleCalendarClient, JwtSessionResolver,
    PermissionGate, PgUserStore, Result, SearchClient, SessionResolver, UserStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Collaborators every handler needs. Built once per cold start.
pub struct AppState {
    pub sessions: Arc<dyn SessionResolver>,
    pub permissions: PermissionGate,
    pub calendar: Arc<dyn CalendarClient>,
    pub search: Arc<dyn SearchClient>,
    pub default_timezone: Tz,
}

impl AppState {
    pub fn new(
        sessions: Arc<dyn SessionResolver>,
        users: Arc<dyn UserStore>,
        calendar: Arc<dyn CalendarClient>,
        search: Arc<dyn SearchClient>,
        default_timezone: Tz,
    ) -> Self {
        Self {
            sessions,
            permissions: PermissionGate::new(users),
            calendar,
            search,
            default_timezone,
        }
    }

    /// Wire up production collaborators from configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

        let db_credentials = get_database_credentials(&secrets_client, &config.db_secret_arn).await?;
        let pool = create_pool(config, &db_credentials).await?;

        let search_api_key = match (&config.search_api_key, &config.search_api_key_secret_arn) {
            (Some(key), _) => Some(key.clone()),
            (None, Some(arn)) => match get_search_api_key(&secrets_client, arn).await {
                Ok(key) if !key.is_empty() => Some(key),
                Ok(_) => None,
                Err(e) => {
                    warn!("Search API key unavailable, searches will fail: {}", e);
                    None
                }
            },
            (None, None) => None,
        };
        if search_api_key.is_none() {
            warn!("No search API key configured");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let sessions: Arc<dyn SessionResolver> = match &config.session_jwt_secret {
            Some(secret) => {
                info!("Resolving sessions from signed session tokens");
                Arc::new(JwtSessionResolver::new(
                    secret.as_bytes(),
                    config.session_cookie_name.clone(),
                ))
            }
            None => {
                info!("Resolving sessions from authorizer claims");
                Arc::new(ClaimsSessionResolver)
            }
        };

        Ok(Self::new(
            sessions,
            Arc::new(PgUserStore::new(pool)),
            Arc::new(GoogleCalendarClient::new(
                http_client.clone(),
                config.calendar_api_url.clone(),
            )),
            Arc::new(ChatSearchClient::new(
                http_client,
                search_api_key,
                config.search_api_url.clone(),
                config.search_model.clone(),
            )),
            config.default_timezone,
        ))
    }
}
