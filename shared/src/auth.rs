//! Session resolution.
//!
//! A [`SessionResolver`] turns an inbound request into an
//! [`AuthenticatedUser`] or reports that there is no usable session. The
//! identity is then passed explicitly to each handler.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::ApiRequest;
use crate::{Error, Result};

/// Claims carried by a session JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user id)
    pub sub: String,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Provider access token forwarded by the auth layer
    #[serde(default)]
    pub access_token: Option<String>,
    /// Expiration
    pub exp: i64,
}

/// Identity resolved for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    /// User's id
    pub user_id: Uuid,
    /// User's email
    pub email: Option<String>,
    /// Provider access token carried by the session, if any
    pub access_token: Option<String>,
}

impl TryFrom<SessionClaims> for AuthenticatedUser {
    type Error = Error;

    fn try_from(claims: SessionClaims) -> Result<Self> {
        Ok(Self {
            user_id: parse_user_id(&claims.sub)?,
            email: claims.email,
            access_token: claims.access_token.filter(|t| !t.is_empty()),
        })
    }
}

fn parse_user_id(sub: &str) -> Result<Uuid> {
    Uuid::parse_str(sub).map_err(|_| Error::Unauthenticated("Invalid user ID".to_string()))
}

/// Resolves the caller's identity from a request.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `Ok(None)` when the request carries no session at all.
    async fn resolve(&self, request: &ApiRequest) -> Result<Option<AuthenticatedUser>>;
}

/// Reads claims placed on the request by an API Gateway Cognito authorizer.
#[derive(Debug, Default)]
pub struct ClaimsSessionResolver;

#[async_trait]
impl SessionResolver for ClaimsSessionResolver {
    async fn resolve(&self, request: &ApiRequest) -> Result<Option<AuthenticatedUser>> {
        match &request.claims {
            Some(claims) => extract_user_from_context(claims).map(Some),
            None => Ok(None),
        }
    }
}

/// Extract user from API Gateway authorizer claims.
pub fn extract_user_from_context(claims: &serde_json::Value) -> Result<AuthenticatedUser> {
    let sub = claims
        .get("sub")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Unauthenticated("Missing sub claim".to_string()))?;

    let email = claims.get("email").and_then(|v| v.as_str()).map(String::from);

    let access_token = claims
        .get("custom:access_token")
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .map(String::from);

    Ok(AuthenticatedUser {
        user_id: parse_user_id(sub)?,
        email,
        access_token,
    })
}

/// Validates an HS256 session JWT from the `Authorization` header or a cookie.
pub struct JwtSessionResolver {
    key: DecodingKey,
    validation: Validation,
    cookie_name: String,
}

impl JwtSessionResolver {
    pub fn new(secret: &[u8], cookie_name: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            cookie_name: cookie_name.into(),
        }
    }

    fn token<'a>(&self, request: &'a ApiRequest) -> Option<&'a str> {
        let non_blank = |t: &'a str| Some(t.trim()).filter(|t| !t.is_empty());
        request
            .header("authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(non_blank)
            .or_else(|| request.cookie(&self.cookie_name).and_then(non_blank))
    }

    /// Validate a token and extract user information.
    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let token_data = decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(|e| Error::Unauthenticated(format!("Invalid session token: {}", e)))?;

        AuthenticatedUser::try_from(token_data.claims)
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, request: &ApiRequest) -> Result<Option<AuthenticatedUser>> {
        match self.token(request) {
            Some(token) => self.validate_token(token).map(Some),
            None => Ok(None),
        }
    }
}
