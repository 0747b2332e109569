//! Plain request/response types and the JSON response formatter.
//!
//! Handlers work on [`ApiRequest`] and [`ApiResponse`] only. The Lambda
//! binary converts to and from `lambda_http` types at the edge.

use lambda_http::http::Method;
use lambda_http::{Body, Request, RequestExt, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tracing::error;

use crate::Error;

const FALLBACK_ERROR_BODY: &str = r#"{"error":"Internal server error"}"#;

/// An inbound API request, detached from the hosting framework.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Claims attached by an API Gateway authorizer.
    pub claims: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: Vec::new(),
            claims: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_claims(mut self, claims: serde_json::Value) -> Self {
        self.claims = Some(claims);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Non-empty query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Value of a cookie from the `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
    }

    /// Parse the body as JSON, mapping failures to a validation error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if self.body.is_empty() {
            return Err(Error::Validation("Missing request body".to_string()));
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::Validation(format!("Invalid request body: {}", e)))
    }

    /// Build from a Lambda HTTP event.
    pub fn from_lambda(event: &Request) -> Self {
        let query = event
            .query_string_parameters_ref()
            .map(|params| {
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let headers = event
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let claims = event
            .request_context_ref()
            .and_then(|ctx| ctx.authorizer())
            .and_then(|authorizer| authorizer.fields.get("claims"))
            .cloned();

        Self {
            method: event.method().clone(),
            path: event.uri().path().to_string(),
            query,
            headers,
            body: event.body().as_ref().to_vec(),
            claims,
        }
    }
}

/// Error body returned for every non-success response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An outbound API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    /// Serialize `data` as the whole body.
    pub fn json<T: Serialize>(status: u16, data: &T) -> Self {
        match serde_json::to_string(data) {
            Ok(body) => Self::raw(status, body),
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                Self::raw(500, FALLBACK_ERROR_BODY.to_string())
            }
        }
    }

    /// 200 with the payload as the body.
    pub fn ok<T: Serialize>(data: &T) -> Self {
        Self::json(200, data)
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(
            status,
            &ErrorBody {
                error: message.into(),
            },
        )
    }

    /// 204 with no body, for CORS preflight.
    pub fn no_content() -> Self {
        Self {
            status: 204,
            headers: cors_headers(),
            body: String::new(),
        }
    }

    fn raw(status: u16, body: String) -> Self {
        let mut headers = cors_headers();
        headers.push(("content-type".to_string(), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Parse the body back into JSON.
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }

    /// Convert into a Lambda HTTP response.
    pub fn into_lambda(self) -> Result<Response<Body>, lambda_http::Error> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let body = if self.body.is_empty() {
            Body::Empty
        } else {
            Body::from(self.body)
        };
        Ok(builder.body(body)?)
    }
}

impl From<Error> for ApiResponse {
    fn from(err: Error) -> Self {
        ApiResponse::error(err.status_code(), err.public_message())
    }
}

fn cors_headers() -> Vec<(String, String)> {
    vec![
        ("access-control-allow-origin".to_string(), "*".to_string()),
        (
            "access-control-allow-headers".to_string(),
            "authorization, content-type, cookie".to_string(),
        ),
        (
            "access-control-allow-methods".to_string(),
            "GET, POST, OPTIONS".to_string(),
        ),
    ]
}
