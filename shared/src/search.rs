//! Search/AI adapter for roadmap research.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint that returns
//! grounded answers with their sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{SearchOutcome, SearchQuery, SearchSource};

const SYSTEM_PROMPT: &str = "You are a career and education research assistant. \
Given a person's goal and background, research current, concrete steps to reach the goal: \
programs, certifications, skills, typical timelines and notable people or organisations. \
Prefer recent, authoritative sources and be specific.";

const TEMPERATURE: f32 = 0.2;

/// Failure kinds of a search call, classified from the provider response.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search API key is not configured")]
    MissingApiKey,
    #[error("search provider rejected credentials ({0})")]
    Authentication(u16),
    #[error("search provider rate limited the request")]
    RateLimited,
    #[error("search API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("search request failed: {0}")]
    Transport(String),
    #[error("invalid search response: {0}")]
    InvalidResponse(String),
}

/// Runs a roadmap search.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    citations: Vec<String>,
    #[serde(default)]
    search_results: Vec<SearchSource>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Chat-completions search client.
pub struct ChatSearchClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl ChatSearchClient {
    /// `api_key` of `None` makes every search fail with `MissingApiKey`.
    pub fn new(
        http_client: reqwest::Client,
        api_key: Option<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.into(),
            model: model.into(),
        }
    }

    fn classify_status(status: u16, message: String) -> SearchError {
        match status {
            401 | 403 => SearchError::Authentication(status),
            429 => SearchError::RateLimited,
            _ => SearchError::Api { status, message },
        }
    }
}

/// Build the user prompt from the goal and whatever context was given.
pub fn build_prompt(query: &SearchQuery) -> String {
    let mut prompt = format!(
        "Today's date is {}.\nGoal: {}\n",
        query.current_date.format("%Y-%m-%d"),
        query.goal.trim()
    );

    let context = [
        ("Current department", &query.current_department),
        ("Current institution", &query.current_institution),
        ("Background", &query.background),
    ];
    for (label, value) in context {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            prompt.push_str(&format!("{}: {}\n", label, value));
        }
    }

    prompt.push_str(
        "\nResearch a step-by-step roadmap to this goal. Include concrete programs, \
        requirements, deadlines and timelines where they exist.",
    );
    prompt
}

#[async_trait]
impl SearchClient for ChatSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(query),
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Received search API response");

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status.as_u16(), message));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SearchError::InvalidResponse("Response contained no choices".to_string()))?;

        let sources = if chat.search_results.is_empty() {
            chat.citations
                .into_iter()
                .map(|url| SearchSource {
                    title: None,
                    url,
                    date: None,
                })
                .collect()
        } else {
            chat.search_results
        };

        info!(source_count = sources.len(), "Roadmap search complete");

        Ok(SearchOutcome { text, sources })
    }
}
