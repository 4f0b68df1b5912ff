//! Query interpretation: a remote NLP service with a local keyword fallback.

use std::{collections::HashMap, fmt::Debug, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    intent::{Intent, classify},
    language::Language,
    model::{Forecast, ResolvedQuery, WeatherSample},
    response::{generate, resolve_locally},
    time_expr::extract_time,
};

pub const DEFAULT_WIT_BASE_URL: &str = "https://api.wit.ai";
pub const DEFAULT_NLP_TIMEOUT: Duration = Duration::from_millis(3000);
const WIT_API_VERSION: &str = "20231201";
const WIT_DATETIME_ENTITY: &str = "wit$datetime:datetime";

#[derive(Debug, thiserror::Error)]
pub enum NlpError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("NLP request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse NLP response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("NLP request timed out after {0:?}")]
    Timeout(Duration),
}

/// Turns an utterance into an intent and an optional target time.
#[async_trait]
pub trait QueryInterpreter: Send + Sync + Debug {
    async fn interpret(
        &self,
        query: &str,
        now: &DateTime<FixedOffset>,
    ) -> Result<ResolvedQuery, NlpError>;
}

/// Offline interpreter built from [`classify`] and [`extract_time`]. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordInterpreter;

impl KeywordInterpreter {
    pub fn resolve(&self, query: &str, now: &DateTime<FixedOffset>) -> ResolvedQuery {
        resolve_locally(query, now)
    }
}

#[async_trait]
impl QueryInterpreter for KeywordInterpreter {
    async fn interpret(
        &self,
        query: &str,
        now: &DateTime<FixedOffset>,
    ) -> Result<ResolvedQuery, NlpError> {
        Ok(self.resolve(query, now))
    }
}

/// Client for a Wit.ai-compatible `/message` endpoint.
#[derive(Debug, Clone)]
pub struct WitInterpreter {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WitInterpreter {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, NlpError> {
        Self::new_with_base_url(api_key, DEFAULT_WIT_BASE_URL, timeout)
    }

    pub fn new_with_base_url(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, NlpError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch(&self, query: &str) -> Result<WitResponse, NlpError> {
        let url = format!("{}/message", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("v", WIT_API_VERSION), ("q", query)])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(NlpError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct WitIntent {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WitEntity {
    #[serde(default)]
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WitResponse {
    #[serde(default)]
    intents: Vec<WitIntent>,
    #[serde(default)]
    entities: HashMap<String, Vec<WitEntity>>,
}

impl WitResponse {
    /// Gaps in the service's answer are filled from the local extractors.
    fn resolve(&self, query: &str, now: &DateTime<FixedOffset>) -> ResolvedQuery {
        let intent = self
            .intents
            .first()
            .and_then(|i| Intent::from_nlp_name(&i.name))
            .unwrap_or_else(|| classify(query));

        let target_time = self
            .entities
            .get(WIT_DATETIME_ENTITY)
            .and_then(|values| values.first())
            .and_then(|e| e.value.as_ref())
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(now.offset()))
            .or_else(|| extract_time(query, now));

        ResolvedQuery { intent, target_time }
    }
}

#[async_trait]
impl QueryInterpreter for WitInterpreter {
    async fn interpret(
        &self,
        query: &str,
        now: &DateTime<FixedOffset>,
    ) -> Result<ResolvedQuery, NlpError> {
        let response = self.fetch(query).await?;
        Ok(response.resolve(query, now))
    }
}

/// Answers one query at a time, preferring the remote interpreter when set.
#[derive(Debug)]
pub struct Assistant {
    remote: Option<Box<dyn QueryInterpreter>>,
    local: KeywordInterpreter,
    timeout: Duration,
}

impl Assistant {
    /// Keyword-only assistant; never touches the network.
    pub fn offline() -> Self {
        Self {
            remote: None,
            local: KeywordInterpreter,
            timeout: DEFAULT_NLP_TIMEOUT,
        }
    }

    pub fn with_remote(remote: Box<dyn QueryInterpreter>, timeout: Duration) -> Self {
        Self {
            remote: Some(remote),
            local: KeywordInterpreter,
            timeout,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.remote.is_none()
    }

    /// Interpret `query`. Remote failures and timeouts fall back to the
    /// keyword interpreter, so this always yields a result.
    pub async fn resolve(&self, query: &str, now: &DateTime<FixedOffset>) -> ResolvedQuery {
        let Some(remote) = &self.remote else {
            return self.local.resolve(query, now);
        };

        let outcome = match tokio::time::timeout(self.timeout, remote.interpret(query, now)).await {
            Ok(result) => result,
            Err(_) => Err(NlpError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(resolved) => {
                tracing::debug!(intent = %resolved.intent, target = ?resolved.target_time, "remote interpretation");
                resolved
            }
            Err(e) => {
                tracing::warn!(error = %e, "NLP interpretation failed, using keyword fallback");
                self.local.resolve(query, now)
            }
        }
    }

    pub async fn answer(
        &self,
        query: &str,
        current: Option<&WeatherSample>,
        forecast: &Forecast,
        now: &DateTime<FixedOffset>,
        language: Language,
    ) -> String {
        let resolved = self.resolve(query, now).await;
        generate(
            resolved.intent,
            resolved.target_time.as_ref(),
            current,
            forecast,
            language,
        )
    }
}

impl Default for Assistant {
    fn default() -> Self {
        Self::offline()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
