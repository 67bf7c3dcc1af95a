//! HTTP answer model
//!
//! Posts `{"model": ..., "prompt": ...}` to a configured endpoint and reads
//! the answer from the response body at a JSON pointer.

use super::model::AnswerModel;
use super::prompt::PromptTemplate;
use crate::config::{PipelineConfig, SecretString};
use crate::domain::{PipelineError, Result, ShroudError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;

const INITIAL_DELAY_MS: u64 = 500;
const BACKOFF_MULTIPLIER: f64 = 2.0;
const MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Answer model reached over HTTP
pub struct HttpAnswerModel {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model_id: String,
    response_pointer: String,
    template: PromptTemplate,
    max_retries: usize,
    initial_delay_ms: u64,
}

impl std::fmt::Debug for HttpAnswerModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAnswerModel")
            .field("endpoint", &self.endpoint)
            .field("model_id", &self.model_id)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl HttpAnswerModel {
    /// Create a model from the `[pipeline]` section
    ///
    /// # Errors
    ///
    /// Fails when no endpoint is configured, the template is invalid or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            ShroudError::Configuration("pipeline.endpoint is required to ask questions".to_string())
        })?;

        let template = match config.template {
            Some(ref template) => PromptTemplate::new(template.clone())?,
            None => PromptTemplate::default(),
        };

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PipelineError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            response_pointer: config.response_pointer.clone(),
            template,
            max_retries: config.max_retries,
            initial_delay_ms: INITIAL_DELAY_MS,
        })
    }

    /// Override the first backoff delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = delay.as_millis() as u64;
        self
    }

    fn auth_header_value(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            let token: &str = key.expose_secret().as_ref();
            format!("Bearer {token}")
        })
    }

    /// Retry a request with exponential backoff
    ///
    /// Connection failures, 429 and 5xx responses are retried; everything
    /// else is returned immediately.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if is_transient(&e) && attempt < self.max_retries => {
                    attempt += 1;

                    let delay_ms = (self.initial_delay_ms as f64
                        * BACKOFF_MULTIPLIER.powi(attempt as i32 - 1))
                        as u64;
                    let delay_ms = delay_ms.min(MAX_DELAY_MS);

                    crate::log_retry_attempt!(attempt, self.max_retries, e);
                    tracing::debug!(delay_ms, "Backing off before retry");

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, prompt: &str) -> Result<serde_json::Value> {
        let mut request = self.client.post(&self.endpoint).json(&AnswerRequest {
            model: &self.model_id,
            prompt,
        });

        if let Some(auth) = self.auth_header_value() {
            request = request.header("Authorization", auth);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| PipelineError::ConnectionFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PipelineError::RequestFailed {
                status: status.as_u16(),
                message: body,
            }
            .into());
        }

        Ok(resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| PipelineError::InvalidResponse(e.to_string()))?)
    }

    fn extract_answer(&self, body: &serde_json::Value) -> Result<String> {
        let value = if self.response_pointer.is_empty() {
            Some(body)
        } else {
            body.pointer(&self.response_pointer)
        };

        match value {
            Some(serde_json::Value::String(answer)) => Ok(answer.clone()),
            Some(other) => Err(PipelineError::InvalidResponse(format!(
                "value at '{}' is not a string: {other}",
                self.response_pointer
            ))
            .into()),
            None => Err(PipelineError::InvalidResponse(format!(
                "no value at '{}'",
                self.response_pointer
            ))
            .into()),
        }
    }
}

fn is_transient(error: &ShroudError) -> bool {
    match error {
        ShroudError::Pipeline(PipelineError::ConnectionFailed(_)) => true,
        ShroudError::Pipeline(PipelineError::RequestFailed { status, .. }) => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        _ => false,
    }
}

#[async_trait]
impl AnswerModel for HttpAnswerModel {
    async fn answer(&self, context: &str, question: &str) -> Result<String> {
        let prompt = self.template.render(context, question);

        tracing::debug!(
            model_id = %self.model_id,
            prompt_chars = prompt.chars().count(),
            "Requesting answer"
        );

        let body = self.retry_request(|| self.send(&prompt)).await?;
        self.extract_answer(&body)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
