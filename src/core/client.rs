//! Async client for a running translation service with retry logic

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::config::ClientConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ErrorResponse, TranslationRequest, TranslationResponse};

/// HTTP client for `POST /traduzir`
#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl TranslationClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Translate text remotely. Blank text is not sent and yields `None`.
    pub async fn translate(&self, text: &str) -> Result<Option<TranslationResponse>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let request = TranslationRequest::new(text);
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!("Retry attempt {} for {}", attempt, self.config.endpoint);
                sleep(backoff_delay(self.config.retry_delay_ms, attempt)).await;
            }

            match self.send_request(&request).await {
                Ok(response) => {
                    if attempt > 0 {
                        info!("Successfully translated after {} retries", attempt);
                    }
                    return Ok(Some(response));
                }
                Err(e) if e.is_retryable() => {
                    warn!("Translation request failed: {}", e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| TranslationError::NetworkError {
            message: "no attempts made".to_string(),
        }))
    }

    /// Check whether the service answers its health endpoint
    pub async fn health(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        Ok(response.status().is_success())
    }

    /// Send actual HTTP request
    async fn send_request(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
        let response = self
            .client
            .post(self.url("/traduzir"))
            .json(request)
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();

        if status.is_success() {
            response
                .json::<TranslationResponse>()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            Err(TranslationError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }
}

/// Exponential backoff before retry `attempt` (1-based), saturating on overflow
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 2_u64
        .checked_pow(attempt.saturating_sub(1))
        .unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor))
}
