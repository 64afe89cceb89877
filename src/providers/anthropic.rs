use std::time::Duration;
use async_trait::async_trait;
use log::{debug, trace, error};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::AdapterError;
use crate::request::{CompletionRequest, CompletionResponse};

const MESSAGES_PATH: &str = "/v1/messages";

// ===== Error Body =====

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope
{   error: ErrorDetail
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorDetail
{   #[serde(rename = "type")]
    kind: String
  , message: String
}

// ===== Anthropic Client =====

/// Completion client for the Anthropic Messages API.
/// Holds no per-call state; pooling is left to reqwest.
pub struct AnthropicClient
{   api_key: String
  , endpoint: String
  , api_version: String
  , http_client: reqwest::Client
}

impl AnthropicClient
{   /// Create a client for `api_key` using the given transport settings
    pub fn new(
      api_key: impl Into<String>
    , config: &ClientConfig
    ) -> Result<Self, AdapterError>
    {   debug!("Creating AnthropicClient for {}", config.api_base);
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            AdapterError::Http(e.to_string())
          })?;

        Ok(AnthropicClient
        {   api_key: api_key.into()
          , endpoint: format!(
              "{}{}",
              config.api_base.trim_end_matches('/'),
              MESSAGES_PATH
            )
          , api_version: config.api_version.clone()
          , http_client
        })
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str
    {   &self.endpoint
    }
}

#[async_trait]
impl crate::providers::CompletionClient for AnthropicClient
{   async fn complete(
      &self
    , request: &CompletionRequest
    ) -> Result<CompletionResponse, AdapterError>
    {   debug!("Posting completion request for: {}", request.model);
        trace!("Anthropic request: {:?}", request);

        let response = self.http_client
          .post(&self.endpoint)
          .header("x-api-key", &self.api_key)
          .header("anthropic-version", &self.api_version)
          .header("content-type", "application/json")
          .json(request)
          .send()
          .await
          .map_err(classify_transport_error)?;

        let status = response.status();
        trace!("Anthropic response status: {}", status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status, &body));
        }

        let body = response.text().await
          .map_err(classify_transport_error)?;
        serde_json::from_str::<CompletionResponse>(&body)
          .map_err(|e| {
            error!("Parse error: {}", e);
            AdapterError::Parse(e.to_string())
          })
    }
}

fn classify_transport_error(e: reqwest::Error) -> AdapterError
{   if e.is_timeout()
    {   debug!("Request timed out: {}", e);
        AdapterError::Timeout(e.to_string())
    } else
    {   error!("HTTP error: {}", e);
        AdapterError::Http(e.to_string())
    }
}

/// Map a non-success status and its body to a fault category
fn classify_status(status: StatusCode, body: &str) -> AdapterError
{   let message = serde_json::from_str::<ErrorEnvelope>(body)
      .map(|env| format!("{}: {}", env.error.kind, env.error.message))
      .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS
    {   debug!("Rate limited: {}", message);
        return AdapterError::RateLimited(message);
    }

    error!("Anthropic API error {}: {}", status, message);
    AdapterError::Api
    {   status: status.as_u16()
      , message
    }
}
