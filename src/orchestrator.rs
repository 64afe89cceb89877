//! Generation orchestrator: validation, context injection, format
//! instructions, retried completion calls and token accounting.

use std::sync::Arc;
use log::{debug, trace, warn, error, info};
use serde::{Deserialize, Serialize};

use crate::config::OrchestratorConfig;
use crate::error::{AdapterError, Error, Result};
use crate::format::OutputFormat;
use crate::providers::{AnthropicClient, CompletionClient};
use crate::request::{CompletionRequest, CompletionResponse};
use crate::retry::{RetryPolicy, RetryState, Sleeper, TokioSleeper};
use crate::template::{inject_context, Context};

/// Tokens consumed by one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage
{   pub input_tokens: u64
  , pub output_tokens: u64
}

impl TokenUsage
{   pub fn new(input_tokens: u64, output_tokens: u64) -> Self
    {   TokenUsage
        {   input_tokens
          , output_tokens
        }
    }

    pub fn total_tokens(&self) -> u64
    {   self.input_tokens.saturating_add(self.output_tokens)
    }
}

impl From<crate::request::Usage> for TokenUsage
{   fn from(usage: crate::request::Usage) -> Self
    {   TokenUsage::new(usage.input_tokens, usage.output_tokens)
    }
}

/// Text extracted from a successful completion, before a format is attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion
{   /// Concatenated text blocks, never blank
    pub content: String
  , pub token_usage: TokenUsage
  , /// Model that actually served the call
    pub model: String
  , /// Remote message identifier
    pub message_id: String
}

/// Outcome of a successful `generate` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult
{   pub content: String
  , pub format: OutputFormat
  , pub token_usage: TokenUsage
  , pub model: String
  , pub message_id: String
}

/// Optional per-call overrides; unset fields use the configured defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions
{   pub model: Option<String>
  , pub max_tokens: Option<u32>
  , pub temperature: Option<f32>
}

impl GenerateOptions
{   pub fn new() -> Self
    {   GenerateOptions::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self
    {   self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self
    {   self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self
    {   self.temperature = Some(temperature);
        self
    }
}

/// Turns templates and context into validated, retried completion calls.
///
/// Holds only read-only configuration, so one instance can be shared
/// across concurrent tasks behind an `Arc`.
pub struct Orchestrator
{   client: Arc<dyn CompletionClient>
  , sleeper: Arc<dyn Sleeper>
  , policy: RetryPolicy
  , default_model: String
  , default_max_tokens: u32
  , default_temperature: f32
}

impl Orchestrator
{   /// Orchestrator talking to the Anthropic Messages API
    pub fn new(config: &OrchestratorConfig) -> Result<Self>
    {   config.validate()?;
        let client = AnthropicClient::new(
            config.api_key.clone(),
            &config.client
          )
          .map_err(|e| {
            Error::InvalidConfiguration(
              format!("cannot build completion client: {}", e)
            )
          })?;
        Orchestrator::with_client(config, Arc::new(client))
    }

    /// Orchestrator over an arbitrary completion client
    pub fn with_client(
      config: &OrchestratorConfig
    , client: Arc<dyn CompletionClient>
    ) -> Result<Self>
    {   config.validate()?;
        info!(
          "Orchestrator ready (model: {}, max_retries: {})",
          config.default_model, config.max_retries
        );
        Ok(Orchestrator
        {   client
          , sleeper: Arc::new(TokioSleeper)
          , policy: config.retry_policy()
          , default_model: config.default_model.clone()
          , default_max_tokens: config.default_max_tokens
          , default_temperature: config.default_temperature
        })
    }

    /// Replace the backoff sleep primitive
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self
    {   self.sleeper = sleeper;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy
    {   &self.policy
    }

    pub fn default_model(&self) -> &str
    {   &self.default_model
    }

    /// Render `prompt_template` with `context`, append the instructions
    /// for `output_format`, and run the completion under the retry policy.
    pub async fn generate(
      &self
    , prompt_template: &str
    , context: &Context
    , output_format: &str
    , options: &GenerateOptions
    ) -> Result<GenerationResult>
    {   debug!("generate requested for format: {}", output_format);
        let (prompt, format) = build_prompt(
          prompt_template,
          context,
          output_format
        )?;

        let completion = self.complete_prompt(prompt, options).await?;
        info!(
          "Generated {} ({} tokens)",
          format, completion.token_usage.total_tokens()
        );
        Ok(GenerationResult
        {   content: completion.content
          , format
          , token_usage: completion.token_usage
          , model: completion.model
          , message_id: completion.message_id
        })
    }

    /// Send a fully assembled prompt under the retry policy and extract
    /// its text. No templating or format instructions are applied.
    pub async fn complete_prompt(
      &self
    , prompt: String
    , options: &GenerateOptions
    ) -> Result<Completion>
    {   if prompt.trim().is_empty()
        {   return Err(Error::PromptTemplate(
              "prompt cannot be empty".to_string()
            ));
        }

        let request = CompletionRequest::single_turn(
          options.model.as_deref().unwrap_or(&self.default_model),
          prompt,
          options.max_tokens.unwrap_or(self.default_max_tokens),
          options.temperature.unwrap_or(self.default_temperature)
        );

        let response = self.call_with_retry(&request).await?;
        extract_completion(response)
    }

    /// Submit `request`, retrying rate limits and timeouts with backoff
    async fn call_with_retry(
      &self
    , request: &CompletionRequest
    ) -> Result<CompletionResponse>
    {   let mut state = RetryState::new(self.policy);

        loop
        {   trace!(
              "Attempt {} of {} for model {}",
              state.attempt() + 1,
              self.policy.total_attempts(),
              request.model
            );

            let fault: AdapterError
              = match self.client.complete(request).await
            {   Ok(response) => return Ok(response)
              , Err(e) if e.is_transient() => e
              , Err(e) => {
                  error!("Non-retryable completion error: {}", e);
                  return Err(Error::generation_caused_by(
                    format!("completion request failed: {}", e),
                    e
                  ));
                }
            };

            match state.record_failure()
            {   Some(delay) => {
                  warn!(
                    "Transient error on attempt {}: {}; retrying in {:?}",
                    state.attempt(), fault, delay
                  );
                  self.sleeper.sleep(delay).await;
                }
              , None => {
                  let attempts = state.attempt() + 1;
                  error!(
                    "Giving up after {} attempts: {}",
                    attempts, fault
                  );
                  return Err(Error::generation_caused_by(
                    format!("failed after {} attempts", attempts),
                    fault
                  ));
                }
            }
        }
    }
}

/// Validate inputs and assemble the prompt text sent for `generate`
pub fn build_prompt(
  prompt_template: &str
, context: &Context
, output_format: &str
) -> Result<(String, OutputFormat)>
{   if prompt_template.trim().is_empty()
    {   return Err(Error::PromptTemplate(
          "prompt template cannot be empty".to_string()
        ));
    }
    let format: OutputFormat = output_format.parse()?;
    let injected = inject_context(prompt_template, context)?;
    let prompt = format!("{}\n\n{}", injected, format.instructions());
    Ok((prompt, format))
}

fn extract_completion(response: CompletionResponse) -> Result<Completion>
{   let content = response.text();
    if content.trim().is_empty()
    {   error!("Empty response for message {}", response.id);
        return Err(Error::generation("empty response"));
    }
    Ok(Completion
    {   content
      , token_usage: response.usage.into()
      , model: response.model
      , message_id: response.id
    })
}
