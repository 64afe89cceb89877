//! Configuration for the orchestrator and the completion client

use std::fmt;
use std::path::Path;
use std::time::Duration;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_API_BASE: &str = "ANTHROPIC_BASE_URL";
pub const ENV_MODEL: &str = "SCAFFOLD_MODEL";
pub const ENV_MAX_RETRIES: &str = "SCAFFOLD_MAX_RETRIES";
pub const ENV_RETRY_DELAY: &str = "SCAFFOLD_RETRY_DELAY";
pub const ENV_MAX_RETRY_DELAY: &str = "SCAFFOLD_MAX_RETRY_DELAY";
pub const ENV_LOG_LEVEL: &str = "SCAFFOLD_LOG_LEVEL";

/// Completion client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig
{   /// API base URL
    pub api_base: String
  , /// Per-call request timeout in seconds
    pub timeout_secs: u64
  , /// Value sent in the `anthropic-version` header
    pub api_version: String
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   api_base: "https://api.anthropic.com".to_string()
          , timeout_secs: 600
          , api_version: "2023-06-01".to_string()
        }
    }
}

/// Orchestrator configuration.
/// Created once at startup and read-only afterwards.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig
{   /// Authentication credential for the completion service
    pub api_key: String
  , /// Model used when a call does not override it
    pub default_model: String
  , /// Retries after the first attempt
    pub max_retries: u32
  , /// Delay before the first retry, in seconds
    pub initial_retry_delay_secs: f64
  , /// Cap on any single retry delay, in seconds
    pub max_retry_delay_secs: f64
  , pub default_max_tokens: u32
  , pub default_temperature: f32
  , /// Fallback log filter when RUST_LOG is unset
    pub log_level: String
  , pub client: ClientConfig
}

impl Default for OrchestratorConfig
{   fn default() -> Self
    {   OrchestratorConfig
        {   api_key: String::new()
          , default_model: DEFAULT_MODEL.to_string()
          , max_retries: 3
          , initial_retry_delay_secs: 1.0
          , max_retry_delay_secs: 60.0
          , default_max_tokens: DEFAULT_MAX_TOKENS
          , default_temperature: DEFAULT_TEMPERATURE
          , log_level: "info".to_string()
          , client: ClientConfig::default()
        }
    }
}

impl fmt::Debug for OrchestratorConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("OrchestratorConfig")
          .field("api_key", &"<redacted>")
          .field("default_model", &self.default_model)
          .field("max_retries", &self.max_retries)
          .field("initial_retry_delay_secs", &self.initial_retry_delay_secs)
          .field("max_retry_delay_secs", &self.max_retry_delay_secs)
          .field("default_max_tokens", &self.default_max_tokens)
          .field("default_temperature", &self.default_temperature)
          .field("log_level", &self.log_level)
          .field("client", &self.client)
          .finish()
    }
}

impl OrchestratorConfig
{   /// Defaults with the given credential
    pub fn new(api_key: impl Into<String>) -> Self
    {   OrchestratorConfig
        {   api_key: api_key.into()
          , ..OrchestratorConfig::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self>
    {   serde_json::from_str(json).map_err(|e| {
          Error::InvalidConfiguration(format!("malformed JSON: {}", e))
        })
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self>
    {   let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
          Error::InvalidConfiguration(
            format!("cannot read {}: {}", path.display(), e)
          )
        })?;
        OrchestratorConfig::from_json_str(&raw)
    }

    /// Build from process environment variables
    pub fn from_env() -> Result<Self>
    {   OrchestratorConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
      F: Fn(&str) -> Option<String>
    {   let api_key = lookup(ENV_API_KEY)
          .filter(|k| !k.trim().is_empty())
          .ok_or_else(|| {
            Error::MissingCredential(format!("{} is not set", ENV_API_KEY))
          })?;
        let mut config = OrchestratorConfig::new(api_key);

        if let Some(model) = lookup(ENV_MODEL)
        {   config.default_model = model;
        }
        if let Some(base) = lookup(ENV_API_BASE)
        {   config.client.api_base = base;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL)
        {   config.log_level = level;
        }
        if let Some(raw) = lookup(ENV_MAX_RETRIES)
        {   config.max_retries = parse_var(ENV_MAX_RETRIES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RETRY_DELAY)
        {   config.initial_retry_delay_secs
              = parse_var(ENV_RETRY_DELAY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_RETRY_DELAY)
        {   config.max_retry_delay_secs
              = parse_var(ENV_MAX_RETRY_DELAY, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the credential and numeric ranges
    pub fn validate(&self) -> Result<()>
    {   if self.api_key.trim().is_empty()
        {   return Err(Error::MissingCredential(
              "api_key cannot be empty".to_string()
            ));
        }
        for (name, value) in [
          ("initial_retry_delay_secs", self.initial_retry_delay_secs)
        , ("max_retry_delay_secs", self.max_retry_delay_secs)
        ]
        {   if !value.is_finite() || value < 0.0
            {   return Err(Error::InvalidConfiguration(
                  format!("{} must be a non-negative number", name)
                ));
            }
        }
        if self.default_max_tokens == 0
        {   return Err(Error::InvalidConfiguration(
              "default_max_tokens must be positive".to_string()
            ));
        }
        if self.client.api_base.trim().is_empty()
        {   return Err(Error::InvalidConfiguration(
              "client.api_base cannot be empty".to_string()
            ));
        }
        Ok(())
    }

    /// Retry policy described by this configuration.
    /// Call `validate` first; out-of-range delays fall back to zero.
    pub fn retry_policy(&self) -> RetryPolicy
    {   RetryPolicy::new(
          self.max_retries
        , secs(self.initial_retry_delay_secs)
        , secs(self.max_retry_delay_secs)
        )
    }
}

fn secs(value: f64) -> Duration
{   Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
  T: std::str::FromStr
, T::Err: fmt::Display
{   raw.trim().parse().map_err(|e| {
      Error::InvalidConfiguration(format!("{}: {}", name, e))
    })
}
