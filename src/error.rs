//! Error types for generation and tuning

use thiserror::Error as ThisError;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Faults raised by a completion client adapter.
/// Implements Clone so fakes can replay them.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AdapterError
{   /// Remote service refused the call for rate reasons
    #[error("rate limit exceeded: {0}")]
    RateLimited(String)
  , /// Per-call timeout fired before a response arrived
    #[error("request timed out: {0}")]
    Timeout(String)
  , /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(String)
  , /// Non-success status other than rate limiting
    #[error("API error ({status}): {message}")]
    Api
    {   status: u16
      , message: String
    }
  , /// Response body did not match the expected shape
    #[error("parse error: {0}")]
    Parse(String)
}

impl AdapterError
{   /// Whether the orchestrator should retry after this fault
    pub fn is_transient(&self) -> bool
    {   matches!(
          self,
          AdapterError::RateLimited(_) | AdapterError::Timeout(_)
        )
    }
}

/// Errors surfaced by the orchestrator and the tuner
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error
{   /// Template is empty or references a variable the context lacks
    #[error("prompt template error: {0}")]
    PromptTemplate(String)
  , /// Requested output format is outside the closed set
    #[error("invalid output format '{value}'; expected one of: {allowed}")]
    InvalidFormat
    {   value: String
      , allowed: String
    }
  , /// A required text input was empty after trimming
    #[error("{0} cannot be empty")]
    EmptyInput(String)
  , /// No usable credential was supplied
    #[error("missing credential: {0}")]
    MissingCredential(String)
  , /// Configuration could not be loaded or is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String)
  , /// The remote service never produced usable output
    #[error("generation failed: {message}")]
    Generation
    {   message: String
      , #[source]
        cause: Option<AdapterError>
    }
}

impl Error
{   /// Generation failure with no underlying adapter fault
    pub fn generation(message: impl Into<String>) -> Self
    {   Error::Generation
        {   message: message.into()
          , cause: None
        }
    }

    /// Generation failure wrapping the adapter fault behind it
    pub fn generation_caused_by(
      message: impl Into<String>
    , cause: AdapterError
    ) -> Self
    {   Error::Generation
        {   message: message.into()
          , cause: Some(cause)
        }
    }

    /// Adapter fault behind a generation failure, if any
    pub fn cause(&self) -> Option<&AdapterError>
    {   match self
        {   Error::Generation { cause, .. } => cause.as_ref()
          , _ => None
        }
    }

    /// True for failures raised before any network call
    pub fn is_input_error(&self) -> bool
    {   !matches!(self, Error::Generation { .. })
    }
}
