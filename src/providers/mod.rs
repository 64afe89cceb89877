//! Completion client adapters

pub mod anthropic;

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::request::{CompletionRequest, CompletionResponse};

pub use anthropic::AnthropicClient;

/// Single seam between the orchestrator and a remote completion service.
/// One request in, one response or one categorized fault out.
#[async_trait]
pub trait CompletionClient: Send + Sync
{   async fn complete(
      &self
    , request: &CompletionRequest
    ) -> Result<CompletionResponse, AdapterError>;
}
