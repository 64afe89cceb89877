//! Request and response types shared with completion client adapters

use serde::{Deserialize, Serialize};

/// One message in a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   /// User-authored message
    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

/// Single-turn completion request.
/// Immutable for the duration of one `generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest
{   /// Model identifier to target
    pub model: String
  , /// Upper bound on generated tokens
    pub max_tokens: u32
  , /// Sampling temperature
    pub temperature: f32
  , /// Exactly one user message carrying the assembled prompt
    pub messages: Vec<ChatMessage>
}

impl CompletionRequest
{   /// Request carrying `prompt` as the only user message
    pub fn single_turn(
      model: impl Into<String>
    , prompt: impl Into<String>
    , max_tokens: u32
    , temperature: f32
    ) -> Self
    {   CompletionRequest
        {   model: model.into()
          , max_tokens
          , temperature
          , messages: vec![ChatMessage::user(prompt)]
        }
    }

    /// Text of the user prompt
    pub fn prompt(&self) -> &str
    {   self.messages
          .first()
          .map(|m| m.content.as_str())
          .unwrap_or("")
    }
}

/// Block of content in a completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock
{   Text
    {   text: String
    }
  , ToolUse
    {   id: String
      , name: String
      , #[serde(default)]
        input: serde_json::Value
    }
  , #[serde(other)]
    Other
}

impl ContentBlock
{   /// Text carried by this block, if it is a text block
    pub fn as_text(&self) -> Option<&str>
    {   match self
        {   ContentBlock::Text { text } => Some(text.as_str())
          , _ => None
        }
    }
}

/// Token usage as reported by the remote service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage
{   pub input_tokens: u64
  , pub output_tokens: u64
}

/// Successful completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse
{   /// Opaque identifier of the remote message
    pub id: String
  , /// Model that actually served the call
    pub model: String
  , /// Ordered content blocks
    pub content: Vec<ContentBlock>
  , pub usage: Usage
}

impl CompletionResponse
{   /// Concatenation of all text blocks, non-text blocks skipped
    pub fn text(&self) -> String
    {   self.content
          .iter()
          .filter_map(ContentBlock::as_text)
          .collect()
    }
}
