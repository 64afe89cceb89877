//! Deterministic fakes shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scaffold_gen::{
  AdapterError
, CompletionClient
, CompletionRequest
, CompletionResponse
, ContentBlock
, Orchestrator
, OrchestratorConfig
, Sleeper
, Usage
};

pub type Outcome = Result<CompletionResponse, AdapterError>;

/// Completion client replaying a scripted queue of outcomes.
/// Once the queue drains every call gets `fallback`.
pub struct FakeClient
{   outcomes: Mutex<VecDeque<Outcome>>
  , fallback: Outcome
  , requests: Mutex<Vec<CompletionRequest>>
}

impl FakeClient
{   pub fn always(outcome: Outcome) -> Arc<Self>
    {   FakeClient::scripted(vec![], outcome)
    }

    pub fn scripted(outcomes: Vec<Outcome>, fallback: Outcome) -> Arc<Self>
    {   Arc::new(FakeClient
        {   outcomes: Mutex::new(outcomes.into())
          , fallback
          , requests: Mutex::new(vec![])
        })
    }

    pub fn calls(&self) -> usize
    {   self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest>
    {   self.requests.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String
    {   self.requests()
          .last()
          .map(|r| r.prompt().to_string())
          .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for FakeClient
{   async fn complete(
      &self
    , request: &CompletionRequest
    ) -> Result<CompletionResponse, AdapterError>
    {   self.requests.lock().unwrap().push(request.clone());
        let next = self.outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Sleeper that records every requested delay and returns at once
#[derive(Default)]
pub struct RecordingSleeper
{   delays: Mutex<Vec<Duration>>
}

impl RecordingSleeper
{   pub fn new() -> Arc<Self>
    {   Arc::new(RecordingSleeper::default())
    }

    pub fn delays(&self) -> Vec<Duration>
    {   self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper
{   async fn sleep(&self, duration: Duration)
    {   self.delays.lock().unwrap().push(duration);
    }
}

pub fn response_with_blocks(blocks: Vec<ContentBlock>) -> CompletionResponse
{   CompletionResponse
    {   id: "msg_test_01".to_string()
      , model: "claude-test-served".to_string()
      , content: blocks
      , usage: Usage
        {   input_tokens: 12
          , output_tokens: 34
        }
    }
}

pub fn text_response(text: &str) -> CompletionResponse
{   response_with_blocks(vec![ContentBlock::Text
    {   text: text.to_string()
    }])
}

pub fn test_config(max_retries: u32) -> OrchestratorConfig
{   OrchestratorConfig
    {   max_retries
      , ..OrchestratorConfig::new("test-key")
    }
}

/// Orchestrator over `client` whose sleeps land in `sleeper`
pub fn orchestrator(
  client: Arc<FakeClient>
, sleeper: Arc<RecordingSleeper>
, max_retries: u32
) -> Orchestrator
{   Orchestrator::with_client(&test_config(max_retries), client)
      .expect("valid test config")
      .with_sleeper(sleeper)
}

pub fn init_logging()
{   scaffold_gen::logging::init("debug");
}
