pub mod error;
pub mod config;
pub mod logging;
pub mod format;
pub mod template;
pub mod request;
pub mod retry;
pub mod providers;
pub mod orchestrator;
pub mod tuner;

/*

scaffold-gen: the generation core behind the project scaffolder.
Templates plus context go in, validated and metered LLM output comes
out; the tuner adapts existing reference text to a new project.

src/
├── lib.rs           # Re-exports
├── error.rs         # Error and AdapterError
├── config.rs        # OrchestratorConfig / ClientConfig loading
├── logging.rs       # env_logger setup
├── format.rs        # OutputFormat and its prompt instructions
├── template.rs      # {placeholder} context injection
├── request.rs       # Completion request/response wire types
├── retry.rs         # RetryPolicy, RetryState, Sleeper
├── providers/       # CompletionClient trait + Anthropic adapter
├── orchestrator.rs  # generate(): validate, inject, retry, extract
└── tuner.rs         # tune(): network and dry-run executors

*/

pub use config::{ClientConfig, OrchestratorConfig};
pub use error::{AdapterError, Error, Result};
pub use format::OutputFormat;
pub use orchestrator::{
  Completion
, GenerateOptions
, GenerationResult
, Orchestrator
, TokenUsage
};
pub use providers::{AnthropicClient, CompletionClient};
pub use request::{CompletionRequest, CompletionResponse, ContentBlock, Usage};
pub use retry::{RetryPolicy, RetryState, Sleeper, TokioSleeper};
pub use template::{context, Context};
pub use tuner::{Tuner, TuningExecutor, TuningRequest, TuningResult};
