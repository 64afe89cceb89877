//! Content tuning: adapt reference text written for one context to another
//! while keeping its structure, and report what changed.

use std::borrow::Cow;
use std::sync::Arc;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::orchestrator::{GenerateOptions, Orchestrator, TokenUsage};

/// Delimiter between adapted content and the changelog
pub const CHANGES_MARKER: &str = "CHANGES:";

/// Changelog entry reported by a dry run
pub const DRY_RUN_CHANGE: &str = "[DRY RUN] No changes made";

/// Validated inputs to one tuning call
#[derive(Debug, Clone, Copy)]
pub struct TuningRequest<'a>
{   pub source_content: &'a str
  , pub source_context: &'a str
  , pub target_context: &'a str
  , /// Headings whose sections must come back unchanged
    pub preserve_sections: Option<&'a [String]>
}

/// Outcome of a tuning call.
/// Under dry run `content` borrows the caller's input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningResult<'a>
{   pub content: Cow<'a, str>
  , /// Change descriptions in the order the model listed them
    pub changes: Vec<String>
  , pub dry_run: bool
  , pub token_usage_input: u64
  , pub token_usage_output: u64
}

impl<'a> TuningResult<'a>
{   pub fn token_usage(&self) -> TokenUsage
    {   TokenUsage::new(self.token_usage_input, self.token_usage_output)
    }

    /// Detach the result from the input it may borrow
    pub fn into_owned(self) -> TuningResult<'static>
    {   TuningResult
        {   content: Cow::Owned(self.content.into_owned())
          , changes: self.changes
          , dry_run: self.dry_run
          , token_usage_input: self.token_usage_input
          , token_usage_output: self.token_usage_output
        }
    }
}

/// Strategy that turns a validated request into a result
#[async_trait]
pub trait TuningExecutor: Send + Sync
{   async fn execute<'a>(
      &self
    , request: TuningRequest<'a>
    ) -> Result<TuningResult<'a>>;
}

/// Sends the adaptation prompt through the orchestrator
pub struct NetworkExecutor
{   orchestrator: Arc<Orchestrator>
  , options: GenerateOptions
}

impl NetworkExecutor
{   pub fn new(
      orchestrator: Arc<Orchestrator>
    , options: GenerateOptions
    ) -> Self
    {   NetworkExecutor
        {   orchestrator
          , options
        }
    }
}

#[async_trait]
impl TuningExecutor for NetworkExecutor
{   async fn execute<'a>(
      &self
    , request: TuningRequest<'a>
    ) -> Result<TuningResult<'a>>
    {   let prompt = build_tuning_prompt(&request);
        let completion = self.orchestrator
          .complete_prompt(prompt, &self.options)
          .await?;

        let (content, changes) = parse_tuning_response(&completion.content);
        if changes.is_empty()
        {   warn!("Tuning response carried no changelog");
        }
        info!(
          "Tuned content: {} changes, {} tokens",
          changes.len(), completion.token_usage.total_tokens()
        );

        Ok(TuningResult
        {   content: Cow::Owned(content)
          , changes
          , dry_run: false
          , token_usage_input: completion.token_usage.input_tokens
          , token_usage_output: completion.token_usage.output_tokens
        })
    }
}

/// Returns the source untouched without any network call
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughExecutor;

#[async_trait]
impl TuningExecutor for PassThroughExecutor
{   async fn execute<'a>(
      &self
    , request: TuningRequest<'a>
    ) -> Result<TuningResult<'a>>
    {   debug!("Dry run: returning source content unchanged");
        Ok(TuningResult
        {   content: Cow::Borrowed(request.source_content)
          , changes: vec![DRY_RUN_CHANGE.to_string()]
          , dry_run: true
          , token_usage_input: 0
          , token_usage_output: 0
        })
    }
}

/// Adapts content between contexts.
/// The executor is chosen once, at construction.
pub struct Tuner
{   executor: Box<dyn TuningExecutor>
}

impl Tuner
{   /// Tuner that calls the remote service through `orchestrator`
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self
    {   Tuner::with_options(orchestrator, GenerateOptions::default())
    }

    /// Network tuner with per-call overrides for every request it sends
    pub fn with_options(
      orchestrator: Arc<Orchestrator>
    , options: GenerateOptions
    ) -> Self
    {   Tuner::with_executor(Box::new(
          NetworkExecutor::new(orchestrator, options)
        ))
    }

    /// Tuner that never touches the network
    pub fn dry_run() -> Self
    {   Tuner::with_executor(Box::new(PassThroughExecutor))
    }

    /// Pick the network or dry-run strategy from a caller flag
    pub fn select(orchestrator: Arc<Orchestrator>, dry_run: bool) -> Self
    {   if dry_run
        {   Tuner::dry_run()
        } else
        {   Tuner::new(orchestrator)
        }
    }

    pub fn with_executor(executor: Box<dyn TuningExecutor>) -> Self
    {   Tuner
        {   executor
        }
    }

    /// Adapt `source_content` from `source_context` to `target_context`
    pub async fn tune<'a>(
      &self
    , source_content: &'a str
    , source_context: &'a str
    , target_context: &'a str
    , preserve_sections: Option<&'a [String]>
    ) -> Result<TuningResult<'a>>
    {   for (field, value) in [
          ("source_content", source_content)
        , ("source_context", source_context)
        , ("target_context", target_context)
        ]
        {   if value.trim().is_empty()
            {   return Err(Error::EmptyInput(field.to_string()));
            }
        }

        debug!(
          "Tuning {} bytes from '{}' to '{}'",
          source_content.len(), source_context, target_context
        );
        self.executor
          .execute(TuningRequest
          {   source_content
            , source_context
            , target_context
            , preserve_sections
          })
          .await
    }
}

/// Assemble the adaptation prompt for `request`
pub fn build_tuning_prompt(request: &TuningRequest<'_>) -> String
{   let mut prompt = format!(
      "You are adapting reference content written for one project so it \
       fits another.\n\n\
       SOURCE CONTEXT:\n{}\n\n\
       TARGET CONTEXT:\n{}\n\n\
       SOURCE CONTENT:\n{}\n\n\
       INSTRUCTIONS:\n\
       1. Preserve the overall structure, section order and headings.\n\
       2. Adapt terminology, examples and tool references to the target \
       context.\n\
       3. Remove details that only apply to the source context.\n\
       4. Keep the tone and level of detail of the original.\n\
       5. List every change you made at the end.\n",
      request.source_context,
      request.target_context,
      request.source_content
    );

    if let Some(sections) = request.preserve_sections.filter(|s| !s.is_empty())
    {   prompt.push_str(
          "\nPRESERVE EXACTLY:\n\
           The following sections must remain byte-for-byte unchanged:\n"
        );
        for heading in sections
        {   prompt.push_str(&format!("- {}\n", heading));
        }
    }

    prompt.push_str(&format!(
      "\nOUTPUT FORMAT:\n\
       Return the adapted content, then a line containing only `{}`, \
       then one bullet per change:\n\
       <adapted content>\n\
       {}\n\
       - <change description>\n",
      CHANGES_MARKER, CHANGES_MARKER
    ));
    prompt
}

/// Split a tuning response into adapted content and changelog entries.
///
/// Everything before the first `CHANGES:` is content. A missing marker
/// yields the whole trimmed response and no changes. A bullet marker is a
/// `-` or `*` followed by whitespace or the end of the line; a bare marker
/// line carries no entry.
pub fn parse_tuning_response(raw: &str) -> (String, Vec<String>)
{   let Some((content, changelog)) = raw.split_once(CHANGES_MARKER)
    else
    {   return (raw.trim().to_string(), Vec::new());
    };

    let changes = changelog
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .filter_map(|line| {
        let entry = match line.strip_prefix(&['-', '*'][..])
        {   Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
              rest.trim_start()
            }
          , _ => line
        };
        (!entry.is_empty()).then(|| entry.to_string())
      })
      .collect();

    (content.trim().to_string(), changes)
}
