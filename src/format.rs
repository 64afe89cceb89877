//! Output formats and the instruction block each one appends to a prompt

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Closed set of formats a generation may be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat
{   /// YAML documents (CI pipelines, pre-commit configs)
    Yaml
  , /// TOML documents (tool configuration)
    Toml
  , /// Markdown documents (READMEs, agent profiles)
    Markdown
  , /// Bash scripts
    Bash
}

impl OutputFormat
{   /// Every supported format, in wire order
    pub const ALL: [OutputFormat; 4] = [
      OutputFormat::Yaml
    , OutputFormat::Toml
    , OutputFormat::Markdown
    , OutputFormat::Bash
    ];

    /// Wire name of the format
    pub fn as_str(&self) -> &'static str
    {   match self
        {   OutputFormat::Yaml => "yaml"
          , OutputFormat::Toml => "toml"
          , OutputFormat::Markdown => "markdown"
          , OutputFormat::Bash => "bash"
        }
    }

    /// Instruction block appended to every prompt requesting this format
    pub fn instructions(&self) -> &'static str
    {   match self
        {   OutputFormat::Yaml => YAML_INSTRUCTIONS
          , OutputFormat::Toml => TOML_INSTRUCTIONS
          , OutputFormat::Markdown => MARKDOWN_INSTRUCTIONS
          , OutputFormat::Bash => BASH_INSTRUCTIONS
        }
    }

    /// Conventional file extension for artifacts in this format
    pub fn file_extension(&self) -> &'static str
    {   match self
        {   OutputFormat::Yaml => "yml"
          , OutputFormat::Toml => "toml"
          , OutputFormat::Markdown => "md"
          , OutputFormat::Bash => "sh"
        }
    }

    /// Comma-separated list of wire names, for error messages
    pub fn allowed_list() -> String
    {   OutputFormat::ALL
          .iter()
          .map(|f| f.as_str())
          .collect::<Vec<_>>()
          .join(", ")
    }
}

impl fmt::Display for OutputFormat
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat
{   type Err = crate::error::Error;

    /// Only the exact lowercase wire names are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   OutputFormat::ALL
          .into_iter()
          .find(|f| f.as_str() == s)
          .ok_or_else(|| crate::error::Error::InvalidFormat
            {   value: s.to_string()
              , allowed: OutputFormat::allowed_list()
            })
    }
}

const YAML_INSTRUCTIONS: &str = "\
Output requirements:
- Output must be valid YAML with 2-space indentation.
- Do not use tabs.
- Return only the YAML document, without code fences or commentary.";

const TOML_INSTRUCTIONS: &str = "\
Output requirements:
- Output must be valid TOML.
- Group related keys under tables and quote string values.
- Return only the TOML document, without code fences or commentary.";

const MARKDOWN_INSTRUCTIONS: &str = "\
Output requirements:
- Output must be well-formed Markdown with ATX (#) headings.
- Use fenced code blocks with a language tag for any code.
- Return only the Markdown document, without surrounding commentary.";

const BASH_INSTRUCTIONS: &str = "\
Output requirements:
- Output must be a valid bash script starting with #!/usr/bin/env bash.
- The script must include `set -euo pipefail` right after the shebang.
- Quote all variable expansions.
- Return only the script, without code fences or commentary.";
