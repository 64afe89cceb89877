//! Context injection for prompt templates
//!
//! A placeholder is `{name}` where `name` is one or more ASCII letters,
//! digits or underscores. Any other brace sequence (JSON bodies, shell
//! `${VAR}` with spaces, lone braces) is copied through literally.
//! Substitution is a single pass: injected values are never rescanned.

use std::collections::HashMap;
use log::trace;

/// Mapping of placeholder names to substitution values
pub type Context = HashMap<String, String>;

/// Build a context from key/value pairs
pub fn context<I, K, V>(pairs: I) -> Context
where
  I: IntoIterator<Item = (K, V)>
, K: Into<String>
, V: Into<String>
{   pairs
      .into_iter()
      .map(|(k, v)| (k.into(), v.into()))
      .collect()
}

/// Substitute every placeholder in `template` from `context`.
///
/// Fails with `PromptTemplate` naming the first placeholder, in template
/// order, that has no key in `context`.
pub fn inject_context(
  template: &str
, context: &Context
) -> crate::error::Result<String>
{   let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{')
    {   rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match placeholder_name(after)
        {   Some(name) => {
              let value = context.get(name).ok_or_else(|| {
                crate::error::Error::PromptTemplate(
                  format!("missing context variable '{}'", name)
                )
              })?;
              trace!("Injecting '{}' ({} bytes)", name, value.len());
              rendered.push_str(value);
              rest = &after[name.len() + 1..];
            }
          , None => {
              rendered.push('{');
              rest = after;
            }
        }
    }

    rendered.push_str(rest);
    Ok(rendered)
}

/// Placeholder names referenced by `template`, in order of appearance
#[cfg(test)]
fn placeholders(template: &str) -> Vec<&str>
{   let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{')
    {   let after = &rest[open + 1..];
        match placeholder_name(after)
        {   Some(name) => {
              names.push(name);
              rest = &after[name.len() + 1..];
            }
          , None => rest = after
        }
    }
    names
}

/// Name of the placeholder starting right after a `{`, if one is there
fn placeholder_name(s: &str) -> Option<&str>
{   let end = s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))?;
    if end == 0 || !s[end..].starts_with('}')
    {   return None;
    }
    Some(&s[..end])
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::error::Error;

    #[test]
    fn test_simple_substitution()
    {   let ctx = context([("doc", "README"), ("proj", "demo")]);
        let out = inject_context("Write {doc} for {proj}", &ctx).unwrap();
        assert_eq!(out, "Write README for demo");
    }

    #[test]
    fn test_repeated_placeholder()
    {   let ctx = context([("x", "1")]);
        assert_eq!(inject_context("{x}+{x}", &ctx).unwrap(), "1+1");
    }

    #[test]
    fn test_missing_variable_is_named()
    {   let ctx = context([("doc", "README")]);
        let err = inject_context("Write {doc} for {proj}", &ctx).unwrap_err();
        match err
        {   Error::PromptTemplate(msg) => assert!(msg.contains("proj"))
          , other => panic!("unexpected error: {:?}", other)
        }
    }

    #[test]
    fn test_non_placeholder_braces_are_literal()
    {   let ctx = context([("name", "ci")]);
        let out = inject_context(
          "{ \"key\": 1 } {} ${ HOME } {name}",
          &ctx
        ).unwrap();
        assert_eq!(out, "{ \"key\": 1 } {} ${ HOME } ci");
    }

    #[test]
    fn test_unclosed_brace_is_literal()
    {   let ctx = context([("a", "b")]);
        assert_eq!(inject_context("tail {a", &ctx).unwrap(), "tail {a");
    }

    #[test]
    fn test_single_pass_does_not_expand_values()
    {   let ctx = context([("outer", "{inner}")]);
        assert_eq!(inject_context("{outer}", &ctx).unwrap(), "{inner}");
    }

    #[test]
    fn test_extra_keys_are_ignored()
    {   let ctx = context([("used", "yes"), ("unused", "no")]);
        assert_eq!(inject_context("{used}", &ctx).unwrap(), "yes");
    }

    #[test]
    fn test_placeholders_in_order()
    {   assert_eq!(
          placeholders("{b} then {a} then { c } then {b}"),
          vec!["b", "a", "b"]
        );
    }
}
