use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use scaffold_gen::config::{
  ENV_API_BASE
, ENV_API_KEY
, ENV_MAX_RETRIES
, ENV_MAX_RETRY_DELAY
, ENV_MODEL
, ENV_RETRY_DELAY
};
use scaffold_gen::{ClientConfig, Error, OrchestratorConfig};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
{   let vars: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults()
{   let config = OrchestratorConfig::new("key");
    assert_eq!(config.default_model, scaffold_gen::config::DEFAULT_MODEL);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.initial_retry_delay_secs, 1.0);
    assert_eq!(config.max_retry_delay_secs, 60.0);
    assert_eq!(config.default_max_tokens, 4096);
    assert_eq!(config.default_temperature, 1.0);
    assert_eq!(config.client, ClientConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_json_partial_document_fills_defaults()
{   let config = OrchestratorConfig::from_json_str(r#"{
      "api_key": "from-json",
      "max_retries": 5,
      "client": { "timeout_secs": 30 }
    }"#).unwrap();
    assert_eq!(config.api_key, "from-json");
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.client.timeout_secs, 30);
    assert_eq!(config.client.api_base, "https://api.anthropic.com");
    assert_eq!(config.initial_retry_delay_secs, 1.0);
}

#[test]
fn test_malformed_json_is_configuration_error()
{   let err = OrchestratorConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_from_file()
{   let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
      file,
      r#"{{"api_key": "file-key", "default_model": "claude-file"}}"#
    ).unwrap();

    let config = OrchestratorConfig::from_file(file.path()).unwrap();
    assert_eq!(config.api_key, "file-key");
    assert_eq!(config.default_model, "claude-file");
}

#[test]
fn test_missing_file_is_configuration_error()
{   let dir = tempfile::tempdir().unwrap();
    let err = OrchestratorConfig::from_file(dir.path().join("absent.json"))
      .unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_lookup_requires_credential()
{   let err = OrchestratorConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, Error::MissingCredential(_)));

    let err = OrchestratorConfig::from_lookup(lookup(&[(ENV_API_KEY, "  ")]))
      .unwrap_err();
    assert!(matches!(err, Error::MissingCredential(_)));
}

#[test]
fn test_lookup_overrides()
{   let config = OrchestratorConfig::from_lookup(lookup(&[
      (ENV_API_KEY, "env-key")
    , (ENV_MODEL, "claude-env")
    , (ENV_API_BASE, "http://127.0.0.1:9999")
    , (ENV_MAX_RETRIES, " 6 ")
    , (ENV_RETRY_DELAY, "0.5")
    , (ENV_MAX_RETRY_DELAY, "10")
    ])).unwrap();

    assert_eq!(config.api_key, "env-key");
    assert_eq!(config.default_model, "claude-env");
    assert_eq!(config.client.api_base, "http://127.0.0.1:9999");
    assert_eq!(config.max_retries, 6);

    let policy = config.retry_policy();
    assert_eq!(policy.max_retries, 6);
    assert_eq!(policy.initial_delay, Duration::from_millis(500));
    assert_eq!(policy.max_delay, Duration::from_secs(10));
}

#[test]
fn test_lookup_rejects_bad_numbers()
{   for (name, raw) in [
      (ENV_MAX_RETRIES, "three")
    , (ENV_MAX_RETRIES, "-1")
    , (ENV_RETRY_DELAY, "soon")
    , (ENV_MAX_RETRY_DELAY, "-5")
    ]
    {   let err = OrchestratorConfig::from_lookup(lookup(&[
          (ENV_API_KEY, "k")
        , (name, raw)
        ])).unwrap_err();
        assert!(
          matches!(err, Error::InvalidConfiguration(_)),
          "{}={} gave {:?}", name, raw, err
        );
    }
}

#[test]
fn test_validate_ranges()
{   let mut config = OrchestratorConfig::new("k");
    config.initial_retry_delay_secs = f64::NAN;
    assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));

    let mut config = OrchestratorConfig::new("k");
    config.default_max_tokens = 0;
    assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));

    let mut config = OrchestratorConfig::new("k");
    config.client.api_base = String::new();
    assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));
}

#[test]
fn test_debug_redacts_credential()
{   let config = OrchestratorConfig::new("sk-ant-secret-value");
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("sk-ant-secret-value"));
    assert!(rendered.contains("<redacted>"));
}
