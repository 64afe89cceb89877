//! Logger setup for binaries and tests embedding the core

use log::debug;

/// Install `env_logger`. `RUST_LOG` wins; otherwise `default_level` is used.
/// Safe to call more than once.
pub fn init(default_level: &str)
{   let env = env_logger::Env::default()
      .default_filter_or(default_level.to_string());
    if env_logger::Builder::from_env(env)
      .format_timestamp_millis()
      .try_init()
      .is_ok()
    {   debug!("Logger initialized (default level: {})", default_level);
    }
}

/// Install `env_logger` using the level from `config`
pub fn init_from_config(config: &crate::config::OrchestratorConfig)
{   init(&config.log_level)
}
