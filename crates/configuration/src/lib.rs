use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    ApiConfig, BacktestConfig, Config, LearnerConfig, LoggingConfig, MaBandParams, StrategySettings,
    TrailingStopParams,
};

/// Environment variable prefix for overriding any key, e.g. `TICKERTAPE__LEARNER__STEP=10`.
pub const ENV_PREFIX: &str = "TICKERTAPE";

/// The brokerage token variable honoured in addition to `[api] token`.
pub const TOKEN_ENV_VAR: &str = "TINVEST_TOKEN";

/// Loads the application configuration from the `config.toml` file.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Loads configuration from the given file, overlaid with `TICKERTAPE__*` environment
/// variables, and validates it.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let mut config = builder.try_deserialize::<Config>()?;

    if config.api.token.is_empty() {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            tracing::debug!("Using API token from {}", TOKEN_ENV_VAR);
            config.api.token = token;
        }
    }

    config.validate()?;
    Ok(config)
}
