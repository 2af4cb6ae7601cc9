use crate::error::ConfigError;
use core_types::{MaKind, MaPeriods, StrategyId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub backtest: BacktestConfig,
    pub learner: LearnerConfig,
    #[serde(default)]
    pub strategies: StrategySettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Rejects settings that would make a run meaningless before any data is fetched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.tickers.is_empty() {
            return Err(ConfigError::ValidationError(
                "backtest.tickers must list at least one ticker".to_string(),
            ));
        }
        if self.backtest.period_days == 0 {
            return Err(ConfigError::ValidationError(
                "backtest.period_days must be positive".to_string(),
            ));
        }
        if self.learner.step == 0 {
            return Err(ConfigError::ValidationError(
                "learner.step must be positive".to_string(),
            ));
        }
        if self.api.window_days == 0 {
            return Err(ConfigError::ValidationError(
                "api.window_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Connection settings for the brokerage market-data API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token. Left empty in the file and supplied through the environment.
    #[serde(default)]
    pub token: String,
    /// The largest date span the provider serves in a single candles request.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

/// The universe and history window every evaluation runs over.
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestConfig {
    pub tickers: Vec<String>,
    /// Calendar days of history, ending today.
    pub period_days: u32,
}

/// Grid-search settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerConfig {
    pub strategy: StrategyId,
    pub step: usize,
    pub limit: usize,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

/// Parameters shared by all strategies plus the per-variant extras.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySettings {
    #[serde(default)]
    pub ma_kind: MaKind,
    /// Windows used by a single `test` run when none are given on the command line.
    #[serde(default = "default_periods")]
    pub periods: MaPeriods,
    #[serde(default)]
    pub ma_band: MaBandParams,
    #[serde(default)]
    pub trailing_stop: TrailingStopParams,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            ma_kind: MaKind::default(),
            periods: default_periods(),
            ma_band: MaBandParams::default(),
            trailing_stop: TrailingStopParams::default(),
        }
    }
}

/// Parameters for the moving-average band strategy.
#[derive(Debug, Deserialize, Clone)]
pub struct MaBandParams {
    /// Fractional half-width of the band around the long average.
    pub eps: Decimal,
}

impl Default for MaBandParams {
    fn default() -> Self {
        Self { eps: dec!(0.05) }
    }
}

/// Parameters for the crossover strategy with a trailing-stop exit.
#[derive(Debug, Deserialize, Clone)]
pub struct TrailingStopParams {
    /// Fractional drawdown from the running peak that triggers the exit.
    pub trail_stop: Decimal,
}

impl Default for TrailingStopParams {
    fn default() -> Self {
        Self {
            trail_stop: dec!(0.10),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_window_days() -> u32 {
    365
}

fn default_true() -> bool {
    true
}

fn default_periods() -> MaPeriods {
    MaPeriods::new(10, 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    const SAMPLE: &str = r#"
        [api]
        base_url = "https://example.test/openapi"

        [backtest]
        tickers = ["AAPL", "KO"]
        period_days = 730

        [learner]
        strategy = "trailing_stop"
        step = 5
        limit = 250

        [strategies]
        ma_kind = "exponential"

        [strategies.trailing_stop]
        trail_stop = 0.15
    "#;

    fn parse(source: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn deserializes_with_defaults() {
        let config = parse(SAMPLE);
        assert_eq!(config.backtest.tickers, vec!["AAPL", "KO"]);
        assert_eq!(config.learner.strategy, StrategyId::TrailingStop);
        assert!(!config.learner.parallel);
        assert!(config.learner.show_progress);
        assert_eq!(config.api.window_days, 365);
        assert!(config.api.token.is_empty());
        assert_eq!(config.strategies.ma_kind, MaKind::Exponential);
        assert_eq!(config.strategies.trailing_stop.trail_stop, dec!(0.15));
        assert_eq!(config.strategies.ma_band.eps, dec!(0.05));
        assert_eq!(config.strategies.periods, MaPeriods::new(10, 60));
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_zero_step() {
        let mut config = parse(SAMPLE);
        config.learner.step = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn validation_rejects_empty_universe() {
        let mut config = parse(SAMPLE);
        config.backtest.tickers.clear();
        assert!(config.validate().is_err());
    }
}
