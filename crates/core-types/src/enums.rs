use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one of the available signal strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// Buy/sell when the short average passes through a narrow band around the long one.
    MaBand,
    /// Buy on a cross-up, sell on a cross-down.
    Crossover,
    /// Buy on a cross-up, sell on a fractional drawdown from the running peak.
    TrailingStop,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::MaBand => "ma_band",
            StrategyId::Crossover => "crossover",
            StrategyId::TrailingStop => "trailing_stop",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "ma_band" | "band" => Ok(StrategyId::MaBand),
            "crossover" | "cross" => Ok(StrategyId::Crossover),
            "trailing_stop" | "trail" => Ok(StrategyId::TrailingStop),
            other => Err(CoreError::InvalidInput(
                "strategy".to_string(),
                format!("unknown strategy '{}'", other),
            )),
        }
    }
}

/// The flavour of moving average a strategy computes over close prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaKind {
    #[default]
    Simple,
    Exponential,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strategy_aliases() {
        assert_eq!("crossover".parse::<StrategyId>().unwrap(), StrategyId::Crossover);
        assert_eq!("trailing-stop".parse::<StrategyId>().unwrap(), StrategyId::TrailingStop);
        assert_eq!("MA_BAND".parse::<StrategyId>().unwrap(), StrategyId::MaBand);
        assert!("rsi".parse::<StrategyId>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for id in [StrategyId::MaBand, StrategyId::Crossover, StrategyId::TrailingStop] {
            assert_eq!(id.to_string().parse::<StrategyId>().unwrap(), id);
        }
    }
}
