use crate::error::StrategyError;
use crate::ma_band::MaBand;
use crate::ma_crossover::MACrossover;
use crate::trailing_stop::CrossoverTrailingStop;
use crate::Strategy;
use configuration::StrategySettings;
use core_types::{MaPeriods, StrategyId};

/// Creates a new strategy instance for one parameterization.
///
/// Window lengths come from `periods` rather than `settings`, so a grid search can build
/// a fresh, immutable strategy for each cell.
pub fn create_strategy(
    id: StrategyId,
    settings: &StrategySettings,
    periods: MaPeriods,
) -> Result<Box<dyn Strategy>, StrategyError> {
    // The compiler will error if a new StrategyId is added but not handled here.
    match id {
        StrategyId::MaBand => Ok(Box::new(MaBand::new(
            periods,
            settings.ma_kind,
            &settings.ma_band,
        )?)),
        StrategyId::Crossover => Ok(Box::new(MACrossover::new(periods, settings.ma_kind)?)),
        StrategyId::TrailingStop => Ok(Box::new(CrossoverTrailingStop::new(
            periods,
            settings.ma_kind,
            &settings.trailing_stop,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_each_variant_with_requested_periods() {
        let settings = StrategySettings::default();
        for id in [StrategyId::MaBand, StrategyId::Crossover, StrategyId::TrailingStop] {
            let strategy = create_strategy(id, &settings, MaPeriods::new(3, 9)).unwrap();
            assert_eq!(strategy.id(), id);
            assert_eq!(strategy.periods(), MaPeriods::new(3, 9));
        }
    }

    #[test]
    fn propagates_parameter_validation() {
        let settings = StrategySettings::default();
        assert!(create_strategy(StrategyId::Crossover, &settings, MaPeriods::new(9, 3)).is_err());
    }
}
