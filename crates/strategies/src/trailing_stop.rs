use crate::error::StrategyError;
use crate::indicators::{closes, fraction, lows, validate_periods, MaPair};
use crate::ma_crossover::{dates_at, find_crossings};
use crate::Strategy;
use chrono::NaiveDate;
use configuration::TrailingStopParams;
use core_types::{BarSeries, MaKind, MaPeriods, StrategyId};

/// For each entry index, finds the first later bar whose low breaches the trailing stop.
///
/// The peak starts at the entry close and is raised by each close that did not trigger
/// the stop. Entries never stopped out before the data ends produce no exit. Exits are
/// ascending, and entries stopped out on the same bar share one exit.
pub fn trailing_exits(closes: &[f64], lows: &[f64], entries: &[usize], trail: f64) -> Vec<usize> {
    let mut exits = Vec::with_capacity(entries.len());
    for &entry in entries {
        let mut peak = closes[entry];
        for k in entry + 1..closes.len() {
            if lows[k] < peak * (1.0 - trail) {
                exits.push(k);
                break;
            }
            peak = peak.max(closes[k]);
        }
    }
    exits.dedup();
    exits
}

/// Crossover entries with a trailing-stop exit instead of the cross-down.
#[derive(Debug, Clone)]
pub struct CrossoverTrailingStop {
    periods: MaPeriods,
    kind: MaKind,
    trail_stop: f64,
}

impl CrossoverTrailingStop {
    pub fn new(
        periods: MaPeriods,
        kind: MaKind,
        params: &TrailingStopParams,
    ) -> Result<Self, StrategyError> {
        validate_periods(periods)?;
        Ok(Self {
            periods,
            kind,
            trail_stop: fraction(params.trail_stop, "trail_stop")?,
        })
    }

    fn entries(&self, series: &BarSeries) -> Result<Vec<usize>, StrategyError> {
        let ma = MaPair::compute(series, self.periods, self.kind)?;
        Ok(find_crossings(&ma).up)
    }
}

impl Strategy for CrossoverTrailingStop {
    fn id(&self) -> StrategyId {
        StrategyId::TrailingStop
    }

    fn periods(&self) -> MaPeriods {
        self.periods
    }

    fn buy_points(&self, series: &BarSeries) -> Result<Vec<NaiveDate>, StrategyError> {
        let entries = self.entries(series)?;
        Ok(dates_at(series, &entries))
    }

    fn sell_points(&self, series: &BarSeries) -> Result<Vec<NaiveDate>, StrategyError> {
        let entries = self.entries(series)?;
        let exits = trailing_exits(&closes(series)?, &lows(series)?, &entries, self.trail_stop);
        Ok(dates_at(series, &exits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{day, dip_rally_dip, series_from_closes};
    use rust_decimal_macros::dec;

    fn strategy(trail_stop: rust_decimal::Decimal) -> CrossoverTrailingStop {
        CrossoverTrailingStop::new(
            MaPeriods::new(5, 20),
            MaKind::Simple,
            &TrailingStopParams { trail_stop },
        )
        .unwrap()
    }

    #[test]
    fn exits_on_first_breach_of_running_peak() {
        let series = series_from_closes(&dip_rally_dip());
        let strategy = strategy(dec!(0.10));

        assert_eq!(strategy.buy_points(&series).unwrap(), vec![day(34)]);
        // Peak close is 221; day 75 is the first low (196) under 198.9.
        assert_eq!(strategy.sell_points(&series).unwrap(), vec![day(75)]);
        assert_eq!(
            strategy.sequence(&series).unwrap().dates(),
            &[day(34), day(75)]
        );
    }

    #[test]
    fn wide_stop_never_fires() {
        let series = series_from_closes(&dip_rally_dip());
        let strategy = strategy(dec!(0.5));
        assert!(strategy.sell_points(&series).unwrap().is_empty());
        assert!(strategy.sequence(&series).unwrap().is_empty());
    }

    #[test]
    fn clustered_entries_share_an_exit() {
        let closes = [10.0, 12.0, 11.0, 14.0, 12.0, 10.0];
        let exits = trailing_exits(&closes, &closes, &[0, 1], 0.2);
        assert_eq!(exits, vec![5]);
    }

    #[test]
    fn entry_bar_itself_cannot_trigger() {
        let closes = [10.0, 10.0];
        let lows = [1.0, 10.0];
        assert!(trailing_exits(&closes, &lows, &[0], 0.1).is_empty());
    }
}
