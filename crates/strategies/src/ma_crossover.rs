use crate::error::StrategyError;
use crate::indicators::{validate_periods, MaPair};
use crate::Strategy;
use chrono::NaiveDate;
use core_types::{BarSeries, MaKind, MaPeriods, StrategyId};

/// Indices at which the short average crossed the long one, split by direction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Crossings {
    pub up: Vec<usize>,
    pub down: Vec<usize>,
}

/// Scans a pair of averages for strict sign changes of `short - long`.
///
/// A touch (spread exactly zero) on either bar is not a crossing. Index 0 has no
/// predecessor and never crosses.
pub fn find_crossings(ma: &MaPair) -> Crossings {
    let mut crossings = Crossings::default();
    for i in 1..ma.len() {
        let (Some(prev), Some(curr)) = (ma.spread(i - 1), ma.spread(i)) else {
            continue;
        };
        if curr > 0.0 && prev < 0.0 {
            crossings.up.push(i);
        } else if curr < 0.0 && prev > 0.0 {
            crossings.down.push(i);
        }
    }
    crossings
}

pub(crate) fn dates_at(series: &BarSeries, indices: &[usize]) -> Vec<NaiveDate> {
    let bars = series.bars();
    indices.iter().map(|&i| bars[i].date).collect()
}

/// The moving average crossover strategy.
///
/// Buys when the short average crosses above the long average and sells when it
/// crosses back below.
#[derive(Debug, Clone)]
pub struct MACrossover {
    periods: MaPeriods,
    kind: MaKind,
}

impl MACrossover {
    /// Creates a new `MACrossover` instance with the given parameters.
    pub fn new(periods: MaPeriods, kind: MaKind) -> Result<Self, StrategyError> {
        validate_periods(periods)?;
        Ok(Self { periods, kind })
    }

    fn crossings(&self, series: &BarSeries) -> Result<Crossings, StrategyError> {
        let ma = MaPair::compute(series, self.periods, self.kind)?;
        Ok(find_crossings(&ma))
    }
}

impl Strategy for MACrossover {
    fn id(&self) -> StrategyId {
        StrategyId::Crossover
    }

    fn periods(&self) -> MaPeriods {
        self.periods
    }

    fn buy_points(&self, series: &BarSeries) -> Result<Vec<NaiveDate>, StrategyError> {
        let crossings = self.crossings(series)?;
        Ok(dates_at(series, &crossings.up))
    }

    fn sell_points(&self, series: &BarSeries) -> Result<Vec<NaiveDate>, StrategyError> {
        let crossings = self.crossings(series)?;
        Ok(dates_at(series, &crossings.down))
    }
}
