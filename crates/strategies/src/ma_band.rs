use crate::error::StrategyError;
use crate::indicators::{fraction, validate_periods, MaPair};
use crate::ma_crossover::dates_at;
use crate::Strategy;
use chrono::NaiveDate;
use configuration::MaBandParams;
use core_types::{BarSeries, MaKind, MaPeriods, StrategyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Rising,
    Falling,
}

/// The moving average band strategy.
///
/// Signals fire while the short average is within `eps` (relative to the long
/// average) of the long one. A buy needs the short average to be rising on that bar,
/// a sell needs it to be falling.
#[derive(Debug, Clone)]
pub struct MaBand {
    periods: MaPeriods,
    kind: MaKind,
    eps: f64,
}

impl MaBand {
    pub fn new(
        periods: MaPeriods,
        kind: MaKind,
        params: &MaBandParams,
    ) -> Result<Self, StrategyError> {
        validate_periods(periods)?;
        Ok(Self {
            periods,
            kind,
            eps: fraction(params.eps, "eps")?,
        })
    }

    fn points(
        &self,
        series: &BarSeries,
        direction: Direction,
    ) -> Result<Vec<NaiveDate>, StrategyError> {
        let ma = MaPair::compute(series, self.periods, self.kind)?;
        let bars = series.bars();
        let mut indices = Vec::new();

        for i in 1..ma.len() {
            let (Some(short), Some(long)) = (ma.short[i], ma.long[i]) else {
                continue;
            };
            if long == 0.0 || !long.is_finite() {
                return Err(StrategyError::Domain {
                    date: bars[i].date,
                    value: long,
                });
            }
            let Some(prev_short) = ma.short[i - 1] else {
                continue;
            };

            let ratio = (short - long) / long;
            if ratio.abs() >= self.eps {
                continue;
            }
            let fired = match direction {
                Direction::Rising => short > prev_short,
                Direction::Falling => short < prev_short,
            };
            if fired {
                indices.push(i);
            }
        }

        Ok(dates_at(series, &indices))
    }
}

impl Strategy for MaBand {
    fn id(&self) -> StrategyId {
        StrategyId::MaBand
    }

    fn periods(&self) -> MaPeriods {
        self.periods
    }

    fn buy_points(&self, series: &BarSeries) -> Result<Vec<NaiveDate>, StrategyError> {
        self.points(series, Direction::Rising)
    }

    fn sell_points(&self, series: &BarSeries) -> Result<Vec<NaiveDate>, StrategyError> {
        self.points(series, Direction::Falling)
    }
}
