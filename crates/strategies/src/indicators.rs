use crate::error::StrategyError;
use core_types::{BarSeries, MaKind, MaPeriods};
use rust_decimal::prelude::*;
use ta::indicators::ExponentialMovingAverage as Ema;
use ta::Next;

/// Converts a Decimal price to `f64` for the `ta` crate.
pub fn to_f64(value: Decimal, field: &str) -> Result<f64, StrategyError> {
    value.to_f64().ok_or_else(|| {
        StrategyError::IndicatorError(format!("Failed to convert {} {} to f64", field, value))
    })
}

/// Close prices of every bar, in order, as `f64`.
pub fn closes(series: &BarSeries) -> Result<Vec<f64>, StrategyError> {
    series.bars().iter().map(|b| to_f64(b.close, "close")).collect()
}

/// Low prices of every bar, in order.
pub fn lows(series: &BarSeries) -> Result<Vec<f64>, StrategyError> {
    series.bars().iter().map(|b| to_f64(b.low, "low")).collect()
}

/// Computes a moving average of `values`, aligned index-for-index with the input.
///
/// A simple average is `None` until `period` values have been seen. An exponential
/// average is seeded with the first value and defined everywhere.
pub fn moving_average(
    values: &[Decimal],
    period: usize,
    kind: MaKind,
) -> Result<Vec<Option<f64>>, StrategyError> {
    if period == 0 {
        return Err(StrategyError::InvalidParameters(
            "Moving average period must be at least one bar".to_string(),
        ));
    }

    match kind {
        MaKind::Simple => simple_average(values, period),
        MaKind::Exponential => {
            let mut ema = Ema::new(period).map_err(|e| {
                StrategyError::InvalidParameters(format!(
                    "Failed to initialize EMA of period {}: {:?}",
                    period, e
                ))
            })?;
            values
                .iter()
                .map(|&v| Ok(Some(ema.next(to_f64(v, "close")?))))
                .collect()
        }
    }
}

/// Sliding-window mean over exact Decimal sums.
///
/// A window of zeros averages to exactly `0.0`, and two windows holding the same
/// prices average to the same `f64`.
fn simple_average(values: &[Decimal], period: usize) -> Result<Vec<Option<f64>>, StrategyError> {
    let divisor = Decimal::from(period);
    let mut sum = Decimal::ZERO;
    let mut averages = Vec::with_capacity(values.len());

    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= period {
            sum -= values[i - period];
        }
        let average = if i + 1 >= period {
            let mean = sum.checked_div(divisor).ok_or_else(|| {
                StrategyError::IndicatorError(format!("Failed to average window ending at {}", i))
            })?;
            Some(to_f64(mean.normalize(), "average")?)
        } else {
            None
        };
        averages.push(average);
    }
    Ok(averages)
}

/// The short and long moving averages of a series' close prices.
#[derive(Debug, Clone)]
pub struct MaPair {
    pub short: Vec<Option<f64>>,
    pub long: Vec<Option<f64>>,
}

impl MaPair {
    pub fn compute(
        series: &BarSeries,
        periods: MaPeriods,
        kind: MaKind,
    ) -> Result<Self, StrategyError> {
        let closes: Vec<Decimal> = series.bars().iter().map(|b| b.close).collect();
        Ok(Self {
            short: moving_average(&closes, periods.short, kind)?,
            long: moving_average(&closes, periods.long, kind)?,
        })
    }

    pub fn len(&self) -> usize {
        self.short.len()
    }

    pub fn is_empty(&self) -> bool {
        self.short.is_empty()
    }

    /// `short - long` at `i`, if both are defined.
    pub fn spread(&self, i: usize) -> Option<f64> {
        Some(self.short[i]? - self.long[i]?)
    }
}

/// Shared validation for a short/long window pair.
pub fn validate_periods(periods: MaPeriods) -> Result<(), StrategyError> {
    if periods.short == 0 || periods.long == 0 {
        return Err(StrategyError::InvalidParameters(
            "Moving average periods must be at least one bar".to_string(),
        ));
    }
    if periods.short >= periods.long {
        return Err(StrategyError::InvalidParameters(format!(
            "Short MA period must be less than long MA period, got {}",
            periods
        )));
    }
    Ok(())
}

/// Validates a fractional parameter lies strictly inside (0, 1) and converts it.
pub fn fraction(value: Decimal, name: &str) -> Result<f64, StrategyError> {
    if value <= Decimal::ZERO || value >= Decimal::ONE {
        return Err(StrategyError::InvalidParameters(format!(
            "{} must be strictly between 0 and 1, got {}",
            name, value
        )));
    }
    to_f64(value, name)
}
