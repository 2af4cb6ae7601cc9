use chrono::{Duration, NaiveDate};
use core_types::{Bar, BarSeries};
use rust_decimal::Decimal;

pub fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + Duration::days(i as i64)
}

/// Builds a daily series with `open = close`, `high = close + 1`, `low = close - 1`.
pub fn series_from_closes(closes: &[i64]) -> BarSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            date: day(i),
            open: Decimal::from(c),
            high: Decimal::from(c + 1),
            low: Decimal::from(c - 1),
            close: Decimal::from(c),
            volume: Decimal::ONE_THOUSAND,
        })
        .collect();
    BarSeries::new(bars).unwrap()
}

/// Builds a daily series where every price of a bar equals its close.
pub fn series_from_prices(closes: &[Decimal]) -> BarSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            date: day(i),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: Decimal::ONE_THOUSAND,
        })
        .collect();
    BarSeries::new(bars).unwrap()
}

/// Thirty days cycling through 0.0..0.6, then `tail` for forty days.
///
/// Every 20-day window from day 49 on holds only `tail`.
pub fn fractional_then(tail: Decimal) -> Vec<Decimal> {
    let mut closes: Vec<Decimal> = (0..30).map(|i| Decimal::new(i % 7, 1)).collect();
    closes.extend(std::iter::repeat_n(tail, 40));
    closes
}

/// Thirty days of decline, forty days of steady rally peaking at 221 on day 69,
/// then ten days of 4-point drops.
///
/// With 5/20 simple averages the short average crosses above the long one on day 34
/// and back below on day 76. A 10% trailing stop from the 221 peak fires on day 75.
pub fn dip_rally_dip() -> Vec<i64> {
    let mut closes: Vec<i64> = (0..30).map(|i| 130 - i).collect();
    closes.extend((30..70).map(|i| 101 + 3 * (i - 29)));
    let peak = closes[closes.len() - 1];
    closes.extend((1..=10).map(|k| peak - 4 * k));
    closes
}
