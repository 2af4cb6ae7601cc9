use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One trading day's price record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    /// The approximate fill price used by the tester: the midpoint of open and low.
    pub fn execution_price(&self) -> Decimal {
        (self.open + self.low) / dec!(2)
    }
}

/// An ordered, duplicate-free sequence of daily bars for one instrument.
///
/// Construction validates the ordering, so every consumer can rely on
/// strictly increasing dates and binary-search lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, CoreError> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(CoreError::UnorderedBars {
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Looks up the bar for a given trading day.
    pub fn bar_on(&self, date: NaiveDate) -> Option<&Bar> {
        self.bars
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .map(|idx| &self.bars[idx])
    }

    pub fn execution_price(&self, date: NaiveDate) -> Option<Decimal> {
        self.bar_on(date).map(Bar::execution_price)
    }
}

/// A pair of moving-average window lengths, in trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaPeriods {
    pub short: usize,
    pub long: usize,
}

impl MaPeriods {
    pub fn new(short: usize, long: usize) -> Self {
        Self { short, long }
    }
}

impl fmt::Display for MaPeriods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.short, self.long)
    }
}

/// Alternating buy/sell dates, always starting with a buy and never ending on one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TradeSequence {
    dates: Vec<NaiveDate>,
}

impl TradeSequence {
    /// Merges independent buy and sell signal lists into a strictly alternating sequence.
    ///
    /// Both inputs must be ascending. The merge greedily takes the earliest signal of
    /// the side currently needed that falls strictly after the last accepted date.
    /// A final buy without a later sell is dropped.
    pub fn reconcile(buys: &[NaiveDate], sells: &[NaiveDate]) -> Self {
        if buys.is_empty() || sells.is_empty() {
            return Self::default();
        }

        let mut dates = vec![buys[0]];
        let mut awaiting_sell = true;
        let (mut s, mut b) = (0, 0);

        while s < sells.len() && b < buys.len() {
            // `dates` is never empty inside the loop.
            let last = dates[dates.len() - 1];
            if awaiting_sell {
                if sells[s] > last {
                    dates.push(sells[s]);
                    awaiting_sell = false;
                }
                s += 1;
            } else {
                if buys[b] > last {
                    dates.push(buys[b]);
                    awaiting_sell = true;
                }
                b += 1;
            }
        }

        if awaiting_sell {
            dates.pop();
        }

        Self { dates }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of completed buy/sell round trips.
    pub fn trade_count(&self) -> usize {
        self.dates.len() / 2
    }

    /// Iterates over `(buy, sell)` date pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (NaiveDate, NaiveDate)> + '_ {
        self.dates.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    fn days(ns: &[u32]) -> Vec<NaiveDate> {
        ns.iter().map(|&n| day(n)).collect()
    }

    fn bar(n: u32, open: Decimal, low: Decimal) -> Bar {
        Bar {
            date: day(n),
            open,
            high: open + dec!(5),
            low,
            close: open,
            volume: Decimal::ZERO,
        }
    }

    #[test]
    fn rejects_duplicate_and_unordered_dates() {
        let dup = vec![bar(2, dec!(10), dec!(9)), bar(2, dec!(10), dec!(9))];
        assert!(matches!(
            BarSeries::new(dup),
            Err(CoreError::UnorderedBars { .. })
        ));

        let backwards = vec![bar(3, dec!(10), dec!(9)), bar(2, dec!(10), dec!(9))];
        assert!(BarSeries::new(backwards).is_err());
    }

    #[test]
    fn execution_price_is_open_low_midpoint() {
        let series = BarSeries::new(vec![
            bar(1, dec!(10), dec!(8)),
            bar(2, dec!(20), dec!(17)),
        ])
        .unwrap();
        assert_eq!(series.execution_price(day(2)), Some(dec!(18.5)));
        assert_eq!(series.execution_price(day(5)), None);
    }

    #[test]
    fn reconcile_alternates_and_skips_stale_signals() {
        let seq = TradeSequence::reconcile(&days(&[1, 5, 9]), &days(&[3, 4, 10]));
        assert_eq!(seq.dates(), days(&[1, 3, 5, 10]).as_slice());
        assert_eq!(seq.trade_count(), 2);
        let pairs: Vec<_> = seq.pairs().collect();
        assert_eq!(pairs, vec![(day(1), day(3)), (day(5), day(10))]);
    }

    #[test]
    fn reconcile_drops_trailing_buy() {
        let seq = TradeSequence::reconcile(&days(&[1, 5, 9]), &days(&[3, 4]));
        assert_eq!(seq.dates(), days(&[1, 3]).as_slice());
    }

    #[test]
    fn reconcile_with_no_later_sell_is_empty() {
        let seq = TradeSequence::reconcile(&days(&[2, 3]), &days(&[1]));
        assert!(seq.is_empty());
    }

    #[test]
    fn reconcile_empty_inputs() {
        assert!(TradeSequence::reconcile(&[], &days(&[1])).is_empty());
        assert!(TradeSequence::reconcile(&days(&[1]), &[]).is_empty());
    }

    #[test]
    fn reconcile_output_is_even_and_strictly_increasing() {
        let buys = days(&[1, 2, 6, 7, 8, 20, 25]);
        let sells = days(&[2, 3, 4, 9, 15, 21]);
        let seq = TradeSequence::reconcile(&buys, &sells);
        assert_eq!(seq.dates().len() % 2, 0);
        assert!(seq.dates().windows(2).all(|w| w[0] < w[1]));
        for (i, date) in seq.dates().iter().enumerate() {
            if i % 2 == 0 {
                assert!(buys.contains(date));
            } else {
                assert!(sells.contains(date));
            }
        }
    }
}
