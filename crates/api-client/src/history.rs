use crate::error::ApiError;
use crate::MarketDataClient;
use chrono::{DateTime, Duration, Utc};
use core_types::{Bar, BarSeries};

/// Splits `[now - period_days, now]` into consecutive request windows of at most
/// `window_days`, oldest first. Adjacent windows share their boundary instant.
pub fn request_windows(
    now: DateTime<Utc>,
    period_days: u32,
    window_days: u32,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut windows = Vec::new();
    if window_days == 0 {
        return windows;
    }

    let mut from = now - Duration::days(i64::from(period_days));
    while from < now {
        let to = std::cmp::min(from + Duration::days(i64::from(window_days)), now);
        windows.push((from, to));
        from = to;
    }
    windows
}

/// Downloads `period_days` of daily history ending at `now`, one window at a time.
///
/// Windows are requested oldest first and concatenated. Any bar not strictly after the
/// last kept bar is dropped, so a boundary day returned by two windows appears once.
pub async fn fetch_daily_history(
    client: &dyn MarketDataClient,
    figi: &str,
    period_days: u32,
    window_days: u32,
    now: DateTime<Utc>,
) -> Result<BarSeries, ApiError> {
    let mut bars: Vec<Bar> = Vec::new();

    for (from, to) in request_windows(now, period_days, window_days) {
        let mut batch = client.fetch_candles(figi, from, to).await?;
        batch.sort_by_key(|b| b.date);
        tracing::debug!(figi, %from, %to, count = batch.len(), "Fetched history window");

        for bar in batch {
            if bars.last().is_none_or(|last| bar.date > last.date) {
                bars.push(bar);
            }
        }
    }

    Ok(BarSeries::new(bars)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::Instrument;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    /// Serves one bar per calendar day; both window ends are inclusive.
    struct FakeClient {
        calls: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl MarketDataClient for FakeClient {
        async fn resolve_instrument(&self, ticker: &str) -> Result<Instrument, ApiError> {
            Ok(Instrument {
                figi: format!("FIGI-{}", ticker),
                ticker: ticker.to_string(),
                name: String::new(),
            })
        }

        async fn fetch_candles(
            &self,
            _figi: &str,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<Bar>, ApiError> {
            self.calls.lock().unwrap().push((from, to));
            let mut bars: Vec<Bar> = from
                .date_naive()
                .iter_days()
                .take_while(|d| *d <= to.date_naive())
                .map(|date| Bar {
                    date,
                    open: Decimal::TEN,
                    high: Decimal::TEN,
                    low: Decimal::TEN,
                    close: Decimal::TEN,
                    volume: Decimal::ZERO,
                })
                .collect();
            bars.reverse();
            Ok(bars)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn windows_cover_period_without_gaps() {
        let windows = request_windows(now(), 800, 365);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].0, now() - Duration::days(800));
        assert_eq!(windows[0].1, windows[1].0);
        assert_eq!(windows[1].1, windows[2].0);
        assert_eq!(windows[2].1, now());
        assert_eq!(windows[2].1 - windows[2].0, Duration::days(70));
    }

    #[test]
    fn period_within_one_window_is_one_request() {
        assert_eq!(request_windows(now(), 100, 365).len(), 1);
        assert!(request_windows(now(), 0, 365).is_empty());
    }

    #[tokio::test]
    async fn concatenates_without_duplicating_boundary_days() {
        let client = FakeClient {
            calls: Mutex::new(Vec::new()),
        };
        let series = fetch_daily_history(&client, "FIGI", 730, 365, now())
            .await
            .unwrap();

        assert_eq!(client.calls.lock().unwrap().len(), 2);
        // 730 days back plus today, each day once.
        assert_eq!(series.len(), 731);
        assert_eq!(
            series.first_date(),
            Some(NaiveDate::from_ymd_opt(2022, 6, 2).unwrap())
        );
        assert_eq!(series.last_date(), Some(now().date_naive()));
    }
}
