//! # Strategy Tester
//!
//! Applies a strategy's trade sequence to cached daily history and estimates the
//! compounded return, averaged across a ticker universe.
//!
//! History is fetched once per ticker with `Tester::load` (or inserted directly), after
//! which `Tester::test` is a synchronous, read-only computation that any number of
//! threads can run against the same cache.

use crate::error::BacktestError;
use api_client::{fetch_daily_history, MarketDataClient};
use chrono::{DateTime, NaiveDate, Utc};
use core_types::BarSeries;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::HashMap;
use strategies::Strategy;

pub mod error;
pub mod report;

pub use report::{SkippedTicker, TestReport, TickerEstimate};

/// The multi-ticker strategy tester.
pub struct Tester {
    tickers: Vec<String>,
    period_days: u32,
    cache: HashMap<String, BarSeries>,
}

impl Tester {
    pub fn new(tickers: Vec<String>, period_days: u32) -> Result<Self, BacktestError> {
        if tickers.is_empty() {
            return Err(BacktestError::NoTickers);
        }
        Ok(Self {
            tickers,
            period_days,
            cache: HashMap::new(),
        })
    }

    /// Pre-populates the cache, e.g. with series read from somewhere other than the API.
    pub fn with_series(mut self, series: HashMap<String, BarSeries>) -> Self {
        self.cache.extend(series);
        self
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn period_days(&self) -> u32 {
        self.period_days
    }

    pub fn series(&self, ticker: &str) -> Option<&BarSeries> {
        self.cache.get(ticker)
    }

    /// Puts a ready-made series into the cache, replacing any previous one.
    pub fn insert_series(&mut self, ticker: impl Into<String>, series: BarSeries) {
        self.cache.insert(ticker.into(), series);
    }

    /// Downloads history for every ticker not yet cached, concurrently.
    ///
    /// A ticker whose resolution or download fails is logged and left out of the cache;
    /// later evaluations skip it. Fails only if no ticker ends up cached.
    /// Returns the number of tickers fetched by this call.
    pub async fn load(
        &mut self,
        client: &dyn MarketDataClient,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<usize, BacktestError> {
        let pending: Vec<String> = self
            .tickers
            .iter()
            .filter(|t| !self.cache.contains_key(*t))
            .cloned()
            .collect();
        let period_days = self.period_days;

        let fetches = pending.iter().map(|ticker| async move {
            let instrument = client.resolve_instrument(ticker).await?;
            tracing::debug!(ticker = %ticker, figi = %instrument.figi, "Resolved instrument");
            fetch_daily_history(client, &instrument.figi, period_days, window_days, now).await
        });
        let results = join_all(fetches).await;

        let mut loaded = 0;
        for (ticker, result) in pending.into_iter().zip(results) {
            match result {
                Ok(series) => {
                    tracing::info!(ticker = %ticker, bars = series.len(), "Loaded history");
                    self.cache.insert(ticker, series);
                    loaded += 1;
                }
                Err(e) => tracing::warn!(ticker = %ticker, "Failed to load history: {}", e),
            }
        }

        if self.cache.is_empty() {
            return Err(BacktestError::NoUsableTickers);
        }
        Ok(loaded)
    }

    /// Evaluates `strategy` on every ticker and averages the compounded estimates.
    ///
    /// Data problems confined to one ticker skip that ticker. Strategy errors abort the
    /// whole evaluation.
    pub fn test(&self, strategy: &dyn Strategy) -> Result<TestReport, BacktestError> {
        let mut tickers = Vec::with_capacity(self.tickers.len());
        let mut skipped = Vec::new();

        for ticker in &self.tickers {
            let outcome = match self.cache.get(ticker) {
                Some(series) => estimate_ticker(ticker, series, strategy),
                None => Err(BacktestError::DataUnavailable(ticker.clone())),
            };
            match outcome {
                Ok(estimate) => {
                    tracing::debug!(ticker = %ticker, trades = estimate.trades, estimate = %estimate.estimate, "Ticker estimate");
                    tickers.push(estimate);
                }
                Err(e @ BacktestError::Strategy(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(ticker = %ticker, "Skipping ticker: {}", e);
                    skipped.push(SkippedTicker {
                        ticker: ticker.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if tickers.is_empty() {
            return Err(BacktestError::NoUsableTickers);
        }

        let total: Decimal = tickers.iter().map(|t| t.estimate).sum();
        let average = total / Decimal::from(tickers.len());

        Ok(TestReport {
            strategy: strategy.id(),
            periods: strategy.periods(),
            tickers,
            skipped,
            average,
        })
    }
}

/// Compounds the return of every completed buy/sell pair for one ticker.
///
/// Each leg is priced at its bar's open/low midpoint. A trade date without a bar is a
/// `DataConsistency` error rather than a zero price.
pub fn estimate_ticker(
    ticker: &str,
    series: &BarSeries,
    strategy: &dyn Strategy,
) -> Result<TickerEstimate, BacktestError> {
    let sequence = strategy.sequence(series)?;

    let price_on = |date: NaiveDate| {
        series
            .execution_price(date)
            .ok_or_else(|| BacktestError::DataConsistency {
                ticker: ticker.to_string(),
                date,
            })
    };

    let mut estimate = Decimal::ONE;
    for (buy, sell) in sequence.pairs() {
        let buy_price = price_on(buy)?;
        let sell_price = price_on(sell)?;
        if buy_price.is_zero() {
            return Err(BacktestError::ZeroPrice {
                ticker: ticker.to_string(),
                date: buy,
            });
        }
        estimate *= Decimal::ONE + (sell_price - buy_price) / buy_price;
    }

    Ok(TickerEstimate {
        ticker: ticker.to_string(),
        trades: sequence.trade_count(),
        estimate,
    })
}
