use crate::error::ApiError;
use chrono::{DateTime, Utc};
use core_types::Bar;
use rust_decimal::prelude::*;
use serde::Deserialize;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// Every response from the API is wrapped in this envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub tracking_id: Option<String>,
    pub status: String,
    pub payload: T,
}

/// The payload of an error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    pub code: Option<String>,
}

/// `GET /market/search/by-ticker`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentList {
    pub instruments: Vec<Instrument>,
    #[serde(default)]
    pub total: usize,
}

/// A tradable instrument. `figi` is the identifier every other endpoint takes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Instrument {
    pub figi: String,
    pub ticker: String,
    #[serde(default)]
    pub name: String,
}

/// `GET /market/candles`.
#[derive(Debug, Clone, Deserialize)]
pub struct Candles {
    pub figi: String,
    pub interval: String,
    pub candles: Vec<Candle>,
}

/// One OHLCV candle as the provider sends it: short field names, float prices.
#[derive(Debug, Clone, Deserialize)]
pub struct Candle {
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    #[serde(default)]
    pub v: f64,
    pub time: DateTime<Utc>,
}

impl TryFrom<Candle> for Bar {
    type Error = ApiError;

    fn try_from(candle: Candle) -> Result<Self, Self::Error> {
        let price = |value: f64, field: &str| {
            Decimal::from_f64(value).ok_or_else(|| {
                ApiError::InvalidData(format!("Invalid {} price {} at {}", field, value, candle.time))
            })
        };
        Ok(Bar {
            date: candle.time.date_naive(),
            open: price(candle.o, "open")?,
            high: price(candle.h, "high")?,
            low: price(candle.l, "low")?,
            close: price(candle.c, "close")?,
            volume: price(candle.v, "volume")?,
        })
    }
}
