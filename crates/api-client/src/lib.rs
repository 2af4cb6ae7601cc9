use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use configuration::ApiConfig;
use core_types::Bar;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

pub mod error;
pub mod history;
pub mod responses;

// --- Public API ---
pub use history::{fetch_daily_history, request_windows};
pub use responses::Instrument;
use responses::{ApiErrorResponse, Candles, Envelope, InstrumentList};

/// The abstract interface for a market-data provider.
///
/// The tester only ever talks to this trait, so tests can swap the live client for an
/// in-memory one.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Resolves a ticker symbol. The first search hit is taken as authoritative.
    async fn resolve_instrument(&self, ticker: &str) -> Result<Instrument, ApiError>;

    /// Fetches daily bars for `[from, to]`. The span must fit in one provider request.
    async fn fetch_candles(
        &self,
        figi: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ApiError>;
}

/// A REST client for the Tinkoff Invest OpenAPI market endpoints.
#[derive(Clone)]
pub struct TinkoffClient {
    client: reqwest::Client,
    base_url: String,
}

impl TinkoffClient {
    pub fn new(api_config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_config.token))
            .map_err(|e| ApiError::InvalidData(format!("Invalid API token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        Ok(Self {
            client: reqwest::Client::builder().default_headers(headers).build()?,
            base_url: api_config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<Envelope<T>>(&text)
                .map(|envelope| envelope.payload)
                .map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let api_error: Envelope<ApiErrorResponse> = serde_json::from_str(&text)
                .map_err(|e| ApiError::Deserialization(format!("Failed to deserialize error response: {}. Original text: {}", e, text)))?;
            Err(ApiError::Provider {
                status: status.as_u16(),
                message: api_error.payload.message,
            })
        }
    }
}

#[async_trait]
impl MarketDataClient for TinkoffClient {
    async fn resolve_instrument(&self, ticker: &str) -> Result<Instrument, ApiError> {
        let list: InstrumentList = self
            .get("/market/search/by-ticker", &[("ticker", ticker)])
            .await?;
        list.instruments
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::UnknownTicker(ticker.to_string()))
    }

    async fn fetch_candles(
        &self,
        figi: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ApiError> {
        let from = from.to_rfc3339_opts(SecondsFormat::Secs, true);
        let to = to.to_rfc3339_opts(SecondsFormat::Secs, true);
        let candles: Candles = self
            .get(
                "/market/candles",
                &[("figi", figi), ("from", from.as_str()), ("to", to.as_str()), ("interval", "day")],
            )
            .await?;

        tracing::debug!(figi = %candles.figi, interval = %candles.interval, count = candles.candles.len(), "Fetched candles");

        candles.candles.into_iter().map(Bar::try_from).collect()
    }
}
