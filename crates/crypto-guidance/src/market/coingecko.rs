//! CoinGecko Market Data Client

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::debug;

use super::MarketDataProvider;
use crate::error::{GuidanceError, Result};
use crate::model::{AssetSnapshot, HistoricalSeries, PricePoint};

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// CoinGecko client configuration
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// API root, without trailing slash
    pub base_url: String,

    /// Optional demo/pro API key
    pub api_key: Option<String>,

    /// Quote currency for prices and market caps
    pub vs_currency: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            vs_currency: "usd".into(),
            timeout_secs: 15,
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("COINGECKO_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let api_key = std::env::var("COINGECKO_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let vs_currency = std::env::var("VS_CURRENCY")
            .map(|c| c.to_lowercase())
            .unwrap_or(defaults.vs_currency);
        let timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            base_url,
            api_key,
            vs_currency,
            timeout_secs,
        }
    }
}

/// `coins/{id}/market_chart` payload; only prices are used
#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

/// CoinGecko REST client
#[derive(Clone, Debug)]
pub struct CoinGeckoClient {
    http: Client,
    config: ProviderConfig,
}

impl CoinGeckoClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if !config.base_url.starts_with("http") {
            return Err(GuidanceError::Config(format!(
                "market data base URL must be http(s): {}",
                config.base_url
            )));
        }
        if config.vs_currency.trim().is_empty() {
            return Err(GuidanceError::Config("quote currency must not be empty".into()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ProviderConfig::from_env())
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = format!("{}/{}", self.config.base_url, path);
        let mut request = self.http.get(&url).query(query);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GuidanceError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

fn to_point((millis, price): (f64, f64)) -> Option<PricePoint> {
    #[allow(clippy::cast_possible_truncation)]
    let timestamp = DateTime::from_timestamp_millis(millis as i64)?;
    Some(PricePoint {
        timestamp,
        price: Decimal::from_f64(price)?,
    })
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn snapshots(&self, ids: &[String]) -> Result<Vec<AssetSnapshot>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = [
            ("vs_currency", self.config.vs_currency.clone()),
            ("ids", ids.join(",")),
            ("order", "market_cap_desc".into()),
            ("per_page", "250".into()),
            ("page", "1".into()),
            ("sparkline", "false".into()),
            ("price_change_percentage", "24h,7d".into()),
        ];
        let snapshots: Vec<AssetSnapshot> = self.get("coins/markets", &query).await?.json().await?;

        debug!(requested = ids.len(), returned = snapshots.len(), "fetched market snapshots");
        Ok(snapshots)
    }

    async fn history(&self, id: &str, days: u32) -> Result<HistoricalSeries> {
        let query = [
            ("vs_currency", self.config.vs_currency.clone()),
            ("days", days.to_string()),
            ("interval", "daily".into()),
        ];
        let chart: MarketChart = self
            .get(&format!("coins/{id}/market_chart"), &query)
            .await?
            .json()
            .await?;

        let points: Vec<PricePoint> = chart.prices.into_iter().filter_map(to_point).collect();
        debug!(%id, samples = points.len(), "fetched price history");
        Ok(HistoricalSeries::from_points(points))
    }

    fn name(&self) -> &str {
        "CoinGecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    /// API key header and query string of the last request a stub saw
    type Seen = Arc<Mutex<Option<(Option<String>, HashMap<String, String>)>>>;

    async fn serve_stub(router: Router) -> ProviderConfig {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        ProviderConfig {
            base_url: format!("http://{addr}"),
            api_key: Some("demo-key".into()),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    fn record(seen: &Seen, headers: &HeaderMap, query: HashMap<String, String>) {
        let key = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        *seen.lock().unwrap() = Some((key, query));
    }

    #[test]
    fn test_market_chart_points() {
        let json = r#"{"prices": [[1700086400000, 36500.5], [1700000000000, 36000]], "total_volumes": []}"#;
        let chart: MarketChart = serde_json::from_str(json).unwrap();
        let points: Vec<PricePoint> = chart.prices.into_iter().filter_map(to_point).collect();
        let series = HistoricalSeries::from_points(points);

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].price, dec!(36000));
        assert_eq!(series.points()[1].price, dec!(36500.5));
    }

    #[test]
    fn test_default_config() {
        let config = ProviderConfig::default();
        assert_eq!(config.base_url, "https://api.coingecko.com/api/v3");
        assert_eq!(config.vs_currency, "usd");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ProviderConfig {
            base_url: "api.coingecko.com".into(),
            ..Default::default()
        };
        assert!(matches!(CoinGeckoClient::new(config), Err(GuidanceError::Config(_))));
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_http_error() {
        let router = Router::new().route(
            "/coins/markets",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "You've exceeded the Rate Limit") }),
        );
        let client = CoinGeckoClient::new(serve_stub(router).await).unwrap();

        let err = client.snapshots(&["bitcoin".to_string()]).await.unwrap_err();
        assert!(matches!(err, GuidanceError::Http { status: 429, .. }));
        assert!(err.user_message().contains("rate limit"));
    }

    #[tokio::test]
    async fn test_snapshots_send_key_and_query() {
        let seen = Seen::default();
        let router = Router::new()
            .route(
                "/coins/markets",
                get(
                    |State(seen): State<Seen>,
                     headers: HeaderMap,
                     Query(query): Query<HashMap<String, String>>| async move {
                        record(&seen, &headers, query);
                        Json(json!([{
                            "id": "bitcoin",
                            "symbol": "btc",
                            "name": "Bitcoin",
                            "current_price": 50000,
                            "market_cap": "1000000000000",
                            "total_volume": null
                        }]))
                    },
                ),
            )
            .with_state(seen.clone());
        let client = CoinGeckoClient::new(serve_stub(router).await).unwrap();

        let ids = vec!["bitcoin".to_string(), "ethereum".to_string()];
        let snapshots = client.snapshots(&ids).await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].current_price, Some(dec!(50000)));
        assert_eq!(snapshots[0].market_cap, Some(dec!(1000000000000)));
        assert!(snapshots[0].total_volume_24h.is_none());

        let (key, query) = seen.lock().unwrap().take().unwrap();
        assert_eq!(key.as_deref(), Some("demo-key"));
        assert_eq!(query["ids"], "bitcoin,ethereum");
        assert_eq!(query["vs_currency"], "usd");
        assert_eq!(query["price_change_percentage"], "24h,7d");
    }

    #[tokio::test]
    async fn test_history_returns_ascending_series() {
        let seen = Seen::default();
        let router = Router::new()
            .route(
                "/coins/{id}/market_chart",
                get(
                    |State(seen): State<Seen>,
                     Path(id): Path<String>,
                     headers: HeaderMap,
                     Query(query): Query<HashMap<String, String>>| async move {
                        record(&seen, &headers, query);
                        if id != "solana" {
                            return (StatusCode::NOT_FOUND, Json(json!({"error": "coin not found"})));
                        }
                        // Newest first, to check the client reorders
                        let body: Value = json!({
                            "prices": [
                                [1_700_172_800_000_i64, 60.5],
                                [1_700_086_400_000_i64, 59.0],
                                [1_700_000_000_000_i64, 58.25]
                            ],
                            "market_caps": [],
                            "total_volumes": []
                        });
                        (StatusCode::OK, Json(body))
                    },
                ),
            )
            .with_state(seen.clone());
        let client = CoinGeckoClient::new(serve_stub(router).await).unwrap();

        let series = client.history("solana", 90).await.unwrap();
        let prices: Vec<Decimal> = series.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![dec!(58.25), dec!(59.0), dec!(60.5)]);
        assert!(series.points().windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        let (_, query) = seen.lock().unwrap().take().unwrap();
        assert_eq!(query["days"], "90");
        assert_eq!(query["interval"], "daily");

        let err = client.history("not-a-coin", 90).await.unwrap_err();
        assert!(matches!(err, GuidanceError::Http { status: 404, .. }));
    }
}
