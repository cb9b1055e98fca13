//! HTTP collaborators for remote token and validator lists.
//!
//! Each provider implements [`RecordSource`]: fetch the whole list or fail.
//! There is no retry or backoff here; a failed fetch surfaces to the caller.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::RemoteError;

/// Endpoint configuration for the remote providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// BEP2 token list.
    pub binance_tokens_url: String,
    /// BEP8 (mini) token list.
    pub binance_mini_tokens_url: String,
    /// Explorer asset list carrying image URLs.
    pub binance_token_assets_url: String,
    /// Baking Bad public bakers list.
    pub baking_bad_bakers_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        let env_or = |key: &str, fallback: &str| {
            std::env::var(key).unwrap_or_else(|_| fallback.to_string())
        };
        RemoteConfig {
            binance_tokens_url: env_or(
                "BINANCE_URL_TOKENS2",
                "https://dex-atlantic.binance.org/api/v1/tokens?limit=1000",
            ),
            binance_mini_tokens_url: env_or(
                "BINANCE_URL_TOKENS8",
                "https://dex-atlantic.binance.org/api/v1/mini/tokens?limit=1000",
            ),
            binance_token_assets_url: env_or(
                "BINANCE_URL_TOKEN_ASSETS",
                "https://explorer.binance.org/api/v1/assets?page=1&rows=1000",
            ),
            baking_bad_bakers_url: env_or(
                "BAKING_BAD_URL",
                "https://api.baking-bad.org/v2/bakers",
            ),
            timeout_secs: std::env::var("ASSETLINT_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl RemoteConfig {
    /// Create a config from environment variables.
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// A remote list provider.
#[async_trait]
pub trait RecordSource<T>: Send + Sync {
    async fn fetch(&self) -> Result<Vec<T>, RemoteError>;
}

/// Downloads raw image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, RemoteError>;
}

/// Binance DEX token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinanceToken {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

/// Binance explorer asset entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinanceAssetInfo {
    pub asset: String,
    #[serde(rename = "assetImg", default)]
    pub asset_img: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BinanceAssetInfoPage {
    #[serde(rename = "assetInfoList")]
    asset_info_list: Vec<BinanceAssetInfo>,
}

/// Baker entry from the Baking Bad API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakingBadBaker {
    pub address: String,
    #[serde(default)]
    pub free_space: f64,
    #[serde(default)]
    pub fee: f64,
    #[serde(default)]
    pub min_delegation: f64,
    #[serde(default)]
    pub open_for_delegation: bool,
    #[serde(default)]
    pub payout_delay: u32,
    #[serde(default)]
    pub payout_period: u32,
    #[serde(default)]
    pub service_health: String,
}

/// Shared HTTP client with a request timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("assetlint/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;
        Ok(HttpClient { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, RemoteError> {
        debug!(url = %url, "GET");
        self.client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RemoteError::from_reqwest(url, e))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteError> {
        self.get(url)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RemoteError::from_reqwest(url, e))
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| RemoteError::from_reqwest(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageFetcher for HttpClient {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        self.get_bytes(url).await
    }
}

/// BEP2 and BEP8 token lists, concatenated.
pub struct BinanceTokenList {
    http: Arc<HttpClient>,
    tokens_url: String,
    mini_tokens_url: String,
}

impl BinanceTokenList {
    pub fn new(http: Arc<HttpClient>, config: &RemoteConfig) -> Self {
        Self {
            http,
            tokens_url: config.binance_tokens_url.clone(),
            mini_tokens_url: config.binance_mini_tokens_url.clone(),
        }
    }
}

#[async_trait]
impl RecordSource<BinanceToken> for BinanceTokenList {
    async fn fetch(&self) -> Result<Vec<BinanceToken>, RemoteError> {
        info!(
            bep2 = %self.tokens_url,
            bep8 = %self.mini_tokens_url,
            "retrieving binance token lists"
        );
        let mut tokens: Vec<BinanceToken> = self.http.get_json(&self.tokens_url).await?;
        let mini: Vec<BinanceToken> = self.http.get_json(&self.mini_tokens_url).await?;
        tokens.extend(mini);
        info!(count = tokens.len(), "retrieved binance tokens");
        Ok(tokens)
    }
}

/// Explorer asset list (BEP2 only) with image URLs.
pub struct BinanceAssetInfoList {
    http: Arc<HttpClient>,
    url: String,
}

impl BinanceAssetInfoList {
    pub fn new(http: Arc<HttpClient>, config: &RemoteConfig) -> Self {
        Self {
            http,
            url: config.binance_token_assets_url.clone(),
        }
    }
}

#[async_trait]
impl RecordSource<BinanceAssetInfo> for BinanceAssetInfoList {
    async fn fetch(&self) -> Result<Vec<BinanceAssetInfo>, RemoteError> {
        info!(url = %self.url, "retrieving binance asset infos");
        let page: BinanceAssetInfoPage = self.http.get_json(&self.url).await?;
        info!(count = page.asset_info_list.len(), "retrieved binance asset infos");
        Ok(page.asset_info_list)
    }
}

/// Baking Bad public bakers.
pub struct BakingBadBakers {
    http: Arc<HttpClient>,
    url: String,
}

impl BakingBadBakers {
    pub fn new(http: Arc<HttpClient>, config: &RemoteConfig) -> Self {
        Self {
            http,
            url: config.baking_bad_bakers_url.clone(),
        }
    }
}

#[async_trait]
impl RecordSource<BakingBadBaker> for BakingBadBakers {
    async fn fetch(&self) -> Result<Vec<BakingBadBaker>, RemoteError> {
        info!(url = %self.url, "retrieving tezos bakers");
        self.http.get_json(&self.url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_default_urls() {
        let config = RemoteConfig {
            timeout_secs: 5,
            ..RemoteConfig::default()
        };
        assert!(config.binance_tokens_url.starts_with("http"));
        assert!(config.baking_bad_bakers_url.starts_with("http"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_asset_info_page_deserializes() {
        let json = r#"{"assetInfoList":[{"asset":"BNB","assetImg":"https://x/bnb.png"},{"asset":"ONE-5F9"}]}"#;
        let page: BinanceAssetInfoPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.asset_info_list.len(), 2);
        assert_eq!(page.asset_info_list[1].asset_img, None);
    }

    #[test]
    fn test_baker_deserializes_camel_case() {
        let json = r#"{"address":"tz1x","freeSpace":12.5,"fee":0.05,"minDelegation":100,
            "openForDelegation":true,"payoutDelay":6,"payoutPeriod":1,"serviceHealth":"active"}"#;
        let baker: BakingBadBaker = serde_json::from_str(json).unwrap();
        assert_eq!(baker.payout_delay, 6);
        assert_eq!(baker.service_health, "active");
        assert!((baker.free_space - 12.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_fatal() {
        let config = RemoteConfig {
            binance_tokens_url: "http://127.0.0.1:9/tokens".to_string(),
            binance_mini_tokens_url: "http://127.0.0.1:9/mini".to_string(),
            timeout_secs: 5,
            ..RemoteConfig::default()
        };
        let http = Arc::new(HttpClient::new(&config).unwrap());
        let err = BinanceTokenList::new(http, &config).fetch().await.unwrap_err();
        assert!(err.is_fatal(), "{err}");
    }
}
