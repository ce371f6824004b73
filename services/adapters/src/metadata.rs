//! Pool and coin metadata lookup with caching
//!
//! The metadata service keys pools by `"<coinA>-<coinB>"` and the key is
//! order-sensitive, so a miss is retried with the pair reversed. Metadata for a
//! pair never changes once a pool exists, so hits are cached for the life of
//! the client.

use crate::error::MetadataError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use types::{CoinMetadata, CoinType};
use url::Url;

/// Pool id and both sides' display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMetadata {
    pub pool_id: String,
    pub coin_a: CoinMetadata,
    pub coin_b: CoinMetadata,
}

impl PoolMetadata {
    /// Metadata for `coin_type` if it is one side of this pool
    pub fn side(&self, coin_type: &CoinType) -> Option<&CoinMetadata> {
        let wanted = coin_type.normalized();
        [&self.coin_a, &self.coin_b]
            .into_iter()
            .find(|meta| meta.coin_type.normalized() == wanted)
    }
}

#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Pool metadata for an unordered pair, `None` when no pool exists
    async fn pool_metadata(
        &self,
        coin_a: &CoinType,
        coin_b: &CoinType,
    ) -> Result<Option<PoolMetadata>, MetadataError>;
}

/// HTTP client for the metadata service
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: Url,
    cache: DashMap<(String, String), PoolMetadata>,
}

impl MetadataClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MetadataError> {
        // Trailing slash so `join` appends instead of replacing the last segment
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| MetadataError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            cache: DashMap::new(),
        })
    }

    pub fn cached_pairs(&self) -> usize {
        self.cache.len()
    }

    fn cache_key(coin_a: &CoinType, coin_b: &CoinType) -> (String, String) {
        let (a, b) = (coin_a.normalized(), coin_b.normalized());
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    async fn fetch(&self, key: &str) -> Result<Option<PoolMetadata>, MetadataError> {
        let url = self.base_url.join(key).map_err(|e| MetadataError::InvalidUrl {
            url: key.to_string(),
            reason: e.to_string(),
        })?;

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MetadataError::Status {
                status: status.as_u16(),
            });
        }
        Ok(Some(response.json::<PoolMetadata>().await?))
    }
}

#[async_trait]
impl MetadataSource for MetadataClient {
    async fn pool_metadata(
        &self,
        coin_a: &CoinType,
        coin_b: &CoinType,
    ) -> Result<Option<PoolMetadata>, MetadataError> {
        let cache_key = Self::cache_key(coin_a, coin_b);
        if let Some(hit) = self.cache.get(&cache_key) {
            debug!("Metadata cache hit for {}-{}", coin_a, coin_b);
            return Ok(Some(hit.clone()));
        }

        let forward = format!("{}-{}", coin_a, coin_b);
        let found = match self.fetch(&forward).await? {
            Some(metadata) => Some(metadata),
            None => {
                debug!("No pool under {}, trying reversed pair", forward);
                self.fetch(&format!("{}-{}", coin_b, coin_a)).await?
            }
        };

        match &found {
            Some(metadata) => {
                info!("Discovered pool {} for {}-{}", metadata.pool_id, coin_a, coin_b);
                self.cache.insert(cache_key, metadata.clone());
            }
            None => debug!("No pool exists for {}-{}", coin_a, coin_b),
        }
        Ok(found)
    }
}
