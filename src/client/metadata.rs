//! Item metadata collaborator
//!
//! Resolves an item id to its display name, noted-variant link and price
//! figures. Lookups on the signal-handling path are synchronous against an
//! in-memory cache; the HTTP provider refreshes that cache from a bulk feed
//! on a background task so valuation never blocks on the network.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use serde::Deserialize;

/// Resolved metadata for one item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMetadata {
    pub id: u32,
    pub name: String,
    /// Base item id this noted variant aliases to for market pricing.
    pub noted_link: Option<u32>,
    /// Market (exchange) unit price.
    pub market_price: i64,
    /// Store unit price, the basis for high alchemy values.
    pub store_price: i64,
}

#[derive(Debug)]
pub enum MetadataError {
    UnknownItem(u32),
    /// No feed has been loaded into the cache yet.
    NotLoaded,
    Http(String),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::UnknownItem(id) => write!(f, "Unknown item id: {}", id),
            MetadataError::NotLoaded => write!(f, "Item metadata not loaded yet"),
            MetadataError::Http(e) => write!(f, "Item feed error: {}", e),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<reqwest::Error> for MetadataError {
    fn from(err: reqwest::Error) -> Self {
        MetadataError::Http(err.to_string())
    }
}

/// Synchronous item lookup used by the valuation path.
pub trait ItemMetadataProvider: Send + Sync {
    fn resolve(&self, id: u32) -> Result<ItemMetadata, MetadataError>;
}

/// Fixed in-memory provider. Used by tests and by the runtime when no item
/// feed is configured (everything resolves to placeholders).
#[derive(Debug, Default)]
pub struct StaticItemMetadataProvider {
    items: HashMap<u32, ItemMetadata>,
}

impl StaticItemMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, meta: ItemMetadata) {
        self.items.insert(meta.id, meta);
    }
}

impl ItemMetadataProvider for StaticItemMetadataProvider {
    fn resolve(&self, id: u32) -> Result<ItemMetadata, MetadataError> {
        self.items
            .get(&id)
            .cloned()
            .ok_or(MetadataError::UnknownItem(id))
    }
}

/// One entry of the bulk item mapping feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemMappingEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub noted_link: Option<u32>,
}

/// Latest market prices, keyed by item id (as a string in the feed).
#[derive(Debug, Clone, Deserialize)]
pub struct LatestPrices {
    pub data: HashMap<String, PricePoint>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PricePoint {
    #[serde(default)]
    pub high: Option<i64>,
    #[serde(default)]
    pub low: Option<i64>,
}

/// HTTP-backed provider: bulk item mapping + latest price feed, cached.
///
/// `resolve` never touches the network; `refresh` rebuilds the whole cache
/// and swaps it in one write.
pub struct HttpItemMetadataProvider {
    base_url: String,
    http: reqwest::Client,
    cache: RwLock<HashMap<u32, ItemMetadata>>,
}

impl HttpItemMetadataProvider {
    pub fn new(base_url: &str) -> Result<Self, MetadataError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Fetch the mapping and price feeds and swap the cache.
    ///
    /// Returns the number of cached items. A failure leaves the previous
    /// cache untouched.
    pub async fn refresh(&self) -> Result<usize, MetadataError> {
        let mapping_url = format!("{}/mapping", self.base_url);
        let response = self.http.get(&mapping_url).send().await?;
        if !response.status().is_success() {
            return Err(MetadataError::Http(format!(
                "Mapping feed returned {}",
                response.status()
            )));
        }
        let mapping: Vec<ItemMappingEntry> = response.json().await?;

        let latest_url = format!("{}/latest", self.base_url);
        let response = self.http.get(&latest_url).send().await?;
        if !response.status().is_success() {
            return Err(MetadataError::Http(format!(
                "Price feed returned {}",
                response.status()
            )));
        }
        let latest: LatestPrices = response.json().await?;

        let mut items: HashMap<u32, ItemMetadata> = HashMap::with_capacity(mapping.len());
        for entry in mapping {
            let market_price = latest
                .data
                .get(&entry.id.to_string())
                .and_then(|p| p.high.or(p.low))
                .unwrap_or(0);

            items.insert(
                entry.id,
                ItemMetadata {
                    id: entry.id,
                    name: entry.name,
                    noted_link: entry.noted_link,
                    market_price,
                    store_price: entry.value,
                },
            );
        }

        let count = items.len();
        *self.cache.write().unwrap() = items;
        log::debug!("Item metadata cache refreshed: {} items", count);
        Ok(count)
    }

    pub fn cached_items(&self) -> usize {
        self.cache.read().unwrap().len()
    }
}

impl ItemMetadataProvider for HttpItemMetadataProvider {
    fn resolve(&self, id: u32) -> Result<ItemMetadata, MetadataError> {
        let cache = self.cache.read().unwrap();
        if cache.is_empty() {
            return Err(MetadataError::NotLoaded);
        }
        cache
            .get(&id)
            .cloned()
            .ok_or(MetadataError::UnknownItem(id))
    }
}
