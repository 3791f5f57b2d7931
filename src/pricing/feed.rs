//! Spot-price feeds.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::chains::types::Chain;
use crate::chains::upstream::{join_url, UpstreamClient, UpstreamError};
use crate::pricing::types::{PriceQuote, VS_CURRENCIES};

/// Source of multi-currency spot prices.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch quotes for every chain in `chains` with one upstream call.
    ///
    /// Chains the feed has no price for are simply absent from the map.
    async fn spot_prices(&self, chains: &[Chain]) -> Result<HashMap<Chain, PriceQuote>, UpstreamError>;
}

/// CoinGecko `simple/price` feed.
#[derive(Debug, Clone)]
pub struct CoinGeckoFeed {
    client: UpstreamClient,
    base_url: String,
}

impl CoinGeckoFeed {
    pub fn new(client: UpstreamClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn spot_prices(&self, chains: &[Chain]) -> Result<HashMap<Chain, PriceQuote>, UpstreamError> {
        let ids = chains
            .iter()
            .map(Chain::price_feed_id)
            .collect::<Vec<_>>()
            .join(",");
        let url = join_url(&self.base_url, "simple/price");

        let quotes: HashMap<String, PriceQuote> = self
            .client
            .get_json(&url, &[("ids", ids.as_str()), ("vs_currencies", VS_CURRENCIES)])
            .await?;

        Ok(quotes
            .into_iter()
            .filter_map(|(id, quote)| Chain::from_price_feed_id(&id).map(|chain| (chain, quote)))
            .collect())
    }
}
