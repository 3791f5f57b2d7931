//! Price merger: one batched price query for the chains that resolved.

use std::collections::{BTreeSet, HashMap};

use crate::chains::types::{Chain, ChainLookupResult};
use crate::observability::metrics;
use crate::pricing::feed::PriceFeed;
use crate::pricing::types::PriceQuote;

/// Distinct chains among successful lookups. Failed wallets contribute nothing.
pub fn successful_chains(results: &[ChainLookupResult]) -> BTreeSet<Chain> {
    results
        .iter()
        .filter_map(|result| match result {
            ChainLookupResult::Found(wallet) => Some(wallet.chain),
            ChainLookupResult::Failed(_) => None,
        })
        .collect()
}

/// Fetch quotes for `chains` in a single call.
///
/// An empty set skips the network entirely. A failed feed yields an empty map,
/// which downstream reads as zero prices.
pub async fn fetch_prices(feed: &dyn PriceFeed, chains: &BTreeSet<Chain>) -> HashMap<Chain, PriceQuote> {
    if chains.is_empty() {
        metrics::record_price_fetch("skipped");
        return HashMap::new();
    }

    let chains: Vec<Chain> = chains.iter().copied().collect();
    match feed.spot_prices(&chains).await {
        Ok(prices) => {
            tracing::debug!(requested = chains.len(), received = prices.len(), "Prices fetched");
            metrics::record_price_fetch("ok");
            prices
        }
        Err(e) => {
            tracing::error!(error = %e, "Price feed unavailable, valuing at zero");
            metrics::record_price_fetch("error");
            HashMap::new()
        }
    }
}
