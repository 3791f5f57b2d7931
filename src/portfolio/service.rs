//! Portfolio valuation pipeline.

use std::sync::Arc;
use std::time::Duration;

use crate::chains::registry::ChainRegistry;
use crate::chains::upstream::{UpstreamClient, UpstreamError};
use crate::config::AggregatorConfig;
use crate::portfolio::assembler::assemble;
use crate::portfolio::dispatcher::dispatch;
use crate::portfolio::types::{WalletRequest, WalletValuation};
use crate::pricing::feed::{CoinGeckoFeed, PriceFeed};
use crate::pricing::merger::{fetch_prices, successful_chains};

/// Owns the chain registry and price feed for the lifetime of the process.
#[derive(Clone)]
pub struct PortfolioService {
    registry: Arc<ChainRegistry>,
    prices: Arc<dyn PriceFeed>,
}

impl PortfolioService {
    pub fn new(registry: ChainRegistry, prices: Arc<dyn PriceFeed>) -> Self {
        Self {
            registry: Arc::new(registry),
            prices,
        }
    }

    /// Build the production pipeline from configuration.
    pub fn from_config(config: &AggregatorConfig) -> Result<Self, UpstreamError> {
        let client = UpstreamClient::new(Duration::from_secs(config.timeouts.upstream_secs))?;
        let registry = ChainRegistry::from_config(&config.upstreams, client.clone());
        let prices = Arc::new(CoinGeckoFeed::new(client, &config.upstreams.coingecko_url));

        tracing::info!(chains = ?registry.chains(), "Chain registry initialized");
        Ok(Self::new(registry, prices))
    }

    /// Look up, price and value every wallet. Never fails as a whole: each
    /// wallet's problems are reported in its own slot.
    pub async fn valuate(&self, wallets: &[WalletRequest]) -> Vec<WalletValuation> {
        let results = dispatch(&self.registry, wallets).await;
        let chains = successful_chains(&results);
        let prices = fetch_prices(self.prices.as_ref(), &chains).await;

        tracing::info!(
            wallets = wallets.len(),
            resolved = results.iter().filter(|r| r.is_found()).count(),
            priced_chains = prices.len(),
            "Portfolio valuated"
        );

        assemble(results, &prices)
    }
}

impl std::fmt::Debug for PortfolioService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioService")
            .field("registry", &self.registry)
            .finish()
    }
}
