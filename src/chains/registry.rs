//! Chain resolver registry.
//!
//! Maps a chain symbol to the strategy that knows how to look it up. Built once
//! at startup and shared read-only by every request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::chains::bitcoin::BitcoinStrategy;
use crate::chains::cardano::CardanoStrategy;
use crate::chains::ethereum::EthereumStrategy;
use crate::chains::solana::SolanaStrategy;
use crate::chains::types::{Chain, ChainLookupResult, LookupError, LookupResult};
use crate::chains::upstream::UpstreamClient;
use crate::config::UpstreamConfig;

/// Lookup strategy for one network.
///
/// Implementations never fail past this boundary: every error is folded into a
/// [`ChainLookupResult::Failed`] record for the wallet.
#[async_trait]
pub trait ChainStrategy: Send + Sync {
    /// The network this strategy serves.
    fn chain(&self) -> Chain;

    /// Fetch balance and recent activity for `address`.
    async fn lookup(&self, address: &str) -> ChainLookupResult;
}

/// Immutable symbol → strategy table.
#[derive(Clone, Default)]
pub struct ChainRegistry {
    strategies: HashMap<Chain, Arc<dyn ChainStrategy>>,
}

impl ChainRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the four built-in strategies against the configured upstreams.
    pub fn from_config(upstreams: &UpstreamConfig, client: UpstreamClient) -> Self {
        Self::new()
            .with_strategy(Arc::new(BitcoinStrategy::new(
                client.clone(),
                &upstreams.blockchain_info_url,
                &upstreams.blockstream_url,
            )))
            .with_strategy(Arc::new(EthereumStrategy::new(
                client.clone(),
                &upstreams.blockscout_url,
            )))
            .with_strategy(Arc::new(SolanaStrategy::new(
                client.clone(),
                &upstreams.solana_rpc_url,
            )))
            .with_strategy(Arc::new(CardanoStrategy::new(client, &upstreams.koios_url)))
    }

    /// Add (or replace) the strategy for its chain.
    pub fn with_strategy(mut self, strategy: Arc<dyn ChainStrategy>) -> Self {
        self.strategies.insert(strategy.chain(), strategy);
        self
    }

    /// Resolve a raw chain symbol. Pure; never touches the network.
    pub fn resolve(&self, symbol: &str) -> LookupResult<Arc<dyn ChainStrategy>> {
        let chain: Chain = symbol.parse()?;
        self.strategies
            .get(&chain)
            .cloned()
            .ok_or(LookupError::UnsupportedChain)
    }

    /// Chains with a registered strategy, in symbol order.
    pub fn chains(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = self.strategies.keys().copied().collect();
        chains.sort();
        chains
    }
}

impl std::fmt::Debug for ChainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainRegistry")
            .field("chains", &self.chains())
            .finish()
    }
}
