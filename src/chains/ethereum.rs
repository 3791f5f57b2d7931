//! Ethereum lookups against a Blockscout-compatible account API.
//!
//! Only the native balance is reported; transaction history is not fetched.

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;
use async_trait::async_trait;
use serde::Deserialize;

use crate::chains::registry::ChainStrategy;
use crate::chains::types::{Chain, ChainLookupResult, LookupError, WalletBalance};
use crate::chains::upstream::{UpstreamClient, UpstreamError};

/// Decimals of the native unit (wei per ether = 10^18).
pub const ETHER_DECIMALS: u8 = 18;

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    result: String,
}

/// Convert a decimal wei string into whole ether.
pub fn wei_to_ether(wei: &str) -> Result<f64, UpstreamError> {
    let wei = wei.trim();
    if wei.is_empty() {
        return Err(UpstreamError::Decode("empty balance".to_string()));
    }
    let amount = U256::from_str_radix(wei, 10)
        .map_err(|e| UpstreamError::Decode(format!("non-numeric balance '{}': {}", wei, e)))?;
    let ether = format_units(amount, ETHER_DECIMALS)
        .map_err(|e| UpstreamError::Decode(e.to_string()))?;
    ether
        .parse::<f64>()
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// Ethereum lookup strategy.
#[derive(Debug, Clone)]
pub struct EthereumStrategy {
    client: UpstreamClient,
    blockscout_url: String,
}

impl EthereumStrategy {
    pub fn new(client: UpstreamClient, blockscout_url: &str) -> Self {
        Self {
            client,
            blockscout_url: blockscout_url.to_string(),
        }
    }

    async fn fetch_balance(&self, address: &str) -> Result<f64, UpstreamError> {
        let data: BalanceResponse = self
            .client
            .get_json(
                &self.blockscout_url,
                &[("module", "account"), ("action", "balance"), ("address", address)],
            )
            .await?;
        wei_to_ether(&data.result)
    }
}

#[async_trait]
impl ChainStrategy for EthereumStrategy {
    fn chain(&self) -> Chain {
        Chain::Ethereum
    }

    async fn lookup(&self, address: &str) -> ChainLookupResult {
        let outcome = self
            .fetch_balance(address)
            .await
            .map(|balance| WalletBalance {
                chain: Chain::Ethereum,
                address: address.to_string(),
                balance,
                transactions: Vec::new(),
            })
            .map_err(LookupError::UpstreamUnavailable);

        ChainLookupResult::from_outcome(Chain::Ethereum, address, outcome)
    }
}
