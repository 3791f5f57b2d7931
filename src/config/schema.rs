//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the aggregator.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the portfolio aggregator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Base URLs of the upstream chain and price services.
    pub upstreams: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests and upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one `/api/portfolio` request, in seconds.
    pub request_secs: u64,

    /// Transport timeout for a single upstream HTTP call, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 15,
        }
    }
}

/// Upstream service endpoints.
///
/// Every chain strategy and the price feed read their base URL from here, which
/// lets tests point the whole engine at a local mock.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Bitcoin extended-key aggregate service (`/multiaddr`).
    pub blockchain_info_url: String,

    /// Bitcoin single-address service (`/address/{addr}` and `/address/{addr}/txs`).
    pub blockstream_url: String,

    /// Ethereum account-balance API.
    pub blockscout_url: String,

    /// Solana JSON-RPC endpoint.
    pub solana_rpc_url: String,

    /// Cardano Koios REST base.
    pub koios_url: String,

    /// CoinGecko API base.
    pub coingecko_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            blockchain_info_url: "https://blockchain.info".to_string(),
            blockstream_url: "https://blockstream.info/api".to_string(),
            blockscout_url: "https://eth.blockscout.com/api".to_string(),
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            koios_url: "https://api.koios.rest/api/v1".to_string(),
            coingecko_url: "https://api.coingecko.com/api/v3".to_string(),
        }
    }
}

impl UpstreamConfig {
    /// All configured endpoints paired with their config key, for validation.
    pub fn endpoints(&self) -> [(&'static str, &str); 6] {
        [
            ("upstreams.blockchain_info_url", &self.blockchain_info_url),
            ("upstreams.blockstream_url", &self.blockstream_url),
            ("upstreams.blockscout_url", &self.blockscout_url),
            ("upstreams.solana_rpc_url", &self.solana_rpc_url),
            ("upstreams.koios_url", &self.koios_url),
            ("upstreams.coingecko_url", &self.coingecko_url),
        ]
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}
