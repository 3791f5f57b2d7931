//! Chain-specific types and error definitions.

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::Serialize;
use thiserror::Error;

use crate::chains::upstream::UpstreamError;

/// Maximum number of transactions reported per wallet.
pub const MAX_TRANSACTIONS: usize = 5;

/// Wire message for addresses rejected before any network call.
pub const INVALID_CHARACTERS: &str = "invalid characters";

/// Wire message for Solana addresses that cannot be resolved.
pub const INVALID_ADDRESS: &str = "invalid address";

/// Supported networks.
///
/// The set is closed: symbols outside it resolve to [`LookupError::UnsupportedChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Chain {
    #[serde(rename = "BTC")]
    Bitcoin,
    #[serde(rename = "ETH")]
    Ethereum,
    #[serde(rename = "SOL")]
    Solana,
    #[serde(rename = "ADA")]
    Cardano,
}

impl Chain {
    pub const ALL: [Chain; 4] = [Chain::Bitcoin, Chain::Ethereum, Chain::Solana, Chain::Cardano];

    /// Ticker symbol used on the wire.
    pub fn symbol(&self) -> &'static str {
        match self {
            Chain::Bitcoin => "BTC",
            Chain::Ethereum => "ETH",
            Chain::Solana => "SOL",
            Chain::Cardano => "ADA",
        }
    }

    /// Identifier of this chain's coin in the spot-price feed.
    pub fn price_feed_id(&self) -> &'static str {
        match self {
            Chain::Bitcoin => "bitcoin",
            Chain::Ethereum => "ethereum",
            Chain::Solana => "solana",
            Chain::Cardano => "cardano",
        }
    }

    /// Reverse of [`Chain::price_feed_id`].
    pub fn from_price_feed_id(id: &str) -> Option<Chain> {
        Chain::ALL.into_iter().find(|chain| chain.price_feed_id() == id)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Chain {
    type Err = LookupError;

    fn from_str(symbol: &str) -> Result<Self, Self::Err> {
        Chain::ALL
            .into_iter()
            .find(|chain| chain.symbol() == symbol)
            .ok_or(LookupError::UnsupportedChain)
    }
}

/// Errors that can end a single wallet lookup.
///
/// The `Display` output of each variant is exactly the message reported to the
/// client in that wallet's slot.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The chain symbol has no registered strategy.
    #[error("Unsupported Chain")]
    UnsupportedChain,

    /// The address was rejected locally, before any network call.
    #[error("{0}")]
    MalformedInput(&'static str),

    /// The upstream rejected the address or key (HTTP 400).
    #[error("malformed xpub/address")]
    UpstreamMalformed(#[source] UpstreamError),

    /// Network, status or payload failure talking to the upstream.
    #[error("lookup failed")]
    UpstreamUnavailable(#[source] UpstreamError),

    /// The upstream could not resolve the address; reported the same way as an
    /// undecodable address.
    #[error("invalid address")]
    AddressUnresolved(#[source] UpstreamError),

    /// Failure before any sub-query could start, or a crashed lookup task.
    #[error("severe lookup error")]
    Severe(String),
}

/// Result type for chain lookups.
pub type LookupResult<T> = Result<T, LookupError>;

/// Kind of activity a transaction summary describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxKind {
    #[serde(rename = "TX")]
    Tx,
    /// Aggregate activity of an extended key; the leaf address is unknown.
    #[serde(rename = "MIXED")]
    Mixed,
    Success,
    Fail,
    #[serde(rename = "INFO")]
    Info,
}

/// One entry of a wallet's recent activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub hash: String,
    pub label: String,
    /// Calendar date, or one of `Pending`, `Mempool`, `Info`.
    pub date: String,
    pub kind: TxKind,
}

impl TransactionSummary {
    /// Placeholder reported when a history sub-query failed.
    pub fn history_unavailable() -> Self {
        Self {
            hash: String::new(),
            label: "history temporarily unavailable".to_string(),
            date: "Info".to_string(),
            kind: TxKind::Info,
        }
    }
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletBalance {
    pub chain: Chain,
    pub address: String,
    /// Balance in whole coins.
    pub balance: f64,
    pub transactions: Vec<TransactionSummary>,
}

/// A failed lookup. `chain` is kept verbatim so unsupported symbols echo back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletError {
    pub chain: String,
    pub address: String,
    pub error: String,
}

/// Outcome of one wallet lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChainLookupResult {
    Found(WalletBalance),
    Failed(WalletError),
}

impl ChainLookupResult {
    /// Build a failure record, logging the error and its cause.
    pub fn failed(chain: impl Into<String>, address: impl Into<String>, error: &LookupError) -> Self {
        let chain = chain.into();
        let address = address.into();
        let cause = std::error::Error::source(error).map(ToString::to_string);
        tracing::warn!(
            chain = %chain,
            address = %address,
            error = %error,
            cause = ?cause,
            "Wallet lookup failed"
        );
        ChainLookupResult::Failed(WalletError {
            chain,
            address,
            error: error.to_string(),
        })
    }

    /// Fold a strategy outcome into a result record.
    pub fn from_outcome(chain: Chain, address: &str, outcome: LookupResult<WalletBalance>) -> Self {
        match outcome {
            Ok(balance) => ChainLookupResult::Found(balance),
            Err(error) => ChainLookupResult::failed(chain.symbol(), address, &error),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ChainLookupResult::Found(_))
    }
}

/// Render a unix timestamp (seconds) as a `M/D/YYYY` UTC date.
pub fn format_block_date(unix_secs: i64) -> Option<String> {
    DateTime::from_timestamp(unix_secs, 0).map(|dt| dt.format("%-m/%-d/%Y").to_string())
}

/// Convert an integer amount of the smallest unit into whole coins.
pub fn scale_units(amount: i128, units_per_coin: f64) -> f64 {
    amount as f64 / units_per_coin
}
