//! Cardano lookups against the Koios REST API.
//!
//! Stake addresses (`stake1...`) use the account endpoints, everything else the
//! payment-address endpoints. Balance and history are fetched concurrently and
//! degrade independently: a failed balance reads as zero, a failed history as a
//! single informational entry. Neither fails the wallet.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::chains::registry::ChainStrategy;
use crate::chains::types::{
    format_block_date, scale_units, Chain, ChainLookupResult, LookupError, TransactionSummary,
    TxKind, WalletBalance, MAX_TRANSACTIONS,
};
use crate::chains::upstream::{join_url, UpstreamClient, UpstreamError};

/// Lovelace per ADA.
pub const LOVELACE_PER_ADA: f64 = 1_000_000.0;

const STAKE_PREFIX: &str = "stake1";

/// Which Koios endpoint family serves an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Stake,
    Payment,
}

impl AddressMode {
    pub fn of(address: &str) -> Self {
        if address.starts_with(STAKE_PREFIX) {
            AddressMode::Stake
        } else {
            AddressMode::Payment
        }
    }

    fn balance_endpoint(&self) -> &'static str {
        match self {
            AddressMode::Stake => "account_info",
            AddressMode::Payment => "address_info",
        }
    }

    fn history_endpoint(&self) -> &'static str {
        match self {
            AddressMode::Stake => "account_txs",
            AddressMode::Payment => "address_txs",
        }
    }

    fn balance_field(&self) -> &'static str {
        match self {
            AddressMode::Stake => "total_balance",
            AddressMode::Payment => "balance",
        }
    }

    /// Batch request body holding the single address.
    fn request_body(&self, address: &str) -> Value {
        match self {
            AddressMode::Stake => json!({ "_stake_addresses": [address] }),
            AddressMode::Payment => json!({ "_addresses": [address] }),
        }
    }
}

/// Outcome of one fault-isolated sub-query.
#[derive(Debug)]
pub enum SubQuery<T> {
    /// The upstream answered and the payload was usable.
    Fetched(T),
    /// The sub-query failed; `fallback` stands in for the missing data.
    Degraded { fallback: T, cause: UpstreamError },
}

impl<T> SubQuery<T> {
    pub fn settle(result: Result<T, UpstreamError>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => SubQuery::Fetched(value),
            Err(cause) => SubQuery::Degraded {
                fallback: fallback(),
                cause,
            },
        }
    }

    pub fn into_value(self) -> T {
        match self {
            SubQuery::Fetched(value) => value,
            SubQuery::Degraded { fallback, .. } => fallback,
        }
    }
}

#[derive(Debug, Deserialize)]
struct KoiosTx {
    tx_hash: String,
    block_time: Option<i64>,
}

/// Read a lovelace amount that Koios may encode as a string or a number.
fn parse_lovelace(value: Option<&Value>) -> Result<i128, UpstreamError> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i128>()
            .map_err(|e| UpstreamError::Decode(format!("balance '{}': {}", s, e))),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(i128::from)
            .ok_or_else(|| UpstreamError::Decode(format!("balance {} is not an integer", n))),
        Some(other) => Err(UpstreamError::Decode(format!("unexpected balance {}", other))),
    }
}

struct KoiosEndpoints {
    balance: Url,
    history: Url,
}

/// Cardano lookup strategy.
#[derive(Debug, Clone)]
pub struct CardanoStrategy {
    client: UpstreamClient,
    koios_url: String,
}

impl CardanoStrategy {
    pub fn new(client: UpstreamClient, koios_url: &str) -> Self {
        Self {
            client,
            koios_url: koios_url.to_string(),
        }
    }

    fn endpoints(&self, mode: AddressMode) -> Result<KoiosEndpoints, url::ParseError> {
        Ok(KoiosEndpoints {
            balance: Url::parse(&join_url(&self.koios_url, mode.balance_endpoint()))?,
            history: Url::parse(&join_url(&self.koios_url, mode.history_endpoint()))?,
        })
    }

    async fn fetch_balance(&self, url: &Url, mode: AddressMode, body: &Value) -> Result<f64, UpstreamError> {
        let rows: Vec<Value> = self.client.post_json(url.as_str(), body).await?;
        let lovelace = match rows.first() {
            Some(row) => parse_lovelace(row.get(mode.balance_field()))?,
            None => 0,
        };
        Ok(scale_units(lovelace, LOVELACE_PER_ADA))
    }

    async fn fetch_history(&self, url: &Url, body: &Value) -> Result<Vec<TransactionSummary>, UpstreamError> {
        let txs: Vec<KoiosTx> = self.client.post_json(url.as_str(), body).await?;
        Ok(txs
            .into_iter()
            .take(MAX_TRANSACTIONS)
            .map(|tx| TransactionSummary {
                hash: tx.tx_hash,
                label: "ADA Tx".to_string(),
                date: tx
                    .block_time
                    .and_then(format_block_date)
                    .unwrap_or_else(|| "Pending".to_string()),
                kind: TxKind::Tx,
            })
            .collect())
    }
}

#[async_trait]
impl ChainStrategy for CardanoStrategy {
    fn chain(&self) -> Chain {
        Chain::Cardano
    }

    async fn lookup(&self, address: &str) -> ChainLookupResult {
        let mode = AddressMode::of(address);
        let endpoints = match self.endpoints(mode) {
            Ok(endpoints) => endpoints,
            Err(e) => {
                return ChainLookupResult::failed(
                    Chain::Cardano.symbol(),
                    address,
                    &LookupError::Severe(e.to_string()),
                )
            }
        };
        let body = mode.request_body(address);

        let (balance, history) = tokio::join!(
            self.fetch_balance(&endpoints.balance, mode, &body),
            self.fetch_history(&endpoints.history, &body),
        );

        let balance = SubQuery::settle(balance, || 0.0);
        if let SubQuery::Degraded { cause, .. } = &balance {
            tracing::warn!(address = %address, error = %cause, "ADA balance unavailable, reporting zero");
        }

        let history = SubQuery::settle(history, || vec![TransactionSummary::history_unavailable()]);
        if let SubQuery::Degraded { cause, .. } = &history {
            tracing::warn!(address = %address, error = %cause, "ADA history unavailable");
        }

        ChainLookupResult::Found(WalletBalance {
            chain: Chain::Cardano,
            address: address.to_string(),
            balance: balance.into_value(),
            transactions: history.into_value(),
        })
    }
}
