//! Solana lookups over JSON-RPC.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chains::registry::ChainStrategy;
use crate::chains::types::{
    format_block_date, scale_units, Chain, ChainLookupResult, LookupError, TransactionSummary,
    TxKind, WalletBalance, INVALID_ADDRESS, MAX_TRANSACTIONS,
};
use crate::chains::upstream::{UpstreamClient, UpstreamError};

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

const PUBKEY_LEN: usize = 32;
const COMMITMENT: &str = "confirmed";

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct BalanceValue {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct SignatureInfo {
    signature: String,
    err: Option<Value>,
    #[serde(rename = "blockTime")]
    block_time: Option<i64>,
}

/// Whether `address` is base58 decoding to a 32-byte public key.
pub fn is_valid_pubkey(address: &str) -> bool {
    bs58::decode(address)
        .into_vec()
        .map(|bytes| bytes.len() == PUBKEY_LEN)
        .unwrap_or(false)
}

/// Solana lookup strategy.
#[derive(Debug, Clone)]
pub struct SolanaStrategy {
    client: UpstreamClient,
    rpc_url: String,
}

impl SolanaStrategy {
    pub fn new(client: UpstreamClient, rpc_url: &str) -> Self {
        Self {
            client,
            rpc_url: rpc_url.to_string(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, UpstreamError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let envelope: RpcEnvelope<T> = self.client.post_json(&self.rpc_url, &request).await?;
        if let Some(error) = envelope.error {
            return Err(UpstreamError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        envelope
            .result
            .ok_or_else(|| UpstreamError::Decode(format!("{} returned no result", method)))
    }

    async fn fetch(&self, address: &str) -> Result<WalletBalance, UpstreamError> {
        let (balance, signatures) = tokio::try_join!(
            self.call::<BalanceValue>("getBalance", json!([address, { "commitment": COMMITMENT }])),
            self.call::<Vec<SignatureInfo>>(
                "getSignaturesForAddress",
                json!([address, { "limit": MAX_TRANSACTIONS, "commitment": COMMITMENT }]),
            ),
        )?;

        let transactions = signatures
            .into_iter()
            .take(MAX_TRANSACTIONS)
            .map(|sig| TransactionSummary {
                hash: sig.signature,
                label: "Solana Action".to_string(),
                date: sig
                    .block_time
                    .and_then(format_block_date)
                    .unwrap_or_else(|| "Pending".to_string()),
                kind: if sig.err.is_some() { TxKind::Fail } else { TxKind::Success },
            })
            .collect();

        Ok(WalletBalance {
            chain: Chain::Solana,
            address: address.to_string(),
            balance: scale_units(i128::from(balance.value), LAMPORTS_PER_SOL),
            transactions,
        })
    }
}

#[async_trait]
impl ChainStrategy for SolanaStrategy {
    fn chain(&self) -> Chain {
        Chain::Solana
    }

    async fn lookup(&self, address: &str) -> ChainLookupResult {
        if !is_valid_pubkey(address) {
            return ChainLookupResult::failed(
                Chain::Solana.symbol(),
                address,
                &LookupError::MalformedInput(INVALID_ADDRESS),
            );
        }

        // Upstream failures surface as "invalid address"; the cause is logged.
        let outcome = self
            .fetch(address)
            .await
            .map_err(LookupError::AddressUnresolved);
        ChainLookupResult::from_outcome(Chain::Solana, address, outcome)
    }
}
