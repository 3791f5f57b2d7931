//! Bitcoin lookups.
//!
//! Extended public keys (`xpub`, `ypub`, `zpub`, `vpub`, `upub`) are resolved
//! through an aggregate multi-address endpoint; every other address goes to a
//! per-address Esplora-style API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::chains::registry::ChainStrategy;
use crate::chains::types::{
    format_block_date, scale_units, Chain, ChainLookupResult, LookupError, LookupResult,
    TransactionSummary, TxKind, WalletBalance, INVALID_CHARACTERS, MAX_TRANSACTIONS,
};
use crate::chains::upstream::{join_url, UpstreamClient, UpstreamError};

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: f64 = 100_000_000.0;

const EXTENDED_KEY_PREFIXES: [&str; 5] = ["xpub", "ypub", "zpub", "vpub", "upub"];

#[derive(Debug, Deserialize)]
struct MultiAddrResponse {
    wallet: MultiAddrWallet,
    #[serde(default)]
    txs: Vec<MultiAddrTx>,
}

#[derive(Debug, Deserialize)]
struct MultiAddrWallet {
    final_balance: i64,
}

#[derive(Debug, Deserialize)]
struct MultiAddrTx {
    hash: String,
    time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AddressInfo {
    chain_stats: TxoStats,
    mempool_stats: TxoStats,
}

#[derive(Debug, Deserialize)]
struct TxoStats {
    funded_txo_sum: i64,
    spent_txo_sum: i64,
}

impl AddressInfo {
    /// Confirmed plus unconfirmed balance, in satoshis.
    fn balance_sats(&self) -> i128 {
        let confirmed =
            i128::from(self.chain_stats.funded_txo_sum) - i128::from(self.chain_stats.spent_txo_sum);
        let mempool = i128::from(self.mempool_stats.funded_txo_sum)
            - i128::from(self.mempool_stats.spent_txo_sum);
        confirmed + mempool
    }
}

#[derive(Debug, Deserialize)]
struct EsploraTx {
    txid: String,
    status: EsploraTxStatus,
}

#[derive(Debug, Deserialize)]
struct EsploraTxStatus {
    confirmed: bool,
    block_time: Option<i64>,
}

/// Strip every whitespace character and reject anything non-alphanumeric.
///
/// Guards against copy-paste artifacts only; checksums are left to the upstream.
pub fn sanitize_address(raw: &str) -> LookupResult<String> {
    let address: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if address.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(address)
    } else {
        Err(LookupError::MalformedInput(INVALID_CHARACTERS))
    }
}

/// Whether `address` is an extended public key (prefix match, any case).
pub fn is_extended_key(address: &str) -> bool {
    address.get(..4).is_some_and(|prefix| {
        EXTENDED_KEY_PREFIXES
            .iter()
            .any(|candidate| prefix.eq_ignore_ascii_case(candidate))
    })
}

fn confirmation_label(confirmed: bool) -> &'static str {
    if confirmed {
        "Confirmed"
    } else {
        "Pending..."
    }
}

fn classify(error: UpstreamError) -> LookupError {
    if error.status() == Some(StatusCode::BAD_REQUEST) {
        LookupError::UpstreamMalformed(error)
    } else {
        LookupError::UpstreamUnavailable(error)
    }
}

/// Bitcoin lookup strategy.
#[derive(Debug, Clone)]
pub struct BitcoinStrategy {
    client: UpstreamClient,
    blockchain_info_url: String,
    blockstream_url: String,
}

impl BitcoinStrategy {
    pub fn new(client: UpstreamClient, blockchain_info_url: &str, blockstream_url: &str) -> Self {
        Self {
            client,
            blockchain_info_url: blockchain_info_url.to_string(),
            blockstream_url: blockstream_url.to_string(),
        }
    }

    /// Sum of every address derived from an extended key.
    async fn lookup_extended_key(&self, key: &str) -> Result<WalletBalance, UpstreamError> {
        let url = join_url(&self.blockchain_info_url, "multiaddr");
        let limit = MAX_TRANSACTIONS.to_string();
        let data: MultiAddrResponse = self
            .client
            .get_json(&url, &[("active", key), ("n", limit.as_str())])
            .await?;

        let transactions = data
            .txs
            .into_iter()
            .take(MAX_TRANSACTIONS)
            .map(|tx| TransactionSummary {
                hash: tx.hash,
                label: "XPUB Activity".to_string(),
                date: tx
                    .time
                    .and_then(format_block_date)
                    .unwrap_or_else(|| "Pending".to_string()),
                kind: TxKind::Mixed,
            })
            .collect();

        Ok(WalletBalance {
            chain: Chain::Bitcoin,
            address: key.to_string(),
            balance: scale_units(i128::from(data.wallet.final_balance), SATS_PER_BTC),
            transactions,
        })
    }

    async fn lookup_address(&self, address: &str) -> Result<WalletBalance, UpstreamError> {
        let info_url = join_url(&self.blockstream_url, &format!("address/{}", address));
        let txs_url = join_url(&self.blockstream_url, &format!("address/{}/txs", address));

        let (info, txs) = tokio::try_join!(
            self.client.get_json::<AddressInfo>(&info_url, &[]),
            self.client.get_json::<Vec<EsploraTx>>(&txs_url, &[]),
        )?;

        let transactions = txs
            .into_iter()
            .take(MAX_TRANSACTIONS)
            .map(|tx| TransactionSummary {
                hash: tx.txid,
                label: confirmation_label(tx.status.confirmed).to_string(),
                date: tx
                    .status
                    .block_time
                    .and_then(format_block_date)
                    .unwrap_or_else(|| "Mempool".to_string()),
                kind: TxKind::Tx,
            })
            .collect();

        Ok(WalletBalance {
            chain: Chain::Bitcoin,
            address: address.to_string(),
            balance: scale_units(info.balance_sats(), SATS_PER_BTC),
            transactions,
        })
    }
}

#[async_trait]
impl ChainStrategy for BitcoinStrategy {
    fn chain(&self) -> Chain {
        Chain::Bitcoin
    }

    async fn lookup(&self, raw_address: &str) -> ChainLookupResult {
        let address = match sanitize_address(raw_address) {
            Ok(address) => address,
            Err(e) => return ChainLookupResult::failed(Chain::Bitcoin.symbol(), raw_address, &e),
        };

        let outcome = if is_extended_key(&address) {
            self.lookup_extended_key(&address).await
        } else {
            self.lookup_address(&address).await
        };

        ChainLookupResult::from_outcome(Chain::Bitcoin, &address, outcome.map_err(classify))
    }
}
