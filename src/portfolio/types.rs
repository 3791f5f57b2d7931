//! Portfolio request and valuation types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chains::types::{WalletBalance, WalletError};
use crate::pricing::types::PriceQuote;

/// One wallet to look up. `chain` stays a raw symbol until resolved.
///
/// Any JSON element deserializes; an element without string `chain` and
/// `address` fields is kept in its slot, echoed as text, and never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct WalletRequest {
    pub chain: String,
    pub address: String,
    well_formed: bool,
}

impl WalletRequest {
    pub fn new(chain: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            address: address.into(),
            well_formed: true,
        }
    }

    /// Whether both fields arrived as JSON strings.
    pub fn is_well_formed(&self) -> bool {
        self.well_formed
    }
}

fn echo(field: Option<&Value>) -> (String, bool) {
    match field {
        Some(Value::String(s)) => (s.clone(), true),
        None | Some(Value::Null) => (String::new(), false),
        Some(other) => (other.to_string(), false),
    }
}

impl From<Value> for WalletRequest {
    fn from(element: Value) -> Self {
        let (chain, chain_ok) = echo(element.get("chain"));
        let (address, address_ok) = echo(element.get("address"));
        Self {
            chain,
            address,
            well_formed: chain_ok && address_ok,
        }
    }
}

/// Body of `POST /api/portfolio`.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioRequest {
    pub wallets: Vec<WalletRequest>,
}

/// A successful lookup joined with its chain's price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuedWallet {
    #[serde(flatten)]
    pub wallet: WalletBalance,
    /// Unit price of the coin.
    pub price: PriceQuote,
    /// `balance * price`, per currency.
    pub value: PriceQuote,
}

/// Final per-wallet record: a full valuation or the untouched error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WalletValuation {
    Valued(ValuedWallet),
    Failed(WalletError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::types::Chain;
    use serde_json::json;

    #[test]
    fn test_request_parsing() {
        let request: PortfolioRequest = serde_json::from_value(json!({
            "wallets": [{"chain": "BTC", "address": "bc1q"}, {"chain": "XYZ", "address": "foo"}]
        }))
        .unwrap();
        assert_eq!(request.wallets[1], WalletRequest::new("XYZ", "foo"));

        assert!(serde_json::from_value::<PortfolioRequest>(json!({})).is_err());
        assert!(serde_json::from_value::<PortfolioRequest>(json!({"wallets": "BTC"})).is_err());
    }

    #[test]
    fn test_malformed_elements_keep_their_slot() {
        let request: PortfolioRequest = serde_json::from_value(json!({
            "wallets": [
                {"chain": "ETH", "address": "0xabc"},
                {"chain": 7, "address": "x"},
                {"chain": "XYZ"},
                "BTC"
            ]
        }))
        .unwrap();

        let wallets = &request.wallets;
        assert_eq!(wallets.len(), 4);
        assert!(wallets[0].is_well_formed());

        assert_eq!((wallets[1].chain.as_str(), wallets[1].address.as_str()), ("7", "x"));
        assert!(!wallets[1].is_well_formed());

        assert_eq!((wallets[2].chain.as_str(), wallets[2].address.as_str()), ("XYZ", ""));
        assert!(!wallets[2].is_well_formed());

        assert_eq!(wallets[3].chain, "");
        assert!(!wallets[3].is_well_formed());
    }

    #[test]
    fn test_valued_wallet_is_flat() {
        let valuation = WalletValuation::Valued(ValuedWallet {
            wallet: WalletBalance {
                chain: Chain::Ethereum,
                address: "0xabc".into(),
                balance: 2.0,
                transactions: vec![],
            },
            price: PriceQuote { usd: 3000.0, eur: 2800.0, chf: 2700.0 },
            value: PriceQuote { usd: 6000.0, eur: 5600.0, chf: 5400.0 },
        });

        assert_eq!(
            serde_json::to_value(&valuation).unwrap(),
            json!({
                "chain": "ETH",
                "address": "0xabc",
                "balance": 2.0,
                "transactions": [],
                "price": {"usd": 3000.0, "eur": 2800.0, "chf": 2700.0},
                "value": {"usd": 6000.0, "eur": 5600.0, "chf": 5400.0}
            })
        );
    }
}
