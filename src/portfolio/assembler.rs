//! Result assembler: joins lookups with prices. Pure, no I/O.

use std::collections::HashMap;

use crate::chains::types::{Chain, ChainLookupResult};
use crate::portfolio::types::{ValuedWallet, WalletValuation};
use crate::pricing::types::PriceQuote;

pub fn assemble(results: Vec<ChainLookupResult>, prices: &HashMap<Chain, PriceQuote>) -> Vec<WalletValuation> {
    results
        .into_iter()
        .map(|result| match result {
            ChainLookupResult::Failed(error) => WalletValuation::Failed(error),
            ChainLookupResult::Found(wallet) => {
                let price = prices.get(&wallet.chain).copied().unwrap_or(PriceQuote::ZERO);
                let value = price.value_of(wallet.balance);
                WalletValuation::Valued(ValuedWallet { wallet, price, value })
            }
        })
        .collect()
}
