//! Price quote types.

use serde::{Deserialize, Serialize};

/// Fiat currencies requested from the price feed, in wire order.
pub const VS_CURRENCIES: &str = "usd,eur,chf";

/// Spot price (or value) of one coin in each supported fiat currency.
///
/// Missing currencies deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceQuote {
    pub usd: f64,
    pub eur: f64,
    pub chf: f64,
}

impl PriceQuote {
    pub const ZERO: PriceQuote = PriceQuote {
        usd: 0.0,
        eur: 0.0,
        chf: 0.0,
    };

    /// Value of `amount` coins at this quote, per currency.
    pub fn value_of(&self, amount: f64) -> PriceQuote {
        PriceQuote {
            usd: amount * self.usd,
            eur: amount * self.eur,
            chf: amount * self.chf,
        }
    }
}
