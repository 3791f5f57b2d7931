//! Spot-price subsystem.
//!
//! # Data Flow
//! ```text
//! successful lookups
//!     → merger.rs (distinct chains, skip when empty)
//!     → feed.rs (one batched usd/eur/chf query)
//!     → map Chain → PriceQuote (empty on failure)
//! ```

pub mod feed;
pub mod merger;
pub mod types;

pub use feed::{CoinGeckoFeed, PriceFeed};
pub use merger::{fetch_prices, successful_chains};
pub use types::PriceQuote;
