//! Per-chain lookup subsystem.
//!
//! # Data Flow
//! ```text
//! (chain symbol, address)
//!     → registry.rs (symbol → strategy, or UnsupportedChain)
//!     → bitcoin.rs | ethereum.rs | solana.rs | cardano.rs
//!         → upstream.rs (single-attempt JSON over HTTP)
//!     → types.rs (ChainLookupResult: Found | Failed)
//! ```
//!
//! # Constraints
//! - Strategies are stateless apart from their endpoint URLs and a shared client
//! - No retries; every upstream call is attempted once
//! - No lookup error escapes a strategy; it is recorded in the wallet's slot

pub mod bitcoin;
pub mod cardano;
pub mod ethereum;
pub mod registry;
pub mod solana;
pub mod types;
pub mod upstream;

pub use registry::{ChainRegistry, ChainStrategy};
pub use types::{Chain, ChainLookupResult, LookupError, TransactionSummary, TxKind, WalletBalance, WalletError};
pub use upstream::{UpstreamClient, UpstreamError};
