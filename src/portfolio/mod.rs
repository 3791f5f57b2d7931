//! Portfolio aggregation engine.
//!
//! # Data Flow
//! ```text
//! [WalletRequest]
//!     → dispatcher.rs (one task per wallet via the chain registry, ordered join)
//!     → pricing::merger (distinct successful chains → one price query)
//!     → assembler.rs (balance × price per currency)
//!     → [WalletValuation]
//! ```
//!
//! # Design Decisions
//! - Output is index-aligned with input; nothing is re-keyed
//! - Per-wallet and price failures are data, never early returns
//! - No shared mutable state between lookups

pub mod assembler;
pub mod dispatcher;
pub mod service;
pub mod types;

pub use assembler::assemble;
pub use dispatcher::dispatch;
pub use service::PortfolioService;
pub use types::{PortfolioRequest, ValuedWallet, WalletRequest, WalletValuation};
