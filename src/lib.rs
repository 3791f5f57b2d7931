//! Multi-chain crypto portfolio aggregator library.

pub mod chains;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod portfolio;
pub mod pricing;

pub use config::schema::AggregatorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use portfolio::PortfolioService;
