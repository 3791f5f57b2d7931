//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP layer, dispatcher, price merger produce:
//!     → logging.rs (structured tracing events, request-id spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
