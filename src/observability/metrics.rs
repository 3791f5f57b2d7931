//! Metrics collection and exposition.
//!
//! # Metrics
//! - `portfolio_requests_total` (counter): portfolio requests by HTTP status
//! - `portfolio_request_duration_seconds` (histogram): end-to-end latency
//! - `portfolio_wallet_lookups_total` (counter): lookups by chain and outcome
//! - `portfolio_price_fetch_total` (counter): price feed calls by outcome
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    ::metrics::counter!("portfolio_requests_total", "status" => status.to_string()).increment(1);
    ::metrics::histogram!("portfolio_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_wallet_lookup(chain: &'static str, found: bool) {
    let outcome = if found { "ok" } else { "error" };
    ::metrics::counter!("portfolio_wallet_lookups_total", "chain" => chain, "outcome" => outcome)
        .increment(1);
}

pub fn record_price_fetch(outcome: &'static str) {
    ::metrics::counter!("portfolio_price_fetch_total", "outcome" => outcome).increment(1);
}
