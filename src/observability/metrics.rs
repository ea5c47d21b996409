//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rext_requests_total` (counter): rendered requests by entry, status
//! - `rext_render_duration_seconds` (histogram): time to render, by entry
//! - `rext_module_loads_total` (counter): module loads by cache outcome
//!   (`hit`, `miss`, `bypass`)
//! - `rext_manifest_entries` (gauge): entries in the current manifest
//! - `rext_manifest_reloads_total` (counter): manifest loads by outcome
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(entry: &str, status: u16, start: Instant) {
    let entry = entry.to_string();
    counter!("rext_requests_total", "entry" => entry.clone(), "status" => status.to_string())
        .increment(1);
    histogram!("rext_render_duration_seconds", "entry" => entry)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_module_load(cache: &'static str) {
    counter!("rext_module_loads_total", "cache" => cache).increment(1);
}

pub fn record_manifest_load(outcome: &'static str, entries: usize) {
    counter!("rext_manifest_reloads_total", "outcome" => outcome).increment(1);
    gauge!("rext_manifest_entries").set(entries as f64);
}
