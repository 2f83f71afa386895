//! Observability utilities for the pricing libraries.
//!
//! This crate provides:
//! - Prometheus metrics recording and text export
//! - Pricing-specific counters, gauges and histograms
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, render_metrics, PricingMetrics};
//!
//! init_metrics();
//! PricingMetrics::record_rows_normalized("AWS", "compute", 50, 1);
//! println!("{}", render_metrics());
//! ```

pub mod pricing;

pub use pricing::{PricingMetrics, PricingTimer};

pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Installs the recorder on the first call and returns the same handle on
/// every later call. Returns `None` when a different global recorder was
/// already installed by someone else.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new().install_recorder()?;
            info!("Prometheus metrics recorder initialized");
            register_metric_descriptions();
            Ok::<_, metrics_exporter_prometheus::BuildError>(handle)
        })
        .map_err(|e| warn!(error = %e, "Failed to install Prometheus recorder"))
        .ok()
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Render all recorded metrics in the Prometheus text format
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(
        "pricing_rows_normalized_total",
        "Raw provider rows normalized, by provider, kind and outcome"
    );
    describe_counter!(
        "pricing_row_rejections_total",
        "Raw provider rows rejected, by offending native field"
    );
    describe_counter!(
        "pricing_aggregations_total",
        "Aggregation passes by operation"
    );
    describe_histogram!(
        "pricing_operation_duration_seconds",
        "Aggregation duration in seconds"
    );
    describe_gauge!(
        "pricing_offers_total",
        "Offers held by a source, by provider and kind"
    );
}
