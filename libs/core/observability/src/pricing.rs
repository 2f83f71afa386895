//! Metrics for price normalization and aggregation.

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Pricing metrics recorder
pub struct PricingMetrics;

impl PricingMetrics {
    // =========================================================================
    // Normalization Metrics
    // =========================================================================

    /// Record the outcome of normalizing a batch of raw rows
    pub fn record_rows_normalized(provider: &str, kind: &str, accepted: usize, rejected: usize) {
        counter!(
            "pricing_rows_normalized_total",
            "provider" => provider.to_string(),
            "kind" => kind.to_string(),
            "outcome" => "accepted"
        )
        .increment(accepted as u64);
        counter!(
            "pricing_rows_normalized_total",
            "provider" => provider.to_string(),
            "kind" => kind.to_string(),
            "outcome" => "rejected"
        )
        .increment(rejected as u64);

        tracing::debug!(
            provider = provider,
            kind = kind,
            accepted = accepted,
            rejected = rejected,
            "Normalized raw rows"
        );
    }

    /// Record a single rejected row, labelled by the offending native field
    pub fn record_row_rejected(provider: &str, kind: &str, field: &str) {
        counter!(
            "pricing_row_rejections_total",
            "provider" => provider.to_string(),
            "kind" => kind.to_string(),
            "field" => field.to_string()
        )
        .increment(1);
    }

    // =========================================================================
    // Aggregation Metrics
    // =========================================================================

    /// Record an aggregation pass over a snapshot of offers
    pub fn record_aggregation(operation: &str, offers: usize, duration: Duration) {
        counter!("pricing_aggregations_total", "operation" => operation.to_string()).increment(1);
        histogram!("pricing_operation_duration_seconds", "operation" => operation.to_string())
            .record(duration.as_secs_f64());

        tracing::debug!(
            operation = operation,
            offers = offers,
            duration_us = duration.as_micros() as u64,
            "Aggregated offers"
        );
    }

    /// Set the number of offers currently held by a source
    pub fn set_offer_count(provider: &str, kind: &str, count: usize) {
        gauge!(
            "pricing_offers_total",
            "provider" => provider.to_string(),
            "kind" => kind.to_string()
        )
        .set(count as f64);
    }
}

/// Timer guard for automatic duration recording.
///
/// Records the duration when `stop()` is called or when dropped.
pub struct PricingTimer {
    start: Instant,
    operation: &'static str,
    offers: usize,
    stopped: bool,
}

impl PricingTimer {
    /// Start a new timer for an aggregation over `offers` records
    pub fn new(operation: &'static str, offers: usize) -> Self {
        Self {
            start: Instant::now(),
            operation,
            offers,
            stopped: false,
        }
    }

    /// Stop the timer and record the duration. Returns the elapsed time.
    pub fn stop(&mut self) -> Duration {
        if self.stopped {
            return Duration::ZERO;
        }
        self.stopped = true;

        let duration = self.start.elapsed();
        PricingMetrics::record_aggregation(self.operation, self.offers, duration);
        duration
    }
}

impl Drop for PricingTimer {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop();
        }
    }
}
