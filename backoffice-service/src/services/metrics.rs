//! Prometheus metrics for backoffice-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec, TextEncoder,
};

/// Database round-trip duration by service operation.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "backoffice_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register db_query_duration")
});

/// Stored-procedure calls by procedure and outcome (`ok`, `rejected` by the success rule, `error`).
pub static PROCEDURE_CALLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "backoffice_procedure_calls_total",
        "Total stored procedure calls by outcome",
        &["procedure", "outcome"]
    )
    .expect("Failed to register procedure_calls_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&PROCEDURE_CALLS_TOTAL);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUESTS_TOTAL);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUEST_DURATION_SECONDS);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_registered_series() {
        init_metrics();
        PROCEDURE_CALLS_TOTAL
            .with_label_values(&["com.sp_crear_categoria", "ok"])
            .inc();
        let text = get_metrics();
        assert!(text.contains("backoffice_procedure_calls_total"));
    }
}
