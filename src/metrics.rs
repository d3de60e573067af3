use metrics::{counter, histogram};
use std::net::SocketAddr;
use tracing::{info, warn};

pub const RUNS_TOTAL: &str = "etl_runs_total";
pub const RECORDS_EXTRACTED_TOTAL: &str = "etl_records_extracted_total";
pub const RECORDS_ELIGIBLE_TOTAL: &str = "etl_records_eligible_total";
pub const RECORDS_INSERTED_TOTAL: &str = "etl_records_inserted_total";
pub const DUPLICATES_SKIPPED_TOTAL: &str = "etl_duplicates_skipped_total";
pub const TIMESTAMP_FALLBACKS_TOTAL: &str = "etl_timestamp_fallbacks_total";
pub const REPORTING_FAILURES_TOTAL: &str = "etl_reporting_failures_total";
pub const RUN_DURATION_SECONDS: &str = "etl_run_duration_seconds";

/// Installs the Prometheus exporter on `0.0.0.0:port`.
///
/// Without it every recording below is a no-op.
pub fn init_metrics(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => info!("Prometheus exporter listening on http://{}/metrics", addr),
        Err(e) => warn!("Prometheus exporter install failed (possibly already installed): {}", e),
    }
}

pub fn record_run(success: bool, duration_secs: f64) {
    let outcome = if success { "success" } else { "failure" };
    counter!(RUNS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(RUN_DURATION_SECONDS).record(duration_secs);
}

pub fn record_extracted(count: usize) {
    counter!(RECORDS_EXTRACTED_TOTAL).increment(count as u64);
}

pub fn record_eligible(count: usize) {
    counter!(RECORDS_ELIGIBLE_TOTAL).increment(count as u64);
}

pub fn record_inserted(count: usize) {
    counter!(RECORDS_INSERTED_TOTAL).increment(count as u64);
}

pub fn record_duplicate_skipped() {
    counter!(DUPLICATES_SKIPPED_TOTAL).increment(1);
}

pub fn record_timestamp_fallback() {
    counter!(TIMESTAMP_FALLBACKS_TOTAL).increment(1);
}

pub fn record_reporting_failure() {
    counter!(REPORTING_FAILURES_TOTAL).increment(1);
}
