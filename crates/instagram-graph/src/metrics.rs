//! Request metrics
//!
//! Emitted through the `metrics` facade; without an installed recorder every
//! call is a no-op.
//!
//! - `instagram_requests_total` (counter): labels `method`, `status`
//! - `instagram_request_duration_seconds` (histogram): label `method`
//! - `instagram_transport_errors_total` (counter): label `error_type`

pub const REQUESTS_TOTAL: &str = "instagram_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "instagram_request_duration_seconds";
pub const TRANSPORT_ERRORS_TOTAL: &str = "instagram_transport_errors_total";

/// Histogram buckets from 10ms up to the longest sensible timeout.
pub const DURATION_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Record a completed request with its method and response status.
pub fn record_request(method: &str, status: u16, duration_secs: f64) {
    metrics::counter!(REQUESTS_TOTAL, "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(duration_secs);
}

/// Record a request that never produced a response.
pub fn record_transport_error(error_type: &'static str) {
    metrics::counter!(TRANSPORT_ERRORS_TOTAL, "error_type" => error_type).increment(1);
}
