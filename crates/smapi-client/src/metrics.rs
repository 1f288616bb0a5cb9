//! Invocation metrics
//!
//! Recorded through the `metrics` facade; the embedding application decides
//! whether and where to export them.
//!
//! - `smapi_requests_total` (counter): labels `method`, `status`
//! - `smapi_request_duration_seconds` (histogram): label `status`
//!
//! `status` is the numeric HTTP status, or `transport_error` when no response
//! arrived.

/// Label used when the transport produced no response.
pub const TRANSPORT_ERROR: &str = "transport_error";

/// Record one dispatched API request.
pub fn record_invocation(method: &str, status: Option<u16>, duration_secs: f64) {
    let status_label = match status {
        Some(code) => code.to_string(),
        None => TRANSPORT_ERROR.to_string(),
    };
    metrics::counter!("smapi_requests_total", "method" => method.to_string(), "status" => status_label.clone())
        .increment(1);
    metrics::histogram!("smapi_request_duration_seconds", "status" => status_label)
        .record(duration_secs);
}
