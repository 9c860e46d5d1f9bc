//! Prometheus metrics for the booking service
//!
//! Call [`init_metrics`] once at startup. If registration fails (or was
//! never attempted, as in most tests), every recording function is a no-op.

use prometheus::{register_counter, register_counter_vec, Counter, CounterVec, Encoder, TextEncoder};
use std::sync::OnceLock;

/// Container for all booking metrics
struct BookingMetrics {
    bookings_total: Counter,
    booking_conflicts_total: Counter,
    booking_failures_total: Counter,
    slot_releases_total: Counter,
    api_errors: CounterVec,
}

/// Global storage for booking metrics
static BOOKING_METRICS: OnceLock<BookingMetrics> = OnceLock::new();

/// Initialize all Prometheus metrics.
///
/// Registration errors are returned so the caller can decide whether to run
/// without metrics; recording functions stay safe either way.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if BOOKING_METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = BookingMetrics {
        bookings_total: register_counter!(
            "medibook_bookings_total",
            "Number of successfully booked appointments"
        )?,
        booking_conflicts_total: register_counter!(
            "medibook_booking_conflicts_total",
            "Number of bookings rejected because the slot was already held"
        )?,
        booking_failures_total: register_counter!(
            "medibook_booking_failures_total",
            "Number of bookings that failed for non-conflict reasons"
        )?,
        slot_releases_total: register_counter!(
            "medibook_slot_releases_total",
            "Number of time slots released by cancellation or deletion"
        )?,
        api_errors: register_counter_vec!(
            "medibook_api_errors_total",
            "API error responses by kind",
            &["kind"]
        )?,
    };

    BOOKING_METRICS.set(metrics).ok();
    Ok(())
}

/// Record a successful booking
pub fn booking_succeeded() {
    if let Some(m) = BOOKING_METRICS.get() {
        m.bookings_total.inc();
    }
}

/// Record a booking lost to a held slot
pub fn booking_conflicted() {
    if let Some(m) = BOOKING_METRICS.get() {
        m.booking_conflicts_total.inc();
    }
}

/// Record a booking that failed for another reason
pub fn booking_failed() {
    if let Some(m) = BOOKING_METRICS.get() {
        m.booking_failures_total.inc();
    }
}

/// Record a slot release
pub fn slot_released() {
    if let Some(m) = BOOKING_METRICS.get() {
        m.slot_releases_total.inc();
    }
}

/// Record an API error response by kind label
pub fn api_error(kind: &str) {
    if let Some(m) = BOOKING_METRICS.get() {
        m.api_errors.with_label_values(&[kind]).inc();
    }
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buf = Vec::new();
    if encoder.encode(&families, &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
