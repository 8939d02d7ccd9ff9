//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics::Unit;
use metrics_exporter_prometheus::PrometheusHandle;

/// Registers descriptions for the metrics emitted by the cart store.
pub fn describe() {
    metrics::describe_counter!("cart_saves_total", "Cart save attempts");
    metrics::describe_counter!(
        "cart_save_failures_total",
        "Cart saves that returned an error"
    );
    metrics::describe_counter!(
        "cart_events_applied_total",
        "Cart events applied to storage, by event type"
    );
    metrics::describe_histogram!(
        "cart_save_duration_seconds",
        Unit::Seconds,
        "Duration of successful cart saves"
    );
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
