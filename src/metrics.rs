//! Prometheus metrics for the app and the route that exposes them.
//!
//! The registry is owned by [Metrics], which lives in the app state, so
//! tests can each create their own registry.

use std::fmt::Debug;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TEXT_FORMAT, TextEncoder};

use crate::Error;

/// The label used for requests that did not match any route.
const UNMATCHED_PATH: &str = "<unmatched>";

/// The app's metrics and the registry they are exported from.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    data_entries: IntCounter,
    http_requests: IntCounterVec,
}

impl Metrics {
    /// Create the metrics and register them with a new registry.
    ///
    /// # Errors
    ///
    /// Returns [Error::MetricsError] if a metric could not be registered.
    pub fn new() -> Result<Self, Error> {
        let registry = Registry::new();

        let data_entries = IntCounter::new("data_entries_total", "Total number of data entries")
            .map_err(metrics_error)?;
        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(data_entries.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(http_requests.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            data_entries,
            http_requests,
        })
    }

    /// Count one newly recorded expense.
    pub fn record_data_entry(&self) {
        self.data_entries.inc();
    }

    /// The number of expenses recorded since the server started.
    pub fn data_entries(&self) -> u64 {
        self.data_entries.get()
    }

    /// Count one handled HTTP request.
    pub fn record_request(&self, method: &str, path: &str, status: StatusCode) {
        self.http_requests
            .with_label_values(&[method, path, status.as_str()])
            .inc();
    }

    /// Render all metrics in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns [Error::MetricsError] if the metrics could not be encoded.
    pub fn render(&self) -> Result<String, Error> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_error)?;

        String::from_utf8(buffer).map_err(metrics_error)
    }
}

impl Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("data_entries", &self.data_entries.get())
            .finish_non_exhaustive()
    }
}

fn metrics_error(error: impl ToString) -> Error {
    Error::MetricsError(error.to_string())
}

/// Serve the metrics in the Prometheus text exposition format.
pub async fn get_metrics(State(metrics): State<Metrics>) -> Response {
    match metrics.render() {
        Ok(body) => ([(CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(error) => {
            tracing::error!("Could not render metrics: {error}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not render metrics").into_response()
        }
    }
}

/// Count every request by method, route and response status.
///
/// The route template (e.g. '/delete/{expense_id}') is used rather than the
/// URI so that each expense does not get its own time series.
pub async fn track_requests(
    State(metrics): State<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());

    let response = next.run(request).await;
    metrics.record_request(method.as_str(), &path, response.status());

    response
}
