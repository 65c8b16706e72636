//! Route handlers.
//!
//! Each application route runs the same ordered pipeline:
//!
//! ```text
//! span start → counter +1 → "initial logger" → request logger
//!     → [validation] → log record → response
//! ```
//!
//! The counter is incremented before validation, so rejected requests are
//! counted too. The span is ended by `RequestSpan`'s destructor on every path.

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::http::request::{query_value, RequestFields};
use crate::http::server::AppState;
use crate::observability::RequestSpan;

/// Body of a successful `/` response.
pub const HELLO_WORLD: &str = "Hello World";

/// Body of a `/hello` response without a name.
pub const NAME_IS_EMPTY: &str = "name is empty";

/// Content type of the scrape endpoint.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// `/` and every unmatched path.
pub async fn root(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let mut span = RequestSpan::start(&state.tracer, "page /", &headers);

    state.metrics.record_request();

    span.event("initial logger");
    let log = RequestFields::from_parts(&method, &uri, &headers).logger(&state.logger);

    span.event("logging request");
    log.in_scope(|| tracing::info!("Received request"));

    span.event("sending response");
    (StatusCode::OK, HELLO_WORLD).into_response()
}

/// `/hello?name=<value>`.
pub async fn hello(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let mut span = RequestSpan::start(&state.tracer, "page /hello", &headers);

    state.metrics.record_request();

    span.event("initial logger");
    let log = RequestFields::from_parts(&method, &uri, &headers).logger(&state.logger);

    let name = query_value(&uri, "name").unwrap_or_default();
    span.event("check name");
    if name.is_empty() {
        span.event("logging error");
        log.in_scope(|| tracing::error!("name is empty"));

        span.event("sending error response");
        return (StatusCode::BAD_REQUEST, NAME_IS_EMPTY).into_response();
    }

    span.event("logging request");
    log.in_scope(|| tracing::info!(name = %name, "Received request"));

    span.event("sending response");
    (StatusCode::OK, format!("Hello, {name}")).into_response()
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
        .into_response()
}
