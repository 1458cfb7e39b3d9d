use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use tracing::Span;

/// Span for `TraceLayer`: one per request, carrying the peer address,
/// protocol, method and URI. The peer is "-" when the server was not started
/// with connect info (e.g. in tests).
pub fn make_request_span(request: &Request) -> Span {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    tracing::info_span!(
        "request",
        remote_addr = %remote_addr,
        proto = ?request.version(),
        method = %request.method(),
        uri = %request.uri(),
    )
}
