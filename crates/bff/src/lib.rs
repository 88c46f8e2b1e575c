#![forbid(unsafe_code)]

pub mod cookies;
pub mod error;
pub mod extractors;
pub mod guard;
pub mod handlers;
pub mod names;

use std::net::SocketAddr;

use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use lesson_core::Clock;
use services::{ApiConfig, UpstreamClient};

/// Listener and cookie settings of the BFF.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BffConfig {
    pub address: SocketAddr,
    /// Mark session cookies `Secure`; enable behind HTTPS.
    pub secure_cookies: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub secure_cookies: bool,
    pub clock: Clock,
}

impl AppState {
    #[must_use]
    pub fn new(api: ApiConfig, secure_cookies: bool) -> Self {
        Self {
            upstream: UpstreamClient::new(api),
            secure_cookies,
            clock: Clock::system(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

pub fn router(state: AppState) -> Router {
    router_with_pages(state, Router::new())
}

/// `router` plus the web front end's `pages`, served behind the page guard.
pub fn router_with_pages(state: AppState, pages: Router<AppState>) -> Router {
    Router::new()
        .merge(handlers::lessons::routes())
        .merge(handlers::auth::routes())
        .merge(handlers::proxy::routes())
        .merge(pages)
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), guard::page_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `config.address` and serve until the process stops.
///
/// # Errors
///
/// Returns the I/O error if the address cannot be bound or the server fails.
pub async fn serve(config: &BffConfig, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.address).await?;
    tracing::info!(address = %config.address, "bff listening");
    axum::serve(listener, router(state)).await
}
