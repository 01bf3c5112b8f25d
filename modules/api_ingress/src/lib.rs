//! HTTP host of the catalog: the middleware pipeline every route runs behind,
//! plus the server loop.
//!
//! Layer order, outermost first:
//! request id → access log → error normalization → success envelope →
//! panic catcher → timeout → CORS → body limit → routes.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
};

pub mod access_log;
mod config;
pub mod envelope;
pub mod filters;
pub mod request_id;
pub mod web;

pub use config::ApiIngressConfig;

/// Wraps the application routes in the full pipeline. `routes` must already be
/// mounted under `config.normalized_prefix()`.
pub fn build_router(routes: Router, config: &ApiIngressConfig, timeout: Option<Duration>) -> Router {
    let prefix = config.normalized_prefix();
    let greeting_path = if prefix.is_empty() { "/".to_owned() } else { prefix };

    let mut router = routes
        .route(&greeting_path, get(web::hello))
        .route("/health", get(web::health_check))
        .fallback(web::route_not_found)
        .method_not_allowed_fallback(web::route_not_found);

    router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));

    if config.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    if let Some(timeout) = timeout {
        router = router.layer(TimeoutLayer::new(timeout));
    }

    router = router.layer(CatchPanicLayer::custom(web::panic_response));
    router = router.layer(from_fn(envelope::wrap_success));
    router = router.layer(from_fn(filters::normalize_errors));
    router = router.layer(access_log::create_trace_layer());
    router = router.layer(from_fn(request_id::assign_request_id));

    router
}

/// Serves `router` until `cancel` fires, then drains in-flight requests.
pub async fn serve(listener: TcpListener, router: Router, cancel: CancellationToken) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "HTTP server listening");

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
