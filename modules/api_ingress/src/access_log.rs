//! Per-request span and the "incoming" / "completed" access log lines.

use std::net::SocketAddr;
use std::time::Duration;

use apikit::{RequestMeta, XRequestId};
use axum::extract::ConnectInfo;
use axum::http::{header, Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnBodyChunk, DefaultOnEos, MakeSpan, OnRequest, OnResponse, TraceLayer};
use tracing::{Level, Span};

#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestSpan;

impl<B> MakeSpan<B> for MakeRequestSpan {
    fn make_span(&mut self, req: &Request<B>) -> Span {
        let rid = req
            .extensions()
            .get::<XRequestId>()
            .map(XRequestId::as_str)
            .unwrap_or(RequestMeta::UNKNOWN_REQUEST_ID);
        let client_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string())
            .unwrap_or_else(|| "unknown".to_owned());
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            request_id = %rid,
            method = %req.method(),
            path = %req.uri().path(),
            client_ip = %client_ip,
            user_agent = %user_agent,
        )
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogIncoming;

impl<B> OnRequest<B> for LogIncoming {
    fn on_request(&mut self, _req: &Request<B>, _span: &Span) {
        tracing::info!("Incoming request");
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogCompletion;

/// Severity of the completion line for a response status.
pub fn completion_level(status: u16) -> Level {
    match status {
        500.. => Level::ERROR,
        400..=499 => Level::WARN,
        _ => Level::INFO,
    }
}

impl<B> OnResponse<B> for LogCompletion {
    fn on_response(self, res: &Response<B>, latency: Duration, _span: &Span) {
        let status = res.status().as_u16();
        let content_length = res
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let latency_ms = latency.as_millis() as u64;

        let level = completion_level(status);
        if level == Level::ERROR {
            tracing::error!(
                status,
                content_length,
                latency_ms,
                "Request completed with server error"
            );
        } else if level == Level::WARN {
            tracing::warn!(
                status,
                content_length,
                latency_ms,
                "Request completed with client error"
            );
        } else {
            tracing::info!(
                status,
                content_length,
                latency_ms,
                "Request completed successfully"
            );
        }
    }
}

pub type AccessLogLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    MakeRequestSpan,
    LogIncoming,
    LogCompletion,
    DefaultOnBodyChunk,
    DefaultOnEos,
    (),
>;

/// Failures are already reported by `LogCompletion`, so the failure hook is a no-op.
pub fn create_trace_layer() -> AccessLogLayer {
    TraceLayer::new_for_http()
        .make_span_with(MakeRequestSpan)
        .on_request(LogIncoming)
        .on_response(LogCompletion)
        .on_failure(())
}
