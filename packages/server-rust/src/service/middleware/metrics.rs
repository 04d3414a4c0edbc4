//! Metrics middleware for URI requests.
//!
//! Records request duration, outcome, and response header fields using
//! `tracing` spans.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::request::{DispatchError, UriRequest, UriResponse};

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments requests with timing and outcome via `tracing` spans.
#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

/// Service wrapper that records request duration and outcome in tracing spans.
#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S> Service<UriRequest> for MetricsService<S>
where
    S: Service<UriRequest, Response = UriResponse, Error = DispatchError> + Send,
    S::Future: Send + 'static,
{
    type Response = UriResponse;
    type Error = DispatchError;
    type Future = Pin<Box<dyn Future<Output = Result<UriResponse, DispatchError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: UriRequest) -> Self::Future {
        let service_name = request.service.clone();
        let post_size = request.post_data_size();

        let span = info_span!(
            "uri_request",
            service = %service_name,
            post_size = post_size,
            duration_us = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let start = Instant::now();
        let fut = self.inner.call(request);

        Box::pin(
            async move {
                let result = fut.await;

                #[allow(clippy::cast_possible_truncation)]
                let duration_us = start.elapsed().as_micros() as u64;

                let outcome = match &result {
                    Ok(_) => "ok",
                    Err(_) => "error",
                };
                tracing::Span::current().record("duration_us", duration_us);
                tracing::Span::current().record("outcome", outcome);

                match &result {
                    Ok(resp) => tracing::info!(
                        service = %service_name,
                        size = resp.header.size,
                        format = %resp.header.format,
                        duration_us = duration_us,
                        "request complete"
                    ),
                    Err(err) => tracing::info!(
                        service = %service_name,
                        error = %err,
                        duration_us = duration_us,
                        "request failed"
                    ),
                }

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
