//! URI dispatch: resolves a request to a service, enforces post admission,
//! invokes the service, and validates the response header.

use std::future::{ready, Ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use devprobe_core::{
    DataFormat, HeaderError, RequestContext, ResponseContext, ResponseHeader, ServerBlock,
    SharedBlock, UriService,
};
use tower::Service;

use super::config::DispatchConfig;
use super::registry::ServiceRegistry;
use super::request::{DispatchError, UriRequest, UriResponse};

// ---------------------------------------------------------------------------
// UriDispatcher
// ---------------------------------------------------------------------------

/// Dispatches [`UriRequest`]s to services held in a [`ServiceRegistry`].
///
/// Each dispatch is one synchronous, at-most-once call. On any failure the
/// response block is discarded so nothing written during the call can be
/// read back.
#[derive(Clone)]
pub struct UriDispatcher {
    registry: Arc<ServiceRegistry>,
    config: Arc<DispatchConfig>,
}

impl UriDispatcher {
    #[must_use]
    pub fn new(registry: Arc<ServiceRegistry>, config: Arc<DispatchConfig>) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    fn lookup(&self, name: &str) -> Result<Arc<dyn UriService>, DispatchError> {
        self.registry
            .get_by_name(name)
            .ok_or_else(|| DispatchError::UnknownService {
                name: name.to_string(),
            })
    }

    /// The service's own limit, clamped to the configured global cap.
    fn admission_limit(&self, service: &dyn UriService, arguments: &mut String) -> usize {
        service
            .query_post_size_limit(arguments)
            .min(self.config.max_post_data_size)
    }

    /// How many post bytes the transport may accept for a request to
    /// `service` with these arguments. Call before receiving any body.
    ///
    /// # Errors
    ///
    /// `DispatchError::UnknownService` if no service has that name.
    pub fn query_post_limit(
        &self,
        service: &str,
        arguments: &mut String,
    ) -> Result<usize, DispatchError> {
        let svc = self.lookup(service)?;
        let limit = self.admission_limit(svc.as_ref(), arguments);
        tracing::debug!(service, limit, "post admission queried");
        Ok(limit)
    }

    /// Dispatches `request` into a fresh response block.
    ///
    /// # Errors
    ///
    /// See [`dispatch_into`](Self::dispatch_into).
    pub fn dispatch(&self, request: UriRequest) -> Result<UriResponse, DispatchError> {
        self.dispatch_into(request, ServerBlock::shared())
    }

    /// Dispatches `request`, writing the response into `block`.
    ///
    /// The block is reset first, so bytes left over from earlier use never
    /// count towards the response. On any error the block is discarded,
    /// including when the request fails before the service is invoked.
    ///
    /// # Errors
    ///
    /// - `UnknownService` when the name is not registered.
    /// - `InvalidPostFormat` when a non-empty body has format `Unknown`.
    /// - `PostRejected` when the body exceeds the admission limit. The service
    ///   is not invoked.
    /// - `ServiceFailed` when the service returns an error.
    /// - `UnnegotiatedFormat` when the service succeeds without a format.
    /// - `Block` when the post or response block cannot be used.
    pub fn dispatch_into(
        &self,
        request: UriRequest,
        block: SharedBlock,
    ) -> Result<UriResponse, DispatchError> {
        match self.dispatch_request(request, &block) {
            Ok(header) => Ok(UriResponse { header, block }),
            Err(err) => {
                block.discard();
                tracing::warn!(error = %err, "response discarded");
                Err(err)
            }
        }
    }

    fn dispatch_request(
        &self,
        request: UriRequest,
        block: &SharedBlock,
    ) -> Result<ResponseHeader, DispatchError> {
        let UriRequest {
            service: service_name,
            mut arguments,
            post,
        } = request;
        let service = self.lookup(&service_name)?;

        // An empty body is the same as no body. A streamed block is read
        // first so a discarded one fails instead of passing as empty.
        let post = match post {
            Some(body) => Some(body.into_bytes()?).filter(|(data, _)| !data.is_empty()),
            None => None,
        };

        if let Some((data, format)) = &post {
            if *format == DataFormat::Unknown {
                return Err(DispatchError::InvalidPostFormat {
                    service: service_name,
                });
            }
            let limit = self.admission_limit(service.as_ref(), &mut arguments);
            if data.len() > limit {
                tracing::warn!(
                    service = %service_name,
                    size = data.len(),
                    limit,
                    "post data rejected"
                );
                return Err(DispatchError::PostRejected {
                    service: service_name,
                    size: data.len(),
                    limit,
                });
            }
        }

        tracing::debug!(
            service = %service_name,
            generation = ?service.generation(),
            post_size = post.as_ref().map_or(0, |(data, _)| data.len()),
            "dispatching request"
        );

        block.reset();
        let mut ctx = RequestContext::new(&mut arguments, block.clone());
        if let Some((data, format)) = &post {
            ctx = ctx.with_post(data, *format);
        }

        let outcome = service.handle_request(&mut ctx);
        // The header always describes the block handed back to the caller,
        // even if the service replaced the one in its context.
        let mut response = ResponseContext::new(block.clone());
        response.response_data_format = ctx.response_data_format;

        if let Err(source) = outcome {
            return Err(DispatchError::ServiceFailed {
                service: service_name,
                source,
            });
        }

        response.commit().map_err(|err| match err {
            HeaderError::UnknownFormat => DispatchError::UnnegotiatedFormat {
                service: service_name,
            },
            HeaderError::Block(e) => DispatchError::Block(e),
        })
    }
}

impl Service<UriRequest> for UriDispatcher {
    type Response = UriResponse;
    type Error = DispatchError;
    type Future = Ready<Result<UriResponse, DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: UriRequest) -> Self::Future {
        ready(self.dispatch(request))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
