use crate::block::SharedBlock;
use crate::context::RequestContext;
use crate::error::ServiceError;
use crate::format::DataFormat;

/// Which handler shape a service was written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceGeneration {
    /// Implements only `handle_legacy_request`: arguments in, text out.
    Legacy,
    /// Implements `handle_request` with explicit formats and post data.
    Current,
}

/// A named handler answering URI requests.
///
/// Implementors override either [`handle_request`](Self::handle_request)
/// (current shape) or [`handle_legacy_request`](Self::handle_legacy_request)
/// (legacy shape). The default `handle_request` adapts the legacy shape, so
/// callers always go through `handle_request` regardless of which one a
/// service provides.
///
/// All methods are synchronous and report failure by value. Services are
/// shared across threads as `Arc<dyn UriService>`.
pub trait UriService: Send + Sync {
    /// Name used to address this service. Must not change while the service
    /// is registered.
    fn name(&self) -> &str;

    /// Handler shape this service implements. Informational only.
    fn generation(&self) -> ServiceGeneration {
        ServiceGeneration::Current
    }

    /// Handles one request, writing the response into
    /// `ctx.response_block` and setting `ctx.response_data_format`.
    ///
    /// The default forwards the arguments and the response block to
    /// `handle_legacy_request` and, only when that succeeds, marks the
    /// response `Text`. The bytes are not inspected, so a legacy service that
    /// writes binary data is still reported as text.
    ///
    /// # Errors
    ///
    /// Any `ServiceError`. The caller must not transmit the response block.
    fn handle_request(&self, ctx: &mut RequestContext<'_>) -> Result<(), ServiceError> {
        self.handle_legacy_request(ctx.arguments, &ctx.response_block)?;
        ctx.response_data_format = DataFormat::Text;
        Ok(())
    }

    /// Legacy handler: no post data, implicit text response.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotImplemented` unless overridden.
    fn handle_legacy_request(
        &self,
        arguments: &mut String,
        response_block: &SharedBlock,
    ) -> Result<(), ServiceError> {
        let _ = (arguments, response_block);
        tracing::error!(service = self.name(), "legacy request handler not implemented");
        Err(ServiceError::NotImplemented)
    }

    /// Maximum post body size, in bytes, accepted for a request with these
    /// arguments. Asked before any body is received; 0 refuses post data.
    ///
    /// `arguments` is mutable so the service can parse it, but whatever it
    /// does here must leave the same result when repeated and must be fine
    /// for the following `handle_request` to observe.
    fn query_post_size_limit(&self, arguments: &mut String) -> usize {
        let _ = arguments;
        0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
