use crate::block::BlockError;

/// Failure reported by a service call.
///
/// Every variant means the same thing to the transport: the call did not
/// succeed and nothing from the response block may be transmitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Generic failure.
    #[error("request failed: {0}")]
    Failed(String),
    /// The arguments could not be parsed or name an unsupported command.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// The service needs a post body and none was sent.
    #[error("request requires post data")]
    PostDataRequired,
    /// Neither the current nor the legacy handler was overridden.
    #[error("request handler not implemented")]
    NotImplemented,
    /// Writing the response block was refused.
    #[error("response block: {0}")]
    Block(#[from] BlockError),
}

/// Errors from turning a finished call into a [`ResponseHeader`](crate::ResponseHeader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    /// The service reported success without choosing `Text` or `Binary`.
    #[error("response format was never negotiated")]
    UnknownFormat,
    #[error("response block: {0}")]
    Block(#[from] BlockError),
}
