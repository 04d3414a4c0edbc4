//! Transport-facing request, response, and error types.

use bytes::Bytes;
use devprobe_core::{
    BlockError, DataFormat, PostContext, ResponseHeader, ServiceError, SharedBlock,
};

// ---------------------------------------------------------------------------
// UriRequest
// ---------------------------------------------------------------------------

/// Post body attached to a [`UriRequest`].
#[derive(Debug, Clone)]
pub enum PostBody {
    /// Body received in one piece.
    Inline { data: Bytes, format: DataFormat },
    /// Body streamed into a closed block before dispatch.
    Streamed { block: SharedBlock, format: DataFormat },
}

impl PostBody {
    /// Size of the body in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            PostBody::Inline { data, .. } => data.len(),
            PostBody::Streamed { block, .. } => block.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn format(&self) -> DataFormat {
        match self {
            PostBody::Inline { format, .. } | PostBody::Streamed { format, .. } => *format,
        }
    }

    /// Returns the body bytes and format.
    ///
    /// # Errors
    ///
    /// Fails if a streamed block is still open or was discarded.
    pub fn into_bytes(self) -> Result<(Bytes, DataFormat), BlockError> {
        match self {
            PostBody::Inline { data, format } => Ok((data, format)),
            PostBody::Streamed { block, format } => Ok((block.read()?, format)),
        }
    }
}

/// A request addressed to a service by name.
#[derive(Debug, Clone)]
pub struct UriRequest {
    pub service: String,
    pub arguments: String,
    pub post: Option<PostBody>,
}

impl UriRequest {
    /// A request without a post body.
    pub fn new(service: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            arguments: arguments.into(),
            post: None,
        }
    }

    /// Attaches an inline post body.
    #[must_use]
    pub fn with_post(mut self, data: impl Into<Bytes>, format: DataFormat) -> Self {
        self.post = Some(PostBody::Inline {
            data: data.into(),
            format,
        });
        self
    }

    /// Builds a request from a post body already streamed into a block.
    pub fn streamed(service: impl Into<String>, post: PostContext) -> Self {
        Self {
            service: service.into(),
            arguments: post.arguments,
            post: Some(PostBody::Streamed {
                block: post.post_block,
                format: post.post_data_format,
            }),
        }
    }

    #[must_use]
    pub fn post_data_size(&self) -> usize {
        self.post.as_ref().map_or(0, PostBody::len)
    }
}

// ---------------------------------------------------------------------------
// UriResponse
// ---------------------------------------------------------------------------

/// Successful response: the header plus the closed block it describes.
#[derive(Debug, Clone)]
pub struct UriResponse {
    pub header: ResponseHeader,
    pub block: SharedBlock,
}

impl UriResponse {
    /// The committed response bytes.
    ///
    /// # Errors
    ///
    /// Fails only if another holder discarded the block after dispatch.
    pub fn payload(&self) -> Result<Bytes, BlockError> {
        self.block.read()
    }
}

// ---------------------------------------------------------------------------
// DispatchError
// ---------------------------------------------------------------------------

/// Errors returned by the dispatcher. None of them carry a transmittable
/// response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown service: {name}")]
    UnknownService { name: String },
    #[error("post data of {size} bytes rejected by {service} (limit {limit})")]
    PostRejected {
        service: String,
        size: usize,
        limit: usize,
    },
    #[error("post data sent to {service} has no format")]
    InvalidPostFormat { service: String },
    #[error("service {service} failed: {source}")]
    ServiceFailed {
        service: String,
        #[source]
        source: ServiceError,
    },
    #[error("service {service} succeeded without choosing a response format")]
    UnnegotiatedFormat { service: String },
    #[error("block error: {0}")]
    Block(#[from] BlockError),
}
