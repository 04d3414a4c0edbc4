//! devprobe core -- the URI service contract.
//!
//! Defines the [`UriService`] trait, the request/response envelopes passed
//! across it, and the reference-counted [`ServerBlock`] responses are written
//! into.

pub mod block;
pub mod context;
pub mod error;
pub mod format;
pub mod name;
pub mod traits;

pub use block::{BlockError, ServerBlock, SharedBlock};
pub use context::{PostContext, PostData, RequestContext, ResponseContext, ResponseHeader};
pub use error::{HeaderError, ServiceError};
pub use format::DataFormat;
pub use name::{ServiceName, ServiceNameError, MAX_SERVICE_NAME_LENGTH};
pub use traits::{ServiceGeneration, UriService};
