//! URI service dispatch.
//!
//! This module implements the transport-side half of the service contract:
//!
//! 1. **Registry** (`registry`): services keyed by validated `ServiceName`
//! 2. **Dispatch** (`dispatch`): lookup, post admission, invocation, header validation
//! 3. **Middleware** (`middleware`): Tower layers (metrics)
//! 4. **Domain services** (`domain`): built-in `info`, `upload` and `echo`

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod middleware;
pub mod registry;
pub mod request;

// Re-export key types for convenient access.
pub use config::DispatchConfig;
pub use dispatch::UriDispatcher;
pub use middleware::build_dispatch_pipeline;
pub use registry::{RegistryError, ServiceRegistry};
pub use request::{DispatchError, PostBody, UriRequest, UriResponse};
