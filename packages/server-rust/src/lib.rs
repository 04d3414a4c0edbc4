//! devprobe server -- service registry and URI request dispatch.

pub mod service;

pub use service::{
    build_dispatch_pipeline, DispatchConfig, DispatchError, ServiceRegistry, UriDispatcher,
    UriRequest, UriResponse,
};
