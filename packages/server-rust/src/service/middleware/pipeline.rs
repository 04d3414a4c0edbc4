//! Pipeline composition: combines all middleware layers into a single service stack.

use tower::ServiceBuilder;

use super::metrics::MetricsLayer;
use crate::service::dispatch::UriDispatcher;
use crate::service::request::{DispatchError, UriRequest, UriResponse};

/// Build the dispatch pipeline by wrapping the `UriDispatcher` with middleware layers.
///
/// `MetricsLayer` records timing and outcome around the actual call.
#[must_use]
pub fn build_dispatch_pipeline(
    dispatcher: UriDispatcher,
) -> impl tower::Service<UriRequest, Response = UriResponse, Error = DispatchError> + Clone {
    ServiceBuilder::new()
        .layer(MetricsLayer)
        .service(dispatcher)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
