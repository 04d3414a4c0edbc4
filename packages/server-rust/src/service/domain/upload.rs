use devprobe_core::{RequestContext, ServiceError, UriService};

use super::{normalize_arguments, service_names};

/// Argument path that accepts post data.
pub const UPLOAD_PATH: &str = "/upload";

/// Largest post body accepted on [`UPLOAD_PATH`], in bytes.
pub const UPLOAD_POST_LIMIT: usize = 4096;

/// Accepts a post body on `/upload` and replies with the number of bytes
/// received as an 8-byte little-endian integer.
pub struct UploadService;

impl UriService for UploadService {
    fn name(&self) -> &str {
        service_names::UPLOAD
    }

    fn query_post_size_limit(&self, arguments: &mut String) -> usize {
        normalize_arguments(arguments);
        if arguments.as_str() == UPLOAD_PATH {
            UPLOAD_POST_LIMIT
        } else {
            0
        }
    }

    fn handle_request(&self, ctx: &mut RequestContext<'_>) -> Result<(), ServiceError> {
        normalize_arguments(ctx.arguments);
        if ctx.arguments.as_str() != UPLOAD_PATH {
            return Err(ServiceError::InvalidArguments(format!(
                "expected {UPLOAD_PATH}, got {:?}",
                ctx.arguments
            )));
        }
        let Some(post) = ctx.post_data else {
            return Err(ServiceError::PostDataRequired);
        };

        let received = post.len() as u64;
        tracing::debug!(received, format = %post.format, "upload received");
        ctx.write_binary(&received.to_le_bytes())?;
        Ok(())
    }
}
