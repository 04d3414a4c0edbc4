use devprobe_core::{ServiceError, ServiceGeneration, SharedBlock, UriService};

use super::service_names;

/// Writes its arguments back verbatim.
///
/// Implements only the legacy handler, so it is reached through the default
/// `handle_request` adapter and always answers as text.
pub struct EchoService;

impl UriService for EchoService {
    fn name(&self) -> &str {
        service_names::ECHO
    }

    fn generation(&self) -> ServiceGeneration {
        ServiceGeneration::Legacy
    }

    fn handle_legacy_request(
        &self,
        arguments: &mut String,
        response_block: &SharedBlock,
    ) -> Result<(), ServiceError> {
        response_block.write(arguments.as_bytes())?;
        Ok(())
    }
}
