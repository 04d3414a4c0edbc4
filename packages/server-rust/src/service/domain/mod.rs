//! Built-in URI services.
//!
//! - [`InfoService`] (`info`): text report about the agent
//! - [`UploadService`] (`upload`): accepts post data, replies with a binary acknowledgment
//! - [`EchoService`] (`echo`): legacy-shaped handler that echoes its arguments

pub mod echo;
pub mod info;
pub mod upload;

pub use echo::EchoService;
pub use info::InfoService;
pub use upload::UploadService;

use super::registry::{RegistryError, ServiceRegistry};

/// Well-known names of the built-in services.
pub mod service_names {
    pub const INFO: &str = "info";
    pub const UPLOAD: &str = "upload";
    pub const ECHO: &str = "echo";
}

/// Trims surrounding whitespace from `arguments` in place.
///
/// Idempotent, so it is safe to run from both `query_post_size_limit` and
/// `handle_request` on the same buffer.
pub fn normalize_arguments(arguments: &mut String) {
    let end = arguments.trim_end().len();
    arguments.truncate(end);
    let start = arguments.len() - arguments.trim_start().len();
    arguments.drain(..start);
}

/// Register every built-in service.
///
/// # Errors
///
/// Fails if one of the built-in names is already taken.
pub fn register_builtin_services(
    registry: &ServiceRegistry,
    agent_name: &str,
) -> Result<(), RegistryError> {
    registry.register(InfoService::new(agent_name))?;
    registry.register(UploadService)?;
    registry.register(EchoService)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use devprobe_core::{DataFormat, ServiceGeneration};

    use super::*;
    use crate::service::config::DispatchConfig;
    use crate::service::dispatch::UriDispatcher;
    use crate::service::request::{DispatchError, UriRequest};

    fn builtin_dispatcher() -> UriDispatcher {
        let registry = ServiceRegistry::new();
        register_builtin_services(&registry, "devprobe-test").unwrap();
        UriDispatcher::new(Arc::new(registry), Arc::new(DispatchConfig::default()))
    }

    #[test]
    fn normalize_trims_both_ends() {
        let mut args = String::from(" \t/upload \n");
        normalize_arguments(&mut args);
        assert_eq!(args, "/upload");
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut args = String::from("  a b  ");
        normalize_arguments(&mut args);
        let once = args.clone();
        normalize_arguments(&mut args);
        assert_eq!(args, once);
    }

    #[test]
    fn normalize_handles_blank_input() {
        let mut args = String::from("   ");
        normalize_arguments(&mut args);
        assert!(args.is_empty());
    }

    #[test]
    fn all_builtins_registered_in_order() {
        let registry = ServiceRegistry::new();
        register_builtin_services(&registry, "agent").unwrap();
        let names: Vec<String> = registry.names().iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec![service_names::INFO, service_names::UPLOAD, service_names::ECHO]
        );
        assert_eq!(
            registry.get_by_name(service_names::ECHO).unwrap().generation(),
            ServiceGeneration::Legacy
        );
    }

    #[test]
    fn registering_builtins_twice_fails() {
        let registry = ServiceRegistry::new();
        register_builtin_services(&registry, "agent").unwrap();
        assert!(matches!(
            register_builtin_services(&registry, "agent"),
            Err(RegistryError::Duplicate { .. })
        ));
    }

    #[test]
    fn info_rejects_post_without_invoking_handler() {
        let dispatcher = builtin_dispatcher();
        let mut args = String::new();
        assert_eq!(
            dispatcher.query_post_limit(service_names::INFO, &mut args).unwrap(),
            0
        );

        let req = UriRequest::new(service_names::INFO, "").with_post(vec![0u8; 10], DataFormat::Text);
        assert!(matches!(
            dispatcher.dispatch(req),
            Err(DispatchError::PostRejected { size: 10, limit: 0, .. })
        ));
    }

    #[test]
    fn upload_accepts_full_limit_and_acknowledges_in_binary() {
        let dispatcher = builtin_dispatcher();
        let mut args = String::from("/upload");
        assert_eq!(
            dispatcher.query_post_limit(service_names::UPLOAD, &mut args).unwrap(),
            4096
        );

        let req = UriRequest::new(service_names::UPLOAD, args)
            .with_post(vec![0x5Au8; 4096], DataFormat::Binary);
        let resp = dispatcher.dispatch(req).unwrap();
        assert_eq!(resp.header.size, 8);
        assert_eq!(resp.header.format, DataFormat::Binary);
        assert_eq!(resp.payload().unwrap().as_ref(), &4096u64.to_le_bytes());
    }

    #[test]
    fn upload_rejects_one_byte_over_limit() {
        let dispatcher = builtin_dispatcher();
        let req = UriRequest::new(service_names::UPLOAD, "/upload")
            .with_post(vec![0u8; 4097], DataFormat::Binary);
        assert!(matches!(
            dispatcher.dispatch(req),
            Err(DispatchError::PostRejected { size: 4097, limit: 4096, .. })
        ));
    }

    #[test]
    fn echo_goes_through_legacy_adapter() {
        let dispatcher = builtin_dispatcher();
        let resp = dispatcher
            .dispatch(UriRequest::new(service_names::ECHO, "ping 42"))
            .unwrap();
        assert_eq!(resp.header.format, DataFormat::Text);
        assert_eq!(resp.payload().unwrap().as_ref(), b"ping 42");
    }
}
