use std::fmt::Write as _;

use devprobe_core::{RequestContext, ServiceError, UriService};

use super::{normalize_arguments, service_names};

/// Text report about the running agent.
///
/// Commands (leading `/` optional): empty or `all` for every field, `name`,
/// `version`. Accepts no post data.
pub struct InfoService {
    agent_name: String,
    version: &'static str,
}

impl InfoService {
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    fn report(&self, command: &str) -> Result<String, ServiceError> {
        let mut out = String::new();
        match command {
            "" | "all" => {
                let _ = writeln!(out, "name={}", self.agent_name);
                let _ = writeln!(out, "version={}", self.version);
            }
            "name" => {
                let _ = writeln!(out, "{}", self.agent_name);
            }
            "version" => {
                let _ = writeln!(out, "{}", self.version);
            }
            other => {
                return Err(ServiceError::InvalidArguments(format!(
                    "unknown info command: {other}"
                )))
            }
        }
        Ok(out)
    }
}

impl UriService for InfoService {
    fn name(&self) -> &str {
        service_names::INFO
    }

    fn handle_request(&self, ctx: &mut RequestContext<'_>) -> Result<(), ServiceError> {
        normalize_arguments(ctx.arguments);
        let report = self.report(ctx.arguments.trim_start_matches('/'))?;
        ctx.write_text(&report)?;
        Ok(())
    }
}
