//! `devprobe` -- dispatches one URI request to a built-in service and prints
//! the response header and payload.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use devprobe_core::DataFormat;
use devprobe_server::service::domain::register_builtin_services;
use devprobe_server::{
    build_dispatch_pipeline, DispatchConfig, ServiceRegistry, UriDispatcher, UriRequest,
};
use tower::ServiceExt;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PostFormat {
    Text,
    Binary,
}

impl From<PostFormat> for DataFormat {
    fn from(value: PostFormat) -> Self {
        match value {
            PostFormat::Text => DataFormat::Text,
            PostFormat::Binary => DataFormat::Binary,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Dispatch a URI request to a devprobe service")]
struct Cli {
    /// Name of the service to address (e.g. `info`, `upload`, `echo`)
    #[arg(long, short)]
    service: String,

    /// Request arguments passed to the service
    #[arg(long, short, default_value = "")]
    args: String,

    /// File sent as post data
    #[arg(long)]
    post_file: Option<PathBuf>,

    /// Format of the post data
    #[arg(long, value_enum, default_value_t = PostFormat::Binary)]
    post_format: PostFormat,

    /// Global cap on post data, in bytes
    #[arg(long, env = "DEVPROBE_MAX_POST_SIZE", default_value_t = 1_048_576)]
    max_post_size: usize,

    /// Agent name reported by the `info` service
    #[arg(long, default_value = "devprobe")]
    agent_name: String,

    /// Verbosity level (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            max_post_data_size: self.max_post_size,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr so stdout carries only the response.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Reads at most `limit + 1` bytes, so an oversized body is still detected
/// by admission without being read in full.
fn read_post_body(path: &Path, limit: usize) -> anyhow::Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut body = Vec::new();
    file.take((limit as u64).saturating_add(1))
        .read_to_end(&mut body)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(body)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.dispatch_config();
    let registry = Arc::new(ServiceRegistry::new());
    register_builtin_services(&registry, &cli.agent_name)?;
    let dispatcher = UriDispatcher::new(registry, Arc::new(config));

    let mut arguments = cli.args.clone();
    let mut request_post = None;
    if let Some(path) = &cli.post_file {
        let limit = dispatcher.query_post_limit(&cli.service, &mut arguments)?;
        tracing::info!(service = %cli.service, limit, "post admission");
        request_post = Some(read_post_body(path, limit)?);
    }

    let mut request = UriRequest::new(cli.service.clone(), arguments);
    if let Some(body) = request_post {
        request = request.with_post(body, cli.post_format.into());
    }

    let response = build_dispatch_pipeline(dispatcher)
        .oneshot(request)
        .await
        .with_context(|| format!("request to {} failed", cli.service))?;

    println!("{}", serde_json::to_string(&response.header)?);
    let payload = response.payload()?;
    match response.header.format {
        DataFormat::Text => print!("{}", String::from_utf8_lossy(&payload)),
        _ => println!("{}", hex::encode(&payload)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["devprobe", "--service", "info"]);
        assert_eq!(cli.args, "");
        assert!(cli.post_file.is_none());
        assert_eq!(cli.post_format, PostFormat::Binary);
        let config = cli.dispatch_config();
        assert_eq!(config.max_post_data_size, 1_048_576);
    }

    #[test]
    fn post_format_maps_to_data_format() {
        assert_eq!(DataFormat::from(PostFormat::Text), DataFormat::Text);
        assert_eq!(DataFormat::from(PostFormat::Binary), DataFormat::Binary);
    }

    #[test]
    fn post_body_read_stops_one_past_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 100]).unwrap();

        assert_eq!(read_post_body(file.path(), 10).unwrap().len(), 11);
        assert_eq!(read_post_body(file.path(), 4096).unwrap().len(), 100);
        assert_eq!(read_post_body(file.path(), 0).unwrap().len(), 1);
    }

    #[test]
    fn unbounded_limit_reads_whole_body() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 100]).unwrap();

        assert_eq!(read_post_body(file.path(), usize::MAX).unwrap().len(), 100);
    }

    #[test]
    fn missing_post_file_is_an_error() {
        let err = read_post_body(Path::new("/nonexistent/devprobe-post"), 10).unwrap_err();
        assert!(err.to_string().contains("opening"));
    }
}
