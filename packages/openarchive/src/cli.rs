//! Command-line interface for the responder.

use std::io::Write;
use std::net::SocketAddr;

use clap::{Parser, Subcommand};

use crate::config::RepositoryConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::server::{serve, DEFAULT_ENDPOINT_PATH};
use crate::types::OaiRequest;

/// OpenArchive - OAI-PMH 2.0 responder.
///
/// Repository settings are read from the environment: OAI_API_ADMIN_EMAIL,
/// OAI_REPOSITORY_NAME, OAI_BASE_URL, OAI_EARLIEST_DATESTAMP, OAI_STYLESHEET.
#[derive(Parser)]
#[command(name = "openarchive")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the OAI-PMH endpoint over HTTP.
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: SocketAddr,

        /// Path of the OAI endpoint
        #[arg(long, default_value = DEFAULT_ENDPOINT_PATH)]
        path: String,
    },

    /// Render the response to a single request on stdout.
    Request {
        /// OAI verb (e.g., Identify, ListMetadataFormats, ListRecords)
        #[arg(long)]
        verb: Option<String>,

        /// Lower datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
        #[arg(long)]
        from: Option<String>,

        /// Upper datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
        #[arg(long)]
        until: Option<String>,

        /// Set identifier
        #[arg(long)]
        set: Option<String>,

        /// Resumption token from a previous response
        #[arg(long)]
        resumption_token: Option<String>,

        /// Request path echoed in the response
        #[arg(long, default_value = DEFAULT_ENDPOINT_PATH)]
        path: String,
    },
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset.
    ///
    /// The server logs at `info`; a one-shot request only reports problems.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        match self.command {
            Commands::Serve { .. } => "info",
            Commands::Request { .. } => "warn",
        }
    }
}

/// Run the parsed CLI.
pub fn run(cli: Cli) -> Result<()> {
    let config = RepositoryConfig::from_env()?;

    match cli.command {
        Commands::Serve { addr, path } => serve_command(config, addr, &path),
        Commands::Request {
            verb,
            from,
            until,
            set,
            resumption_token,
            path,
        } => {
            let request = OaiRequest {
                path,
                verb,
                from,
                until,
                set,
                resumption_token,
            };
            request_command(config, &request)
        }
    }
}

fn serve_command(config: RepositoryConfig, addr: SocketAddr, path: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(Dispatcher::new(config), addr, path))
}

fn request_command(config: RepositoryConfig, request: &OaiRequest) -> Result<()> {
    let response = Dispatcher::new(config).handle(request)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(response.body.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
