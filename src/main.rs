//! UX Scanner main entry point
//!
//! This is the command-line interface for the UX Scanner: run the HTTP API,
//! or scan a site directly from the terminal.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use ux_scanner::config::{load_config_with_hash, Config};
use ux_scanner::llm::GeminiClient;
use ux_scanner::output::{format_json_report, generate_markdown_report};
use ux_scanner::renderer::HttpRenderer;
use ux_scanner::scan::{ScanOptions, ScanRequest, Scanner};
use ux_scanner::server::{run_server, AppState};

/// UX Scanner: SEO and UX analysis for websites
///
/// Crawls a site breadth-first, analyzes each page with a language model
/// (falling back to rule-based scoring), and reports prioritized issues.
#[derive(Parser, Debug)]
#[command(name = "ux-scanner")]
#[command(version = "1.0.0")]
#[command(about = "SEO and UX scanner for websites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Override the configured bind address
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Scan a URL and print the JSON report
    Scan {
        /// Absolute http(s) URL to scan
        url: String,

        /// Crawl and analyze multiple pages
        #[arg(long)]
        multi_page: bool,

        /// Page budget for multi-page scans
        #[arg(long, requires = "multi_page")]
        max_pages: Option<usize>,

        /// Depth budget for multi-page scans
        #[arg(long, requires = "multi_page")]
        max_depth: Option<u32>,

        /// Also write a markdown report to this path
        #[arg(long, value_name = "PATH")]
        markdown: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;

    let model = GeminiClient::from_env(&config.model).context("Failed to build model client")?;
    let api_key_configured = model.has_api_key();
    if !api_key_configured {
        tracing::warn!(
            "{} is not set; model calls will fail and rule-based analysis will be used",
            config.model.api_key_env
        );
    }
    let renderer = HttpRenderer::new(config.renderer.clone());
    let bind_address = config.server.bind_address.clone();
    let scanner = Arc::new(Scanner::new(config, Arc::new(renderer), Arc::new(model)));

    match cli.command {
        Command::Serve { bind } => {
            let addr = match bind {
                Some(addr) => addr,
                None => bind_address
                    .parse()
                    .with_context(|| format!("Invalid bind address: {}", bind_address))?,
            };
            handle_serve(addr, AppState::new(scanner, api_key_configured)).await
        }
        Command::Scan {
            url,
            multi_page,
            max_pages,
            max_depth,
            markdown,
        } => {
            let request = ScanRequest {
                url: Some(url),
                options: ScanOptions {
                    multi_page,
                    max_pages,
                    max_depth,
                },
            };
            handle_scan(&scanner, &request, markdown.as_deref()).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ux_scanner=info,warn"),
            1 => EnvFilter::new("ux_scanner=debug,info"),
            2 => EnvFilter::new("ux_scanner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads and validates the configuration file, or returns defaults
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

async fn handle_serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    run_server(addr, state)
        .await
        .with_context(|| format!("Server on {} failed", addr))
}

/// Runs one scan, prints the JSON report to stdout and optionally writes markdown
async fn handle_scan(
    scanner: &Scanner,
    request: &ScanRequest,
    markdown: Option<&Path>,
) -> anyhow::Result<()> {
    let report = match scanner.scan(request).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            return Err(e.into());
        }
    };

    println!("{}", format_json_report(&report)?);

    if let Some(path) = markdown {
        generate_markdown_report(&report, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Markdown report written to: {}", path.display());
    }

    Ok(())
}
