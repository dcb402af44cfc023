// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Kehys CLI - Iframe Scanner
//!
//! Scans a page or a saved HTML document for frames and text, runs the
//! static markup lookup, or serves the web orchestrator.

use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use url::Url;

use kehys::report::{completion_summary, render};
use kehys::{
    find_frame_locators, run_scan, BrowserConfig, DriverKind, EventSink, ScanInput, ScanOptions,
    ServerConfig,
};

/// Kehys CLI
#[derive(Parser)]
#[command(name = "kehys")]
#[command(about = "Find every iframe on a page and search all of them for text")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a page or HTML document
    Scan(ScanArgs),
    /// Locate frames mentioning a text in raw markup, without loading them
    Markup(MarkupArgs),
    /// Run the web orchestrator
    Serve(ServeArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["url", "html", "stdin"])))]
struct ScanArgs {
    /// Page URL; `https://` is assumed when no scheme is given
    #[arg(long)]
    url: Option<String>,

    /// HTML file to scan
    #[arg(long)]
    html: Option<PathBuf>,

    /// Read HTML from standard input
    #[arg(long)]
    stdin: bool,

    /// Text to search for in every frame
    #[arg(short, long)]
    search: Option<String>,

    /// Show the browser window (WebDriver only)
    #[arg(long)]
    visible: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Base URL for relative frame sources of HTML input
    #[arg(long)]
    base_url: Option<String>,

    /// Allow entering cross-origin frames
    #[arg(long)]
    disable_web_security: bool,

    /// Seconds to wait after loading a URL
    #[arg(long, value_parser = parse_secs)]
    settle: Option<Duration>,

    /// Seconds before a fetch or driver command times out
    #[arg(long, value_parser = parse_secs)]
    timeout: Option<Duration>,

    /// Automation driver
    #[arg(long, value_enum, default_value_t = DriverArg::Native)]
    driver: DriverArg,

    /// WebDriver endpoint
    #[arg(long)]
    webdriver_url: Option<String>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["html", "stdin"])))]
struct MarkupArgs {
    /// HTML file to inspect
    #[arg(long)]
    html: Option<PathBuf>,

    /// Read HTML from standard input
    #[arg(long)]
    stdin: bool,

    /// Text to look for
    #[arg(short, long)]
    search: String,
}

#[derive(Args)]
struct ServeArgs {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Seconds an idle scan session is kept
    #[arg(long, default_value_t = 3600)]
    session_ttl: u64,

    /// Allow scans to enter cross-origin frames
    #[arg(long)]
    disable_web_security: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum DriverArg {
    Native,
    Webdriver,
}

impl From<DriverArg> for DriverKind {
    fn from(arg: DriverArg) -> Self {
        match arg {
            DriverArg::Native => DriverKind::Native,
            DriverArg::Webdriver => DriverKind::WebDriver,
        }
    }
}

fn parse_secs(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw.parse().map_err(|e| format!("{}", e))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{}", e))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kehys=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Scan(args) => scan(args).await,
        Commands::Markup(args) => markup(args),
        Commands::Serve(args) => serve(args).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Add `https://` to URLs given without a scheme
fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    }
}

fn read_html(file: Option<&PathBuf>) -> anyhow::Result<String> {
    let html = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read standard input")?;
            buf
        }
    };
    if html.trim().is_empty() {
        bail!("No HTML source provided");
    }
    Ok(html)
}

async fn scan(args: ScanArgs) -> anyhow::Result<()> {
    let input = match args.url {
        Some(ref url) if !url.trim().is_empty() => ScanInput::Url(normalize_url(url)),
        Some(_) => bail!("Please provide a URL"),
        None => ScanInput::Html(read_html(args.html.as_ref())?),
    };
    let search = args
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut config = BrowserConfig::default()
        .headless(!args.visible)
        .disable_web_security(args.disable_web_security)
        .driver(args.driver.into());
    if let Some(ref base) = args.base_url {
        let base = Url::parse(base).with_context(|| format!("Invalid base URL: {}", base))?;
        config = config.base_url(base);
    }
    if let Some(settle) = args.settle {
        config = config.settle_delay(settle);
    }
    if let Some(timeout) = args.timeout {
        config = config.timeout(timeout);
    }
    if let Some(ref endpoint) = args.webdriver_url {
        config = config.webdriver_url(endpoint.clone());
    }

    let report = run_scan(config, ScanOptions::default(), &input, search, EventSink::none())
        .await
        .context("Scan failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", render(&report));

    if let (ScanInput::Html(html), Some(text)) = (&input, search) {
        println!("\nStatic frame matches (attributes and srcdoc only):");
        print_locators(&find_frame_locators(html, text)?);
    }

    println!("\n{}", completion_summary(&report, search));
    Ok(())
}

fn markup(args: MarkupArgs) -> anyhow::Result<()> {
    let html = read_html(args.html.as_ref())?;
    let locators = find_frame_locators(&html, &args.search)?;
    print_locators(&locators);
    Ok(())
}

fn print_locators(locators: &[String]) {
    if locators.is_empty() {
        println!("   None found in iframe attributes/srcdoc.");
    }
    for (i, locator) in locators.iter().enumerate() {
        println!("   {}. {}", i + 1, locator);
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = ServerConfig {
        bind: args.bind,
        session_ttl: Duration::from_secs(args.session_ttl),
        browser: BrowserConfig::default().disable_web_security(args.disable_web_security),
        ..Default::default()
    };
    println!("Serving on http://{}", config.bind);
    kehys::serve(config).await.context("Server failed")?;
    Ok(())
}
