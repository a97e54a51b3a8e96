// ABOUTME: Diagnostic CLI for the link metadata pipeline.
// ABOUTME: Resolves URLs (or a local HTML file) and prints the resulting metadata records as JSON.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser as ClapParser;
use linkcard::{LinkMetadata, MetadataService, Parser};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "linkcard")]
#[command(about = "Resolve link card metadata for URLs")]
struct Args {
    /// Per-attempt request timeout in milliseconds
    #[arg(long = "timeout-ms", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Retries after the first failed attempt
    #[arg(long = "retries", default_value_t = 2)]
    retries: u32,

    /// Delay between attempts in milliseconds
    #[arg(long = "retry-delay-ms", default_value_t = 1_000)]
    retry_delay_ms: u64,

    /// Skip the metadata cache
    #[arg(long = "no-cache")]
    no_cache: bool,

    /// HTML file to parse (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL context for HTML file parsing (required with --html)
    #[arg(long = "url")]
    url: Option<String>,

    /// URLs to resolve
    #[arg()]
    urls: Vec<String>,
}

fn format_output(results: &[LinkMetadata]) -> serde_json::Result<String> {
    if results.len() == 1 {
        serde_json::to_string_pretty(&results[0])
    } else {
        serde_json::to_string_pretty(results)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.html.is_some() && args.url.is_none() {
        eprintln!("error: --url is required when using --html");
        return ExitCode::from(1);
    }

    if args.html.is_none() && args.urls.is_empty() {
        eprintln!("error: at least one URL is required, or use --html with --url");
        return ExitCode::from(1);
    }

    if args.html.is_some() && !args.urls.is_empty() {
        eprintln!("error: cannot use both --html and positional URLs");
        return ExitCode::from(1);
    }

    let mut results: Vec<LinkMetadata> = Vec::new();
    let mut had_error = false;

    if let (Some(html_path), Some(url)) = (&args.html, &args.url) {
        match fs::read_to_string(html_path) {
            Ok(html) => match Parser::new().parse(url, &html) {
                Ok(meta) => results.push(meta),
                Err(e) => {
                    eprintln!("error parsing HTML: {}", e);
                    had_error = true;
                }
            },
            Err(e) => {
                eprintln!("error reading file {:?}: {}", html_path, e);
                had_error = true;
            }
        }
    } else {
        let service = MetadataService::builder()
            .enable_cache(!args.no_cache)
            .timeout(Duration::from_millis(args.timeout_ms))
            .max_retries(args.retries)
            .retry_delay(Duration::from_millis(args.retry_delay_ms))
            .build();

        for url in &args.urls {
            match service.get_metadata(url).await {
                Ok(meta) => results.push(meta),
                Err(e) => {
                    eprintln!("error resolving {}: {}", url, e);
                    had_error = true;
                }
            }
        }
    }

    if !results.is_empty() {
        match format_output(&results) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("error encoding output: {}", e);
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
