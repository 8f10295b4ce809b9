use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use harvester::extract::{self, ExtractConfig, Extractor};
use harvester::{ConsoleProgressReporter, DownloadConfig, Downloader, IntoProgressCallback};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "harvester")]
#[command(version)]
#[command(about = "Batch-download images and videos from CDN URLs", long_about = None)]
struct Cli {
    /// Debug logging and per-transfer progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download media URLs in batches and write a JSON report
    Download {
        urls: Vec<String>,

        /// File with one URL per line; `#` comments and blank lines are skipped
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        options: DownloadArgs,
    },

    /// Collect `src` attributes under a CSS selector from rendered pages
    Scrape {
        #[arg(short, long)]
        selector: String,

        pages: Vec<String>,

        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Wait after each page load before reading the DOM
        #[arg(long)]
        settle_ms: Option<u64>,

        /// Write the extraction results as JSON instead of printing sources
        #[arg(long)]
        out: Option<PathBuf>,

        /// Feed the collected sources into the downloader
        #[arg(long)]
        download: bool,

        #[command(flatten)]
        options: DownloadArgs,
    },
}

#[derive(Args)]
struct DownloadArgs {
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    batch_delay_ms: Option<u64>,

    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Reject payloads smaller than this many bytes
    #[arg(long)]
    min_size: Option<u64>,

    /// Skip the HEAD check before each download
    #[arg(long)]
    no_validate: bool,

    #[arg(long)]
    referer: Option<String>,

    /// Report file name inside the output directory
    #[arg(long)]
    report: Option<String>,
}

impl DownloadArgs {
    /// Environment (and `.env`) first, then flags on top
    fn to_config(&self) -> Result<DownloadConfig> {
        let mut config = DownloadConfig::from_env().context("Failed to read HARVESTER_* settings")?;

        if let Some(ref dir) = self.output {
            config.output_dir = dir.clone();
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if let Some(ms) = self.batch_delay_ms {
            config.batch_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = self.min_size {
            config.min_file_size = bytes;
        }
        if self.no_validate {
            config.validate_urls = false;
        }
        if let Some(ref referer) = self.referer {
            config.referer = Some(referer.clone());
        }
        if let Some(ref name) = self.report {
            config.report_name = Some(name.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Positional URLs followed by the ones listed in `input`
fn gather_urls(mut urls: Vec<String>, input: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = input {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL list {}", path.display()))?;
        urls.extend(parse_url_list(&contents));
    }
    if urls.is_empty() {
        bail!("No URLs given; pass them as arguments or with --input");
    }
    Ok(urls)
}

fn parse_url_list(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

async fn download(urls: &[String], config: DownloadConfig, verbose: bool) -> Result<()> {
    let downloader = Downloader::new(config)?;
    let progress = ConsoleProgressReporter::new(verbose).into_callback();

    info!(
        "Downloading {} URL(s) into {}",
        urls.len(),
        downloader.config().output_dir.display()
    );
    let (report, path) = downloader
        .run(urls, Some(progress))
        .await
        .context("Download run aborted")?;

    let summary = &report.summary;
    println!(
        "✅ {}/{} downloaded ({} failed, {} bytes, {:.1}% success) in {:.1}s",
        summary.successful,
        summary.total,
        summary.failed,
        summary.total_bytes,
        summary.success_rate() * 100.0,
        summary.duration_ms as f64 / 1000.0
    );
    for result in report.results.iter().filter(|r| !r.is_success()) {
        println!("  ❌ #{} {}: {}", result.index, result.url, result.error().unwrap_or_default());
    }
    println!("📄 Report: {}", path.display());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Download { urls, input, options } => {
            let urls = gather_urls(urls, input.as_deref())?;
            let config = options.to_config()?;
            download(&urls, config, cli.verbose).await?;
        }
        Commands::Scrape {
            selector,
            pages,
            input,
            settle_ms,
            out,
            download: then_download,
            options,
        } => {
            let pages = gather_urls(pages, input.as_deref())?;
            let config = options.to_config()?;

            let mut extract_config = ExtractConfig {
                timeout: config.timeout,
                user_agent: config.user_agent.clone(),
                ..ExtractConfig::default()
            };
            if let Some(ms) = settle_ms {
                extract_config.settle_delay = Duration::from_millis(ms);
            }

            let extractor = Extractor::new(extract_config)?;
            let results = extractor
                .extract_all(&pages, &selector)
                .await
                .context("Extraction aborted")?;

            let failed = results.iter().filter(|page| !page.is_success()).count();
            if failed > 0 {
                warn!("{} of {} page(s) could not be read", failed, results.len());
            }

            let sources = extract::unique_sources(&results);
            match out {
                Some(ref path) => {
                    let dir = match path.parent() {
                        Some(parent) if !parent.as_os_str().is_empty() => parent,
                        _ => Path::new("."),
                    };
                    let name = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .context("--out must name a file")?;
                    let written = extract::write_extractions(&results, dir, name).await?;
                    println!("📄 {} source(s) written to {}", sources.len(), written.display());
                }
                None => {
                    for source in &sources {
                        println!("{}", source);
                    }
                }
            }

            if then_download {
                if sources.is_empty() {
                    warn!("Nothing to download");
                } else {
                    download(&sources, config, cli.verbose).await?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_list_skips_comments_and_blanks() {
        let list = "# exported 2026-03-01\nhttps://cdn.example.com/a.jpg\n\n   \n  https://cdn.example.com/b.mp4  \n#https://cdn.example.com/skip.jpg\n";
        let urls: Vec<String> = parse_url_list(list).collect();
        assert_eq!(urls, vec!["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.mp4"]);
    }

    #[test]
    fn test_no_urls_is_an_error() {
        assert!(gather_urls(Vec::new(), None).is_err());
    }

    #[test]
    fn test_cli_parses_scrape() {
        let cli = Cli::try_parse_from([
            "harvester",
            "scrape",
            "--selector",
            "article img",
            "https://site.example.com/p/1",
            "--download",
            "--batch-size",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Scrape { selector, pages, download, options, .. } => {
                assert_eq!(selector, "article img");
                assert_eq!(pages, vec!["https://site.example.com/p/1"]);
                assert!(download);
                assert_eq!(options.batch_size, Some(3));
            }
            _ => panic!("Expected scrape command"),
        }
    }
}
