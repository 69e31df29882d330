//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use docspec_core::{ProgressReporter, run_crawl, run_digest, run_enrich};
use docspec_shared::{AppConfig, default_config_path, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docspec: HTML API documentation to OpenAPI and LLM digests.
#[derive(Parser)]
#[command(
    name = "docspec",
    version,
    about = "Enrich an OpenAPI document from HTML docs, emit LLM digests, crawl raw docs.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./docspec.toml when present).
    #[arg(long, global = true, env = "DOCSPEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enrich the OpenAPI document with fields and examples from the docs site.
    Enrich {
        /// OpenAPI document to rewrite in place.
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Documentation root; each spec path is appended to it.
        #[arg(long)]
        doc_root: Option<String>,

        /// Accept invalid TLS certificates from the docs site.
        #[arg(long)]
        insecure: bool,
    },

    /// Write one JSON digest per endpoint plus the api_info.json index.
    Digest {
        /// OpenAPI document to read.
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Directory for the per-endpoint files.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Index file path.
        #[arg(long)]
        index: Option<PathBuf>,
    },

    /// Crawl the documentation menu into one consolidated HTML file.
    Crawl {
        /// Local table-of-contents HTML file.
        #[arg(long)]
        toc: Option<PathBuf>,

        /// Output HTML file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docspec=info",
        1 => "docspec=debug",
        _ => "docspec=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Enrich {
            spec,
            doc_root,
            insecure,
        } => {
            let mut config = load_config(config_path.as_deref())?;
            if let Some(spec) = spec {
                config.enrich.spec_path = spec;
            }
            if let Some(doc_root) = doc_root {
                config.enrich.doc_root = doc_root;
            }
            if insecure {
                config.http.verify_certificates = false;
            }
            config.validate()?;
            cmd_enrich(&config).await
        }
        Command::Digest {
            spec,
            out_dir,
            index,
        } => {
            let mut config = load_config(config_path.as_deref())?;
            if let Some(spec) = spec {
                config.digest.spec_path = spec;
            }
            if let Some(out_dir) = out_dir {
                config.digest.output_dir = out_dir;
            }
            if let Some(index) = index {
                config.digest.index_path = index;
            }
            cmd_digest(&config)
        }
        Command::Crawl { toc, output } => {
            let mut config = load_config(config_path.as_deref())?;
            if let Some(toc) = toc {
                config.crawl.toc_path = toc;
            }
            if let Some(output) = output {
                config.crawl.output_path = output;
            }
            cmd_crawl(&config).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_enrich(config: &AppConfig) -> Result<()> {
    info!(
        spec = %config.enrich.spec_path.display(),
        doc_root = %config.enrich.doc_root,
        "enriching specification"
    );

    let reporter = CliProgress::new("Fetching");
    let report = run_enrich(config, &reporter).await?;

    println!();
    println!("  Specification enriched.");
    println!("  Paths:    {}", report.paths);
    println!("  Updated:  {} operations", report.operations_updated);
    println!("  Skipped:  {}", report.skipped);
    if report.skipped > 0 {
        println!("  Reasons:  {}", report.skip_reasons);
    }
    println!("  File:     {}", config.enrich.spec_path.display());
    println!();

    Ok(())
}

fn cmd_digest(config: &AppConfig) -> Result<()> {
    info!(spec = %config.digest.spec_path.display(), "generating digests");

    let reporter = CliProgress::new("Writing");
    let report = run_digest(config, &reporter)?;

    println!();
    println!("  Digests written.");
    println!("  Endpoints: {}", report.endpoints);
    println!("  Directory: {}", report.output_dir.display());
    println!("  Index:     {}", report.index_path.display());
    println!();

    Ok(())
}

async fn cmd_crawl(config: &AppConfig) -> Result<()> {
    info!(toc = %config.crawl.toc_path.display(), "crawling documentation");

    let reporter = CliProgress::new("Crawling");
    let report = run_crawl(config, &reporter).await?;

    println!();
    match &report.output_path {
        Some(path) => {
            println!("  Documentation crawled.");
            println!("  Links:   {}", report.links);
            println!("  Written: {}", report.pages_written);
            println!("  Skipped: {}", report.skipped);
            if report.skipped > 0 {
                println!("  Reasons: {}", report.skip_reasons);
            }
            println!("  File:    {}", path.display());
            println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
        }
        None => println!("  No documentation links found; nothing written."),
    }
    println!();

    Ok(())
}

fn cmd_config_init(path: Option<PathBuf>) -> Result<()> {
    let path = init_config(&path.unwrap_or_else(default_config_path))?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<PathBuf>) -> Result<()> {
    let config: AppConfig = load_config(path.as_deref())?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
    verb: &'static str,
}

impl CliProgress {
    fn new(verb: &'static str) -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner, verb }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn unit(&self, label: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("{} [{current}/{total}] {label}", self.verb));
    }

    fn done(&self, summary: &str) {
        self.spinner.finish_and_clear();
        info!(summary, "done");
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_enrich_overrides() {
        let cli = Cli::try_parse_from([
            "docspec",
            "--config",
            "custom.toml",
            "enrich",
            "--spec",
            "api.yaml",
            "--doc-root",
            "https://example.com/docs",
            "--insecure",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Command::Enrich {
                spec,
                doc_root,
                insecure,
            } => {
                assert_eq!(spec, Some(PathBuf::from("api.yaml")));
                assert_eq!(doc_root.as_deref(), Some("https://example.com/docs"));
                assert!(insecure);
            }
            _ => panic!("expected enrich"),
        }
    }

    #[test]
    fn parses_digest_and_crawl_flags() {
        let cli =
            Cli::try_parse_from(["docspec", "-vv", "digest", "--out-dir", "llm", "--index", "i.json"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Digest { out_dir: Some(_), index: Some(_), .. }));

        let cli = Cli::try_parse_from(["docspec", "crawl", "--toc", "QA.html", "--log-format", "json"])
            .unwrap();
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(matches!(cli.command, Command::Crawl { toc: Some(_), output: None }));
    }
}
