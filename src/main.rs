//! Veil crawler main entry point
//!
//! This is the command-line interface for the Veil web crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use veil_crawler::config::{load_config_with_hash, validate, Config};
use veil_crawler::crawler::crawl;
use veil_crawler::output::{print_summary, LogSink};

/// Veil: a depth-bounded, policy-aware web crawler
///
/// Veil crawls from a set of seed addresses, follows links up to a maximum
/// depth, honors robots.txt, visits every address at most once, and rotates
/// its User-Agent and proxy egress on every request.
#[derive(Parser, Debug)]
#[command(name = "veil-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A depth-bounded, policy-aware web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed addresses, added to those from the configuration file
    #[arg(value_name = "SEEDS")]
    seeds: Vec<String>,

    /// Maximum link depth from a seed
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum number of concurrent expansions
    #[arg(long, value_name = "N")]
    max_in_flight: Option<u32>,

    /// Proxy endpoint (scheme://[user:pass@]host:port); may be repeated
    #[arg(long = "proxy", value_name = "URL")]
    proxies: Vec<String>,

    /// Address used to check that a proxy forwards traffic
    #[arg(long, value_name = "URL")]
    proxy_test_target: Option<String>,

    /// Never fetch directly when no validated proxy is available
    #[arg(long)]
    require_proxy: bool,

    /// Validate the configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of `config`
    fn merge_into(&self, config: &mut Config) {
        config.seeds.extend(self.seeds.iter().cloned());

        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        if let Some(max_in_flight) = self.max_in_flight {
            config.crawler.max_in_flight = max_in_flight;
        }

        config.proxy.endpoints.extend(self.proxies.iter().cloned());

        if let Some(target) = &self.proxy_test_target {
            config.proxy.test_target = target.clone();
        }
        if self.require_proxy {
            config.proxy.require_proxy = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.merge_into(&mut config);
    validate(&config).context("invalid configuration after applying command-line options")?;

    if config.seeds.is_empty() {
        bail!("no seed addresses given (pass them as arguments or set `seeds` in the config file)");
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("veil_crawler=info,warn"),
            1 => EnvFilter::new("veil_crawler=debug,info"),
            2 => EnvFilter::new("veil_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Veil Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max in flight: {}", config.crawler.max_in_flight);
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!(
        "  Delay between fetches: {}-{}ms",
        config.crawler.min_delay_ms, config.crawler.max_delay_ms
    );

    println!("\nIdentity:");
    println!("  Policy token: {}", config.identity.policy_token);
    match &config.identity.user_agents {
        Some(agents) => println!("  User agents: {} configured", agents.len()),
        None => println!("  User agents: built-in pool"),
    }

    println!("\nProxies ({}):", config.proxy.endpoints.len());
    for endpoint in &config.proxy.endpoints {
        println!("  - {}", endpoint);
    }
    println!("  Test target: {}", config.proxy.test_target);
    println!("  Require proxy: {}", config.proxy.require_proxy);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.seeds.len()
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Seeds: {}, proxies: {}",
        config.seeds.len(),
        config.proxy.endpoints.len()
    );

    let summary = crawl(config, &LogSink).await.context("crawl setup failed")?;

    println!();
    print_summary(&summary);

    Ok(())
}
