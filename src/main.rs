use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use twitch_scout::config::{ScoutConfig, DEFAULT_DATA_DIR};
use twitch_scout::scrapers::{CategoryCrawlPass, CrawlPass, PassReport, StreamCrawlPass};
use twitch_scout::session::{ChromeSession, PageSession, StaticPage};

#[derive(Parser, Debug)]
#[command(name = "twitch-scout", about = "Snapshot Twitch categories and live streams to CSV")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the history and snapshot CSV files
    #[arg(long, env = "SCOUT_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Show the browser window
    #[arg(long, env = "SCOUT_HEADED")]
    headed: bool,

    /// Scroll budget on the directory page
    #[arg(long, env = "SCOUT_MAX_SCROLL_ATTEMPTS", default_value_t = 40)]
    max_scroll_attempts: u32,

    /// Seconds to let new cards load after each directory scroll
    #[arg(long, env = "SCOUT_SCROLL_SETTLE_SECS", default_value_t = 6)]
    scroll_settle_secs: u64,

    /// Scroll steps on each category page before extracting streams
    #[arg(long, env = "SCOUT_STREAM_SCROLL_STEPS", default_value_t = 0)]
    stream_scroll_steps: u32,

    /// Seconds to wait for the first item of a page to appear
    #[arg(long, env = "SCOUT_WAIT_TIMEOUT_SECS", default_value_t = 10)]
    wait_timeout_secs: u64,

    /// Save the rendered HTML of every scraped page here
    #[arg(long, env = "SCOUT_CAPTURE_DIR")]
    capture_dir: Option<PathBuf>,

    /// Replay pages saved with --capture-dir instead of launching Chrome
    #[arg(long, env = "SCOUT_REPLAY_DIR")]
    replay_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq)]
enum Command {
    /// Scrape the category directory
    Categories,
    /// Scrape streams for every category in the last category snapshot
    Streams,
    /// Categories, then streams
    All,
}

impl Cli {
    fn config(&self) -> ScoutConfig {
        let mut config = ScoutConfig::with_data_dir(&self.data_dir);
        config.category_scroll.max_attempts = self.max_scroll_attempts;
        config.category_scroll.settle_delay = Duration::from_secs(self.scroll_settle_secs);
        config.stream_scroll.steps = self.stream_scroll_steps;
        config.wait_timeout = Duration::from_secs(self.wait_timeout_secs);
        config.capture_dir = self.capture_dir.clone();
        config
    }
}

fn run_passes<S: PageSession>(
    command: Command,
    config: &ScoutConfig,
    session: &mut S,
) -> anyhow::Result<Vec<(&'static str, PassReport)>> {
    let mut reports = Vec::new();

    if matches!(command, Command::Categories | Command::All) {
        let pass = CategoryCrawlPass::new(config.clone());
        reports.push((pass.name(), pass.run(session)?));
    }

    if matches!(command, Command::Streams | Command::All) {
        let pass = StreamCrawlPass::new(config.clone());
        reports.push((pass.name(), pass.run(session)?));
    }

    Ok(reports)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    info!("📺 Twitch Scout");
    info!("==============");

    let config = cli.config();
    tokio::fs::create_dir_all(&cli.data_dir)
        .await
        .with_context(|| format!("Failed to create {}", cli.data_dir.display()))?;

    let command = cli.command;
    let replay_dir = cli.replay_dir.clone();
    let headless = !cli.headed;

    // The browser session is blocking; keep all of it on one thread.
    let result = tokio::task::spawn_blocking(move || match replay_dir {
        Some(dir) => {
            info!("Replaying captured pages from {}", dir.display());
            run_passes(command, &config, &mut StaticPage::from_capture_dir(dir))
        }
        None => {
            let mut session = ChromeSession::launch(headless)?;
            run_passes(command, &config, &mut session)
        }
    })
    .await
    .context("Scrape task panicked")?;

    match result {
        Ok(reports) => {
            for (pass, report) in reports {
                info!(
                    "{}: {} records written, {}/{} pages failed",
                    pass, report.records_written, report.pages_failed, report.pages_visited
                );
            }
            Ok(())
        }
        Err(e) => {
            error!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}
