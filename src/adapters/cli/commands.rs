//! CLI Command Handlers
//!
//! Implementation of all CLI commands for alpha-watch.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapters::alpha::AlphaClient;
use crate::adapters::http::HttpFetcher;
use crate::application::{PipelineConfig, SnapshotPipeline, SnapshotWatcher};
use crate::config::{load_config, load_config_or_default, Config};
use crate::domain::row::EnrichedRow;
use crate::domain::snapshot::Snapshot;

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/alpha-watch.toml";

/// alpha-watch - Alpha Market Volatility Snapshots
#[derive(Parser, Debug)]
#[command(
    name = "alpha-watch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Volatility snapshots of the alpha token market",
    long_about = "alpha-watch pulls the alpha token list and exchange listing, measures \
                  the intraday range of every trading USDT pair and writes a ranked JSON \
                  snapshot for the dashboard."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build one snapshot and exit
    Run(RunCmd),

    /// Rebuild the snapshot on an interval until Ctrl+C
    Watch(WatchCmd),

    /// Print the top rows of the current snapshot
    Show(ShowCmd),
}

impl Command {
    fn target(&self) -> &TargetArgs {
        match self {
            Command::Run(cmd) => &cmd.target,
            Command::Watch(cmd) => &cmd.target,
            Command::Show(cmd) => &cmd.target,
        }
    }
}

/// Config and output location shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct TargetArgs {
    /// Path to configuration file [default: config/alpha-watch.toml]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override snapshot output directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl TargetArgs {
    /// Load the config. Only the default path may be absent.
    pub fn load(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => load_config_or_default(DEFAULT_CONFIG_PATH)
                .context("Failed to load configuration")?,
        };

        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.display().to_string();
        }
        Ok(config)
    }

    /// Snapshot path; `--output-dir` wins over the environment and the file
    pub fn snapshot_path(&self, config: &Config) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(&config.output.file_name),
            None => config.output.snapshot_path(),
        }
    }
}

/// Build one snapshot
#[derive(Parser, Debug)]
pub struct RunCmd {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Rebuild the snapshot on an interval
#[derive(Parser, Debug)]
pub struct WatchCmd {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Seconds between runs
    #[arg(long, value_name = "SECS", default_value = "900")]
    pub interval_secs: u64,
}

/// Print the current snapshot
#[derive(Parser, Debug)]
pub struct ShowCmd {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Number of rows to print (defaults to the snapshot's top list)
    #[arg(short, long, value_name = "N")]
    pub top: Option<usize>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = app.command.target().load()?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Watch(cmd) => watch_command(cmd, config).await,
        Command::Show(cmd) => show_command(cmd, config),
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn build_pipeline(config: &Config) -> Result<SnapshotPipeline<AlphaClient>> {
    let fetcher = HttpFetcher::with_config(config.api.http_config())
        .context("Failed to create HTTP client")?;
    let client = AlphaClient::new(config.api.endpoints(), fetcher);
    Ok(SnapshotPipeline::new(client, PipelineConfig::from(config)))
}

/// Handle run command
async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    let path = cmd.target.snapshot_path(&config);
    tracing::info!("Building snapshot -> {}", path.display());

    let pipeline = build_pipeline(&config)?;
    let report = pipeline.run(&path).await.context("Snapshot run failed")?;

    println!("Updated {} ({})", path.display(), report.summary);
    Ok(())
}

/// Handle watch command
async fn watch_command(cmd: WatchCmd, config: Config) -> Result<()> {
    if cmd.interval_secs == 0 {
        anyhow::bail!("--interval-secs must be > 0");
    }

    let path = cmd.target.snapshot_path(&config);
    let watcher = SnapshotWatcher::new(build_pipeline(&config)?, path)
        .with_interval(Duration::from_secs(cmd.interval_secs));

    // Setup Ctrl+C handler
    let handle = watcher.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.stop().await;
    });

    watcher.run().await;

    let status = watcher.status().await;
    println!("Stopped after {} runs ({} failed)", status.runs, status.failures);
    Ok(())
}

/// Handle show command
fn show_command(cmd: ShowCmd, config: Config) -> Result<()> {
    let path = cmd.target.snapshot_path(&config);
    let snapshot = load_snapshot(&path)?;

    let rows: &[EnrichedRow] = match cmd.top {
        Some(n) => &snapshot.rows[..n.min(snapshot.rows.len())],
        None => snapshot.top(),
    };

    println!(
        "{} - {} rows, updated {}",
        path.display(),
        snapshot.rows.len(),
        snapshot.updated_at.to_rfc3339()
    );
    print!("{}", render_table(rows));
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    Snapshot::load(path).map_err(|e| anyhow::anyhow!("load failed: {}", e))
}

/// Render rows as a fixed-width text table
pub fn render_table(rows: &[EnrichedRow]) -> String {
    let mut out = format!(
        "{:>3}  {:<16} {:<10} {:>10} {:>9} {:<9} {:>16} {:>6}\n",
        "#", "PAIR", "SYMBOL", "VOL %", "CHG %", "STABILITY", "QUOTE VOL", "DAYS"
    );
    for (i, row) in rows.iter().enumerate() {
        let days = row
            .listed_days
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let marker = if row.recent_on_target_chain { "*" } else { "" };
        out.push_str(&format!(
            "{:>3}  {:<16} {:<10} {:>10.2} {:>9.2} {:<9} {:>16.0} {:>6}{}\n",
            i + 1,
            row.pair,
            row.short_symbol,
            row.volatility * 100.0,
            row.price_change_percent,
            row.stability.as_str(),
            row.quote_volume,
            days,
            marker
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::StabilityLabel;
    use tempfile::TempDir;

    fn row(pair: &str, volatility: f64) -> EnrichedRow {
        EnrichedRow {
            pair: pair.to_string(),
            display_name: pair.to_string(),
            short_symbol: pair.trim_end_matches("USDT").to_string(),
            chain_id: "56".to_string(),
            contract_address: String::new(),
            price_change_percent: -1.5,
            quote_volume: 60_000_000.0,
            open_price: 1.0,
            high_price: 1.0 + volatility,
            low_price: 1.0,
            volatility,
            stability: StabilityLabel::classify(volatility),
            listed_days: Some(10),
            recent_on_target_chain: true,
        }
    }

    #[test]
    fn test_parse_run_defaults() {
        let app = CliApp::try_parse_from(["alpha-watch", "run"]).unwrap();
        assert!(!app.verbose);
        match app.command {
            Command::Run(cmd) => {
                assert!(cmd.target.config.is_none());
                assert!(cmd.target.output_dir.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_watch_interval() {
        let app = CliApp::try_parse_from([
            "alpha-watch",
            "--debug",
            "watch",
            "--interval-secs",
            "60",
            "--output-dir",
            "/tmp/out",
        ])
        .unwrap();
        assert!(app.debug);
        match app.command {
            Command::Watch(cmd) => {
                assert_eq!(cmd.interval_secs, 60);
                assert_eq!(cmd.target.output_dir, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_watch_default_interval() {
        let app = CliApp::try_parse_from(["alpha-watch", "watch"]).unwrap();
        assert!(matches!(app.command, Command::Watch(WatchCmd { interval_secs: 900, .. })));
    }

    #[test]
    fn test_parse_show_top() {
        let app = CliApp::try_parse_from(["alpha-watch", "show", "--top", "3"]).unwrap();
        assert!(matches!(app.command, Command::Show(ShowCmd { top: Some(3), .. })));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let target = TargetArgs {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            output_dir: None,
        };
        assert!(target.load().is_err());
    }

    #[test]
    fn test_output_dir_flag_wins() {
        let target = TargetArgs {
            config: None,
            output_dir: Some(PathBuf::from("/srv/site")),
        };
        let config = Config::default();
        assert_eq!(target.snapshot_path(&config), PathBuf::from("/srv/site/data.json"));
    }

    #[test]
    fn test_load_snapshot_missing_reports_load_failed() {
        let dir = TempDir::new().unwrap();
        let err = load_snapshot(&dir.path().join("data.json")).unwrap_err();
        assert!(err.to_string().starts_with("load failed"));
    }

    #[test]
    fn test_load_snapshot_corrupt_reports_load_failed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_snapshot(&path).unwrap_err();
        assert!(err.to_string().starts_with("load failed"));
    }

    #[test]
    fn test_render_table() {
        let table = render_table(&[row("FOOUSDT", 0.2), row("BARUSDT", 0.01)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("PAIR"));
        assert!(lines[1].contains("FOOUSDT"));
        assert!(lines[1].contains("20.00"));
        assert!(lines[1].contains("poor"));
        assert!(lines[1].ends_with('*'));
        assert!(lines[2].contains("stable"));
    }
}
