use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tokio::sync::mpsc;
use tracing::{debug, info};

use procpulse::config::{Config, load_config, load_config_from_path};
use procpulse::format::render_report;
use procpulse::logging;
use procpulse::snoop;
use procpulse::snoop::client::PeerCollector;
use procpulse::snoop::{SnoopCommand, SnoopReply};
use procpulse::system::collector::Collector;
use procpulse::system::reconcile::reconcile;
use procpulse::system::snapshot::SnapshotPair;

#[derive(Parser)]
#[command(
    name = "procpulse",
    about = "Lightweight /proc process monitor with two-snapshot reconciliation"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Polling interval in milliseconds
    #[arg(long)]
    interval: Option<u64>,

    /// Minimum CPU utilization (0.0-1.0) a process must reach to be reported
    #[arg(long)]
    threshold: Option<f32>,

    /// Maximum number of tracked processes
    #[arg(long)]
    max_processes: Option<usize>,

    /// Serve the snoop protocol on this address (e.g. 127.0.0.1:7070)
    #[arg(long)]
    listen: Option<String>,

    /// Snoop peer to collect from instead of monitoring locally (repeatable)
    #[arg(long)]
    peer: Vec<String>,

    /// Number of polling cycles to run before exiting; 0 runs forever
    #[arg(long, default_value_t = 0)]
    cycles: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init();

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    if !config.snoop.peers.is_empty() {
        return run_peer_collector(&config, cli.cycles).await;
    }
    run_monitor(&config, cli.cycles).await
}

/// The polling loop. Each cycle runs to completion (build, reconcile,
/// filter, report, rotate) before anything else is serviced; snoop
/// requests are answered only between cycles.
async fn run_monitor(config: &Config, max_cycles: u64) -> Result<()> {
    let collector = Collector::new();
    let mut pair = SnapshotPair::with_capacity(config.general.max_processes);

    let (snoop_tx, mut snoop_rx) = mpsc::channel(16);
    if let Some(listen) = &config.snoop.listen {
        let addr = listen
            .parse()
            .map_err(|err| eyre!("invalid snoop listen address {listen}: {err}"))?;
        snoop::server::start(addr, snoop_tx.clone()).await?;
    }
    // Without a listener the channel closes here and its branch stays idle.
    drop(snoop_tx);

    let mut interval = tokio::time::interval(Duration::from_millis(config.general.poll_interval_ms));
    let mut completed = 0u64;
    let mut last_report_entries = 0u32;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                last_report_entries = run_cycle(&collector, &mut pair, config)?;
                completed += 1;
                if max_cycles > 0 && completed >= max_cycles {
                    break;
                }
            }
            Some(msg) = snoop_rx.recv() => {
                let reply = match msg.command {
                    SnoopCommand::ResetStatistics => {
                        pair.reset();
                        info!("statistics reset on snoop request");
                        SnoopReply::ok(0)
                    }
                    SnoopCommand::SamplePerformance => SnoopReply::ok(last_report_entries),
                };
                let _ = msg.reply_tx.send(reply);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// One cycle: build the current snapshot, reconcile it against the
/// baseline, report, then rotate. Returns the number of reported entries.
/// The first cycle (and the one after a reset) has no baseline and emits
/// no report.
fn run_cycle(collector: &Collector, pair: &mut SnapshotPair, config: &Config) -> Result<u32> {
    collector.sample_into(pair.current_mut())?;

    let (current, previous) = pair.slots_mut();
    reconcile(current, previous);

    let entry_count = if pair.is_primed() {
        let filtered = pair.current().filter_by_cpu(config.general.cpu_threshold);
        print!("{}", render_report(&filtered, config.general.max_report_rows));
        filtered.len() as u32
    } else {
        debug!("no baseline yet, skipping report");
        0
    };

    pair.rotate();
    Ok(entry_count)
}

/// Remote-collection mode: snoop the configured peers each interval
/// instead of sampling the local process table.
async fn run_peer_collector(config: &Config, max_cycles: u64) -> Result<()> {
    let mut peers = PeerCollector::connect(&config.snoop.peers).await?;

    let mut interval = tokio::time::interval(Duration::from_millis(config.general.poll_interval_ms));
    let mut completed = 0u64;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                for sample in peers.collect().await? {
                    info!(addr = %sample.addr, entries = sample.entry_count, "peer sample");
                }
                completed += 1;
                if max_cycles > 0 && completed >= max_cycles {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    peers.shutdown().await;
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(interval) = cli.interval {
        config.general.poll_interval_ms = interval;
    }
    if let Some(threshold) = cli.threshold {
        config.general.cpu_threshold = threshold;
    }
    if let Some(max) = cli.max_processes {
        config.general.max_processes = max;
    }
    if let Some(ref listen) = cli.listen {
        config.snoop.listen = Some(listen.clone());
    }
    if !cli.peer.is_empty() {
        config.snoop.peers = cli.peer.clone();
    }

    config
}
