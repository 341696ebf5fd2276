use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use vlr_pipeline::config::DelayPolicy;
use vlr_pipeline::{CsvSink, HttpSessionFactory, MatchOrchestrator, PipelineConfig, TeamEntry, TeamRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape completed vlr.gg matches into per-team CSV files")]
struct Cli {
    /// Teams from the built-in VCT partner list (all of them when omitted)
    #[arg(value_name = "TEAM")]
    teams: Vec<String>,

    /// Extra team given as NAME=ID, e.g. "Team Liquid=474"
    #[arg(long = "team", value_name = "NAME=ID", value_parser = parse_team)]
    custom: Vec<TeamEntry>,

    /// Completed matches to collect per team
    #[arg(short, long, default_value_t = 50)]
    matches: usize,

    /// Concurrent page sessions
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Output directory
    #[arg(short, long, default_value = "data/raw/vlr_data")]
    output: PathBuf,

    /// Upper bound in seconds for a page load or interaction
    #[arg(long, default_value_t = 30)]
    page_timeout: u64,

    /// Skip the randomized pauses between requests
    #[arg(long)]
    no_delay: bool,
}

fn parse_team(raw: &str) -> Result<TeamEntry, String> {
    let (name, id) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=ID, got {raw:?}"))?;
    let id = id
        .trim()
        .parse()
        .map_err(|e| format!("invalid team id {id:?}: {e}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("team name is empty".to_string());
    }
    Ok(TeamEntry::new(id, name))
}

fn select_teams(cli: &Cli, registry: &TeamRegistry) -> Vec<TeamEntry> {
    let mut teams = if cli.teams.is_empty() && !cli.custom.is_empty() {
        vec![]
    } else if cli.teams.is_empty() {
        registry.entries()
    } else {
        cli.teams
            .iter()
            .filter_map(|name| {
                let team = registry.get(name);
                if team.is_none() {
                    warn!(team = %name, "unknown team, skipping");
                }
                team
            })
            .collect()
    };
    teams.extend(cli.custom.iter().cloned());
    teams
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let teams = select_teams(&cli, &TeamRegistry::vct_partners());
    if teams.is_empty() {
        error!("no teams to scrape");
        return ExitCode::FAILURE;
    }

    let config = PipelineConfig {
        matches_per_team: cli.matches,
        workers: cli.workers,
        page_timeout: Duration::from_secs(cli.page_timeout),
        delays: if cli.no_delay {
            DelayPolicy::none()
        } else {
            DelayPolicy::default()
        },
        output_dir: cli.output.clone(),
        ..PipelineConfig::default()
    };

    let factory = match HttpSessionFactory::new(&config) {
        Ok(factory) => factory,
        Err(e) => {
            error!(error = %e, "could not build http client");
            return ExitCode::FAILURE;
        }
    };

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing current work and stopping");
            let _ = cancel_tx.send(true);
        }
    });

    info!(teams = teams.len(), output = %config.output_dir.display(), "starting vlr.gg scrape");
    let sink = CsvSink::new(&config.output_dir);
    let summary = MatchOrchestrator::new(factory, sink, config)
        .with_cancellation(cancel_rx)
        .run(teams)
        .await;

    for failure in &summary.failed {
        warn!(team = %failure.team, reason = %failure.reason, "team failed");
    }
    info!(
        teams = summary.total(),
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        cancelled = summary.cancelled.len(),
        "done"
    );

    if summary.all_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
