use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{LayoutOffsets, PipelineConfig, TeamEntry};
use crate::error::{Result, VlrError};
use crate::extract::{discover_matches, extract_map_results, extract_player_ratings, normalize_page_text};
use crate::model::{MapResult, MatchSummary, PlayerRating};
use crate::pipeline::sink::{OutputSink, TeamOutput};
use crate::session::{PageSession, SessionFactory, TimedSession};

/// A team whose run ended in an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamFailure {
    pub team: String,
    pub reason: String,
}

/// Per-team tally of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<TeamFailure>,
    /// Teams abandoned because the run was cancelled.
    pub cancelled: Vec<String>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.cancelled.len()
    }

    /// True when teams were attempted and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

/// Fetch one match page and derive its player and map records from that single load.
pub async fn scrape_match<S: PageSession>(
    session: &mut S,
    summary: &MatchSummary,
    layout: &LayoutOffsets,
) -> Result<(Vec<PlayerRating>, Vec<MapResult>)> {
    session.open(&summary.match_url).await?;
    let body = session.body_text()?;
    let text = normalize_page_text(&body);
    let players = extract_player_ratings(&text, summary.match_number, &summary.match_url, layout);
    let maps = extract_map_results(session, &summary.context()).await;
    Ok((players, maps))
}

/// Discover a team's matches and scrape each of them.
///
/// Match pages that fail to load are skipped; their summaries are kept.
/// Returns [`VlrError::Cancelled`] when `cancel` flips before the team is done.
#[instrument(skip_all, fields(team = %team.name))]
pub async fn scrape_team<S: PageSession>(
    session: &mut S,
    team: &TeamEntry,
    config: &PipelineConfig,
    cancel: &mut watch::Receiver<bool>,
) -> Result<TeamOutput> {
    let mut output = TeamOutput::empty(team.clone());
    output.matches = discover_matches(session, team, config).await;
    if output.matches.is_empty() {
        info!("no matches found");
        return Ok(output);
    }

    let total = output.matches.len();
    for summary in &output.matches {
        if is_cancelled(cancel) {
            return Err(VlrError::Cancelled);
        }
        match scrape_match(session, summary, &config.layout).await {
            Ok((players, maps)) => {
                info!(
                    match_number = summary.match_number,
                    total,
                    players = players.len(),
                    maps = maps.len(),
                    "scraped match"
                );
                output.players.extend(players);
                output.maps.extend(maps);
            }
            Err(e) => warn!(url = %summary.match_url, error = %e, "skipping match page"),
        }
        pause(config.delays.match_delay(), cancel).await;
    }
    Ok(output)
}

/// Drives discovery and extraction over a list of teams.
pub struct MatchOrchestrator<F, K> {
    factory: Arc<F>,
    sink: K,
    config: Arc<PipelineConfig>,
    cancel: watch::Receiver<bool>,
}

impl<F, K> MatchOrchestrator<F, K>
where
    F: SessionFactory + 'static,
    K: OutputSink,
{
    pub fn new(factory: F, sink: K, config: PipelineConfig) -> Self {
        let (_, cancel) = watch::channel(false);
        Self {
            factory: Arc::new(factory),
            sink,
            config: Arc::new(config),
            cancel,
        }
    }

    /// Stop the run once `cancel` becomes `true`. Teams already written are kept.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Scrape every team, writing each finished team through the sink.
    ///
    /// Teams are dealt round-robin to `config.workers` workers, each with its
    /// own session. Finished teams come back over a channel and are written
    /// and tallied here, one at a time.
    pub async fn run(&self, teams: Vec<TeamEntry>) -> RunSummary {
        let workers = self.config.workers.clamp(1, teams.len().max(1));
        info!(teams = teams.len(), workers, "starting run");

        let mut buckets: Vec<Vec<TeamEntry>> = vec![vec![]; workers];
        for (i, team) in teams.into_iter().enumerate() {
            buckets[i % workers].push(team);
        }

        let (tx, mut rx) = mpsc::channel(workers);
        let handles: Vec<_> = buckets
            .into_iter()
            .enumerate()
            .map(|(id, teams)| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&self.factory),
                    Arc::clone(&self.config),
                    teams,
                    self.cancel.clone(),
                    tx.clone(),
                ))
            })
            .collect();
        drop(tx);

        let mut summary = RunSummary::default();
        while let Some((team, outcome)) = rx.recv().await {
            match outcome.and_then(|output| self.sink.write_team(&output)) {
                Ok(()) => {
                    info!(team = %team.name, "team finished");
                    summary.succeeded.push(team.name);
                }
                Err(VlrError::Cancelled) => {
                    warn!(team = %team.name, "team abandoned after cancellation");
                    summary.cancelled.push(team.name);
                }
                Err(e) => {
                    error!(team = %team.name, error = %e, "team failed");
                    summary.failed.push(TeamFailure {
                        team: team.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "worker task did not finish cleanly");
            }
        }

        info!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            cancelled = summary.cancelled.len(),
            "run complete"
        );
        summary
    }
}

type TeamReport = (TeamEntry, Result<TeamOutput>);

#[instrument(skip_all, fields(worker = id))]
async fn run_worker<F: SessionFactory>(
    id: usize,
    factory: Arc<F>,
    config: Arc<PipelineConfig>,
    teams: Vec<TeamEntry>,
    mut cancel: watch::Receiver<bool>,
    tx: mpsc::Sender<TeamReport>,
) {
    let mut session = match factory.create() {
        Ok(session) => TimedSession::new(session, config.page_timeout),
        Err(e) => {
            error!(error = %e, "could not create page session");
            let reason = e.to_string();
            for team in teams {
                let _ = tx
                    .send((team, Err(VlrError::SessionUnavailable(reason.clone()))))
                    .await;
            }
            return;
        }
    };

    let last = teams.len().saturating_sub(1);
    for (i, team) in teams.into_iter().enumerate() {
        let outcome = if is_cancelled(&cancel) {
            Err(VlrError::Cancelled)
        } else {
            info!(team = %team.name, id = team.id, "scraping team");
            scrape_team(&mut session, &team, &config, &mut cancel).await
        };
        if tx.send((team, outcome)).await.is_err() {
            debug!("aggregator gone, stopping worker");
            return;
        }
        if i < last && !is_cancelled(&cancel) {
            pause(config.delays.team_delay(), &mut cancel).await;
        }
    }
}

fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow()
}

/// Sleep for `duration`, returning early if the run is cancelled meanwhile.
async fn pause(duration: Duration, cancel: &mut watch::Receiver<bool>) {
    if duration.is_zero() {
        return;
    }
    if cancel.has_changed().is_err() {
        // nobody can cancel any more
        tokio::time::sleep(duration).await;
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = cancel.wait_for(|stop| *stop) => debug!("delay interrupted by cancellation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts() {
        let summary = RunSummary {
            succeeded: vec!["FNATIC".to_string()],
            failed: vec![TeamFailure {
                team: "NRG".to_string(),
                reason: "page load timed out after 30s".to_string(),
            }],
            cancelled: vec![],
        };
        assert_eq!(summary.total(), 2);
        assert!(!summary.all_failed());
        assert!(!RunSummary::default().all_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_ends_early_on_cancel() {
        let (tx, mut rx) = watch::channel(false);
        let started = tokio::time::Instant::now();
        let waiter = tokio::spawn(async move {
            pause(Duration::from_secs(60), &mut rx).await;
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
        waiter.await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_without_canceller_sleeps_fully() {
        let (_, mut rx) = watch::channel(false);
        let started = tokio::time::Instant::now();
        pause(Duration::from_secs(3), &mut rx).await;
        assert!(started.elapsed() >= Duration::from_secs(3));
    }
}
