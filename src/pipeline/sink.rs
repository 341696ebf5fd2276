use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TeamEntry;
use crate::error::{Result, VlrError};
use crate::model::{MapResult, MatchSummary, PlayerRating};

/// Everything collected for one team.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamOutput {
    pub team: TeamEntry,
    pub matches: Vec<MatchSummary>,
    pub players: Vec<PlayerRating>,
    pub maps: Vec<MapResult>,
}

impl TeamOutput {
    pub fn empty(team: TeamEntry) -> Self {
        Self {
            team,
            matches: vec![],
            players: vec![],
            maps: vec![],
        }
    }
}

/// Receives each team's records once the team is done.
pub trait OutputSink: Send + Sync {
    fn write_team(&self, output: &TeamOutput) -> Result<()>;
}

/// Writes `matches/`, `players/` and `maps/` CSV files under a root directory.
///
/// A team's files are staged next to their targets and only renamed into
/// place once all of them were written, so an interrupted run never leaves a
/// team half-written.
#[derive(Debug, Clone)]
pub struct CsvSink {
    root: PathBuf,
}

impl CsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn matches_path(&self, team: &TeamEntry) -> PathBuf {
        self.file_path("matches", team)
    }

    pub fn players_path(&self, team: &TeamEntry) -> PathBuf {
        self.file_path("players", team)
    }

    pub fn maps_path(&self, team: &TeamEntry) -> PathBuf {
        self.file_path("maps", team)
    }

    fn file_path(&self, kind: &str, team: &TeamEntry) -> PathBuf {
        self.root
            .join(kind)
            .join(format!("{}_{kind}.csv", team.name.to_uppercase()))
    }
}

impl OutputSink for CsvSink {
    fn write_team(&self, output: &TeamOutput) -> Result<()> {
        let mut staged: Vec<(PathBuf, PathBuf)> = vec![];
        let result = (|| {
            stage(&self.matches_path(&output.team), &output.matches, &mut staged)?;
            stage(&self.players_path(&output.team), &output.players, &mut staged)?;
            stage(&self.maps_path(&output.team), &output.maps, &mut staged)
        })();

        if let Err(e) = result {
            discard(&staged);
            return Err(e);
        }

        for (i, (tmp, target)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, target) {
                discard(&staged[i..]);
                let published = staged[..i]
                    .iter()
                    .map(|(_, target)| target.display().to_string())
                    .collect::<Vec<_>>();
                warn!(team = %output.team.name, ?published, "team output only partially written");
                return Err(io_error(target, e));
            }
            debug!(path = %target.display(), "wrote output file");
        }
        info!(
            team = %output.team.name,
            matches = output.matches.len(),
            players = output.players.len(),
            maps = output.maps.len(),
            "saved team output"
        );
        Ok(())
    }
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}

/// Write `records` to a temporary file beside `target`. Empty sets are not written.
fn stage<T: Serialize>(
    target: &Path,
    records: &[T],
    staged: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }
    let tmp = target.with_extension("csv.tmp");
    staged.push((tmp.clone(), target.to_path_buf()));

    let csv_error = |e| VlrError::Csv {
        path: tmp.display().to_string(),
        source: e,
    };
    let mut writer = csv::Writer::from_path(&tmp).map_err(csv_error)?;
    for record in records {
        writer.serialize(record).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| io_error(&tmp, e))?;
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> VlrError {
    VlrError::Io {
        path: path.display().to_string(),
        source,
    }
}
