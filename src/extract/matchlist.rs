use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::config::{LayoutOffsets, PipelineConfig, TeamEntry};
use crate::model::{MatchOutcome, MatchSummary, MATCH_DATE_FORMAT, UNKNOWN};
use crate::session::{PageElement, PageSession};

/// Text length bounds (exclusive) of an element that can be a single match row.
/// Shorter elements are icons and labels, longer ones are whole-page containers.
const MIN_ROW_CHARS: usize = 20;
const MAX_ROW_CHARS: usize = 500;

/// Prefix length used for the dedup key when a row has no link.
const DEDUP_TEXT_PREFIX: usize = 50;

static EMBEDDED_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*:\s*(\d+)").expect("valid regex"));
static SCORE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\b\d+\s*:\s*\d+\b").expect("valid regex"));
static DATE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}/\d{2}/\d{2}").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    Url { score: String, url: String },
    Text { score: String, prefix: String },
}

/// Collect up to `config.matches_per_team` completed matches from a team's history page.
///
/// Never fails: an unreachable page or an unrecognisable layout yields an
/// empty list, logged as a warning.
#[instrument(skip(session, config), fields(team = %team.name))]
pub async fn discover_matches<S: PageSession>(
    session: &mut S,
    team: &TeamEntry,
    config: &PipelineConfig,
) -> Vec<MatchSummary> {
    let url = team.matches_url(&config.base_url);
    if let Err(e) = session.open(&url).await {
        warn!(url, error = %e, "could not load match history");
        return vec![];
    }

    let elements = match session.elements("*") {
        Ok(elements) => elements,
        Err(e) => {
            warn!(url, error = %e, "could not enumerate page elements");
            return vec![];
        }
    };

    let matches = parse_match_elements(
        &elements,
        team,
        config.matches_per_team,
        &config.base_url,
        &config.layout,
    );
    if matches.is_empty() {
        warn!(url, "no matches found");
    } else {
        debug!(count = matches.len(), "parsed team match list");
    }
    matches
}

/// Turn rendered elements of a match history page into match summaries,
/// newest first, stopping after `limit`.
pub fn parse_match_elements(
    elements: &[PageElement],
    team: &TeamEntry,
    limit: usize,
    base_url: &str,
    layout: &LayoutOffsets,
) -> Vec<MatchSummary> {
    let mut matches: Vec<MatchSummary> = vec![];
    let mut seen = HashSet::new();

    for element in elements {
        if matches.len() >= limit {
            break;
        }
        let text = element.text.trim();
        let length = text.chars().count();
        if length <= MIN_ROW_CHARS || length >= MAX_ROW_CHARS {
            continue;
        }
        let Some((team_score, opponent_score)) = embedded_score(text) else {
            continue;
        };
        let score = format!("{team_score}:{opponent_score}");
        let match_url = element.link().map(|href| absolute_url(base_url, href));

        let key = match &match_url {
            Some(url) => DedupKey::Url {
                score: score.clone(),
                url: url.clone(),
            },
            None => DedupKey::Text {
                score: score.clone(),
                prefix: text.chars().take(DEDUP_TEXT_PREFIX).collect(),
            },
        };
        if seen.contains(&key) {
            continue;
        }
        let Some(match_url) = match_url else {
            continue;
        };
        seen.insert(key);

        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let summary = MatchSummary {
            team_id: team.id,
            team_name: team.name.clone(),
            match_number: matches.len() as u32 + 1,
            date: match_date(&lines),
            result: MatchOutcome::from_scores(team_score, opponent_score),
            score,
            opponent: opponent(&lines, &team.name),
            tournament: tournament(&lines, layout.tournament_before_hash),
            match_url,
        };
        info!(
            match_number = summary.match_number,
            date = ?summary.date,
            result = %summary.result,
            opponent = %summary.opponent,
            score = %summary.score,
            tournament = %summary.tournament,
            "found match"
        );
        matches.push(summary);
    }

    matches
}

fn embedded_score(text: &str) -> Option<(u32, u32)> {
    let caps = EMBEDDED_SCORE.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Make a site-relative link absolute.
pub(crate) fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("{base_url}{href}")
    } else {
        href.to_string()
    }
}

/// The tournament name sits a fixed number of lines above the first `#` line.
fn tournament(lines: &[&str], offset: usize) -> String {
    lines
        .iter()
        .position(|l| l.starts_with('#'))
        .and_then(|hash| hash.checked_sub(offset))
        .map(|i| lines[i])
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn match_date(lines: &[&str]) -> Option<NaiveDate> {
    let line = lines.iter().find(|l| DATE_LINE.is_match(l))?;
    let date = line.get(..10)?;
    NaiveDate::parse_from_str(date, MATCH_DATE_FORMAT).ok()
}

/// First line from the third on that is not our own name, a `#` tag, a
/// score, a date, a lone digit or a bare colon.
fn opponent(lines: &[&str], team_name: &str) -> String {
    let own = team_name.to_uppercase();
    lines
        .iter()
        .skip(2)
        .find(|line| {
            !(line.is_empty()
                || line.to_uppercase() == own
                || line.starts_with('#')
                || SCORE_LINE.is_match(line)
                || DATE_LINE.is_match(line)
                || (line.len() == 1 && line.chars().all(|c| c.is_ascii_digit()))
                || **line == ":")
        })
        .map(|l| l.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
