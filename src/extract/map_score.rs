use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extract::normalize::strip_comment_tail;
use crate::extract::{is_digits, round_score};
use crate::model::{MapName, MapScore};

/// A line containing a map name only counts when it is this short.
const MAX_MAP_LINE_CHARS: usize = 20;
/// How far above the map line the first team's score may sit.
const SCORE_LOOKBACK: usize = 4;
/// How many lines below the map line to search for the second team.
const SCORE_LOOKAHEAD: usize = 4;
/// Half-width of the line window used to break attribution ties.
const CONTEXT_LINES: usize = 10;

const PICK_MARKER: &str = "PICK";

/// `k / d`-style stat cells that sit next to team names.
static RATIO_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s*/\s*\d+$").expect("valid regex"));
static CLOCK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+:\d+(:\d+)?$").expect("valid regex"));

/// Find the round score of the map currently shown and attribute it to `team_name`.
///
/// The map header renders as
/// `score, team, [side split], MAP, [PICK], [duration], team, [side split], score`.
/// Returns [`MapScore::UNKNOWN`] when no map line has a score on both sides.
pub fn resolve_map_score(text: &str, team_name: &str) -> MapScore {
    let text = strip_comment_tail(text);
    let lines: Vec<&str> = text.split('\n').collect();

    for (i, line) in lines.iter().enumerate() {
        let line_lower = line.trim().to_lowercase();
        for map in MapName::KNOWN {
            if !is_map_line(&line_lower, map) {
                continue;
            }
            let Some(header) = MapHeader::around(&lines, i) else {
                continue;
            };
            let (ours, theirs) = header.attribute(&lines, i, team_name);
            debug!(
                map = %map,
                first = ?header.first_name,
                second = ?header.second_name,
                ours,
                theirs,
                "resolved map score"
            );
            return MapScore::attributed(ours, theirs);
        }
    }

    debug!(team_name, "could not resolve map score");
    MapScore::UNKNOWN
}

fn is_map_line(line_lower: &str, map: MapName) -> bool {
    let needle = map.needle();
    line_lower == needle
        || (line_lower.contains(needle) && line_lower.chars().count() < MAX_MAP_LINE_CHARS)
}

fn is_team_name_line(line: &str) -> bool {
    !is_digits(line) && !RATIO_LINE.is_match(line)
}

/// Both sides of a map header, as found around the map line.
#[derive(Debug)]
struct MapHeader<'a> {
    first_score: u8,
    first_name: Option<&'a str>,
    second_score: u8,
    second_name: Option<&'a str>,
}

impl<'a> MapHeader<'a> {
    fn around(lines: &[&'a str], map_line: usize) -> Option<Self> {
        let (first_score, first_name) = Self::scan_before(lines, map_line)?;
        let (second_score, second_name) = Self::scan_after(lines, map_line)?;
        Some(Self {
            first_score,
            first_name,
            second_score,
            second_name,
        })
    }

    /// The earliest isolated score in the lookback window, and the name line right after it.
    fn scan_before(lines: &[&'a str], map_line: usize) -> Option<(u8, Option<&'a str>)> {
        let start = map_line.saturating_sub(SCORE_LOOKBACK);
        (start..map_line).find_map(|j| {
            let score = round_score(lines[j].trim())?;
            let name = (j + 1 < map_line)
                .then(|| lines[j + 1].trim())
                .filter(|n| is_team_name_line(n));
            Some((score, name))
        })
    }

    /// Skip an optional `PICK` and an optional duration, then expect a name and a score.
    fn scan_after(lines: &[&'a str], map_line: usize) -> Option<(u8, Option<&'a str>)> {
        let mut start = map_line + 1;
        if lines
            .get(start)
            .is_some_and(|l| l.trim().eq_ignore_ascii_case(PICK_MARKER))
        {
            start += 1;
        }
        if lines.get(start).is_some_and(|l| CLOCK_LINE.is_match(l.trim())) {
            start += 1;
        }

        let end = lines.len().min(start + SCORE_LOOKAHEAD);
        let mut name: Option<&'a str> = None;
        for line in lines.get(start..end).unwrap_or_default() {
            let line = line.trim();
            match name {
                None if !line.is_empty() && !is_digits(line) => {
                    if !RATIO_LINE.is_match(line) {
                        name = Some(line);
                    }
                }
                Some(_) => {
                    if let Some(score) = round_score(line) {
                        return Some((score, name));
                    }
                }
                None => {}
            }
        }
        None
    }

    /// Returns `(ours, theirs)`.
    fn attribute(&self, lines: &[&str], map_line: usize, team_name: &str) -> (u8, u8) {
        let team = team_name.to_lowercase();
        let mentions = |name: Option<&str>| name.is_some_and(|n| n.to_lowercase().contains(&team));

        if mentions(self.first_name) {
            return (self.first_score, self.second_score);
        }
        if mentions(self.second_name) {
            return (self.second_score, self.first_score);
        }

        // Neither name matched: go by which side of the map line the team is mentioned more.
        let start = map_line.saturating_sub(CONTEXT_LINES);
        let end = lines.len().min(map_line + CONTEXT_LINES);
        let mentions_in = |window: &[&str]| window.join(" ").to_lowercase().matches(&team).count();
        let before = mentions_in(&lines[start..map_line]);
        let after = mentions_in(&lines[map_line..end]);
        if before > after {
            (self.first_score, self.second_score)
        } else {
            (self.second_score, self.first_score)
        }
    }
}
