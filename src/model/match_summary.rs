use chrono::NaiveDate;
use serde::Serialize;

use super::common::{serialize_match_date, MatchOutcome};

/// Placeholder written when a free-text field could not be located.
pub const UNKNOWN: &str = "Unknown";

/// One row of a team's completed match history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub team_id: u32,
    pub team_name: String,
    /// 1-based position within the team's discovered list, newest first.
    pub match_number: u32,
    #[serde(serialize_with = "serialize_match_date")]
    pub date: Option<NaiveDate>,
    pub result: MatchOutcome,
    /// Series score as rendered, `"a:b"` with the tracked team first.
    pub score: String,
    pub opponent: String,
    pub tournament: String,
    pub match_url: String,
}

impl MatchSummary {
    /// The per-match values every map record repeats.
    pub fn context(&self) -> MatchContext {
        MatchContext {
            team_name: self.team_name.clone(),
            match_number: self.match_number,
            overall_result: self.result,
            match_url: self.match_url.clone(),
        }
    }
}

/// Identifies the match a page belongs to while its records are extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchContext {
    pub team_name: String,
    pub match_number: u32,
    pub overall_result: MatchOutcome,
    pub match_url: String,
}
