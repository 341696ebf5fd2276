use serde::Serialize;

use super::common::{MapName, MapOutcome, MatchOutcome};
use super::match_summary::MatchContext;

/// Result of a single map of a series, from the tracked team's side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapResult {
    pub team_name: String,
    pub match_number: u32,
    pub overall_match_result: MatchOutcome,
    /// 1-based; never larger than the number of maps the series went to.
    pub map_number: u8,
    pub map_name: MapName,
    pub map_result: MapOutcome,
    pub our_score: Option<u8>,
    pub their_score: Option<u8>,
    /// `"our-their"`, absent when the scores are unknown.
    pub map_score: Option<String>,
    pub match_url: String,
}

impl MapResult {
    pub fn new(context: &MatchContext, map_number: u8, map_name: MapName, score: MapScore) -> Self {
        let map_score = match (score.ours, score.theirs) {
            (Some(ours), Some(theirs)) => Some(format!("{ours}-{theirs}")),
            _ => None,
        };
        Self {
            team_name: context.team_name.clone(),
            match_number: context.match_number,
            overall_match_result: context.overall_result,
            map_number,
            map_name,
            map_result: score.outcome,
            our_score: score.ours,
            their_score: score.theirs,
            map_score,
            match_url: context.match_url.clone(),
        }
    }
}

/// Round scores of one map attributed to the tracked team.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapScore {
    pub outcome: MapOutcome,
    pub ours: Option<u8>,
    pub theirs: Option<u8>,
}

impl MapScore {
    pub const UNKNOWN: MapScore = MapScore {
        outcome: MapOutcome::Unknown,
        ours: None,
        theirs: None,
    };

    pub fn attributed(ours: u8, theirs: u8) -> Self {
        let outcome = if ours > theirs {
            MapOutcome::Win
        } else {
            MapOutcome::Loss
        };
        Self {
            outcome,
            ours: Some(ours),
            theirs: Some(theirs),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome != MapOutcome::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MatchContext {
        MatchContext {
            team_name: "FNATIC".to_string(),
            match_number: 3,
            overall_result: MatchOutcome::Win,
            match_url: "https://www.vlr.gg/1/a-vs-b".to_string(),
        }
    }

    #[test]
    fn map_score_is_derived_from_both_scores() {
        let result = MapResult::new(&context(), 1, MapName::Bind, MapScore::attributed(13, 11));
        assert_eq!(result.map_score.as_deref(), Some("13-11"));
        assert_eq!(result.map_result, MapOutcome::Win);
        assert_eq!(result.overall_match_result, MatchOutcome::Win);
    }

    #[test]
    fn unknown_scores_leave_map_score_empty() {
        let result = MapResult::new(&context(), 2, MapName::Unknown, MapScore::UNKNOWN);
        assert_eq!(result.map_score, None);
        assert_eq!(result.our_score, None);
        assert_eq!(result.map_result, MapOutcome::Unknown);
    }

    #[test]
    fn overtime_loss_is_a_loss() {
        let score = MapScore::attributed(12, 14);
        assert_eq!(score.outcome, MapOutcome::Loss);
        assert!(score.is_resolved());
    }
}
