use serde::Serialize;

/// A player's rating line from a match overview.
///
/// A match yields either 10 or 20 of these depending on whether the page
/// rendered one or both rosters; both counts are valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRating {
    pub player_name: String,
    #[serde(rename = "team")]
    pub team_tag: String,
    pub rating: f32,
    pub match_number: u32,
    pub match_url: String,
}
