use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::LayoutOffsets;
use crate::extract::is_uppercase_tag;
use crate::model::PlayerRating;

static RATING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-2]\.\d{2}").expect("valid regex"));

const NAME_CHARS: std::ops::RangeInclusive<usize> = 2..=20;
const TAG_CHARS: std::ops::RangeInclusive<usize> = 2..=10;

/// Pull player ratings out of a match overview's normalized text.
///
/// The scoreboard renders each player as name, team tag and a stats line
/// starting with the rating; `layout` says how far above the rating line the
/// name and tag sit. Decimal-looking lines that do not fit are skipped.
pub fn extract_player_ratings(
    text: &str,
    match_number: u32,
    match_url: &str,
    layout: &LayoutOffsets,
) -> Vec<PlayerRating> {
    let lines: Vec<&str> = text.lines().collect();
    let min_index = layout.rating_name_before.max(layout.rating_tag_before);

    let players: Vec<PlayerRating> = lines
        .iter()
        .enumerate()
        .skip(min_index)
        .filter_map(|(i, line)| {
            let line = line.trim();
            if !RATING_LINE.is_match(line) {
                return None;
            }
            let rating: f32 = line.split_whitespace().next()?.parse().ok()?;
            let player_name = lines[i - layout.rating_name_before].trim();
            let team_tag = lines[i - layout.rating_tag_before].trim();

            let valid = NAME_CHARS.contains(&player_name.chars().count())
                && TAG_CHARS.contains(&team_tag.chars().count())
                && is_uppercase_tag(team_tag);
            if !valid {
                return None;
            }
            debug!(player_name, team_tag, rating, "found player rating");
            Some(PlayerRating {
                player_name: player_name.to_string(),
                team_tag: team_tag.to_string(),
                rating,
                match_number,
                match_url: match_url.to_string(),
            })
        })
        .collect();

    debug!(count = players.len(), match_url, "extracted player ratings");
    players
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.vlr.gg/1/a-vs-b";

    fn extract(text: &str) -> Vec<PlayerRating> {
        extract_player_ratings(text, 4, URL, &LayoutOffsets::default())
    }

    #[test]
    fn three_line_block_yields_a_rating() {
        let players = extract("PlayerOne\nTEAM\n1.23 200 (+5) ...");
        assert_eq!(
            players,
            vec![PlayerRating {
                player_name: "PlayerOne".to_string(),
                team_tag: "TEAM".to_string(),
                rating: 1.23,
                match_number: 4,
                match_url: URL.to_string(),
            }]
        );
    }

    #[test]
    fn lowercase_tag_is_rejected() {
        assert!(extract("PlayerOne\nteam\n1.23 200 (+5) ...").is_empty());
    }

    #[test]
    fn rating_too_close_to_the_top_is_skipped() {
        assert!(extract("TEAM\n1.23 200").is_empty());
    }

    #[test]
    fn out_of_range_decimals_are_not_ratings() {
        assert!(extract("PlayerOne\nTEAM\n3.10 200").is_empty());
        assert!(extract("PlayerOne\nTEAM\n1.2 200").is_empty());
    }

    #[test]
    fn name_and_tag_lengths_are_checked() {
        assert!(extract("P\nTEAM\n1.00").is_empty());
        assert!(extract("PlayerOne\nT\n1.00").is_empty());
        assert!(extract("PlayerOne\nTOOLONGTAGXX\n1.00").is_empty());
        assert!(extract("AVeryLongPlayerNameIndeed\nTEAM\n1.00").is_empty());
    }

    #[test]
    fn both_rosters_are_collected() {
        let mut text = String::new();
        for (tag, side) in [("FNC", "a"), ("KC", "b")] {
            for n in 0..5 {
                text.push_str(&format!("player{side}{n}\n{tag}\n1.0{n} 210 (+4)\n"));
            }
        }
        let players = extract(&text);
        assert_eq!(players.len(), 10);
        assert_eq!(players.iter().filter(|p| p.team_tag == "KC").count(), 5);
        assert_eq!(players[2].rating, 1.02);
    }

    #[test]
    fn layout_offsets_are_configurable() {
        let layout = LayoutOffsets {
            rating_name_before: 3,
            rating_tag_before: 2,
            ..LayoutOffsets::default()
        };
        let players = extract_player_ratings("Zekken\nSEN\nflag\n1.41 250", 1, URL, &layout);
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].player_name, "Zekken");
        assert_eq!(players[0].team_tag, "SEN");
    }
}
