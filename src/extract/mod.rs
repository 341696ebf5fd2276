//! Heuristic extractors over rendered vlr.gg page text.
//!
//! None of these return errors: a pattern that does not match becomes an
//! `Unknown`/empty value and the next strategy in line gets its turn.

pub mod map_score;
pub mod maps;
pub mod matchlist;
pub mod normalize;
pub mod players;
pub mod series;

pub use map_score::resolve_map_score;
pub use maps::extract_map_results;
pub use matchlist::{discover_matches, parse_match_elements};
pub use normalize::{normalize_page_text, strip_comment_tail};
pub use players::extract_player_ratings;
pub use series::{is_valid_series_score, resolve_maps_played, SeriesSources};

/// Round scores on a scoreboard line are at most 25 even with overtime.
pub(crate) const MAX_ROUND_SCORE: u32 = 25;

/// Parses a line consisting only of digits.
pub(crate) fn digits_only(line: &str) -> Option<u32> {
    if line.is_empty() || !line.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    line.parse().ok()
}

pub(crate) fn is_digits(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// An isolated round score, `0..=25`.
pub(crate) fn round_score(line: &str) -> Option<u8> {
    digits_only(line)
        .filter(|n| *n <= MAX_ROUND_SCORE)
        .and_then(|n| u8::try_from(n).ok())
}

/// Uppercase in the sense scoreboards use it: something cased, nothing lowercase.
pub(crate) fn is_uppercase_tag(tag: &str) -> bool {
    tag.chars().any(|c| c.is_uppercase()) && !tag.chars().any(|c| c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_scores() {
        assert_eq!(round_score("13"), Some(13));
        assert_eq!(round_score("0"), Some(0));
        assert_eq!(round_score("26"), None);
        assert_eq!(round_score("1.3"), None);
        assert_eq!(round_score(""), None);
        assert_eq!(round_score("99999999999999999999"), None);
    }

    #[test]
    fn uppercase_tags() {
        assert!(is_uppercase_tag("FNC"));
        assert!(is_uppercase_tag("T1"));
        assert!(!is_uppercase_tag("Fnc"));
        assert!(!is_uppercase_tag("123"));
    }
}
