use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extract::normalize::{normalize_page_text, strip_comment_tail};
use crate::model::{MapsPlayed, SeriesScore};
use crate::session::PageSession;

pub(crate) const HEADER_VS_SELECTOR: &str = ".match-header-vs";
pub(crate) const HEADER_SELECTOR: &str = ".match-header";

static FINAL_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"final\s*(\d+)\s*:\s*(\d+)\s*vs").expect("valid regex"));
static DIGIT_PAIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)\s*:\s*(\d)").expect("valid regex"));
static TITLE_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*[:-]\s*(\d+)").expect("valid regex"));

/// See [`SeriesScore::is_valid`].
pub fn is_valid_series_score(a: u32, b: u32) -> bool {
    SeriesScore::is_valid(a, b)
}

/// Everything on a match page that can reveal the series score.
#[derive(Debug, Clone, Default)]
pub struct SeriesSources {
    pub header_vs: Option<String>,
    pub header: Option<String>,
    pub page_source: Option<String>,
    pub body_text: Option<String>,
    pub title: Option<String>,
}

impl SeriesSources {
    /// Read every source once. A source that cannot be read is left empty.
    pub fn collect<S: PageSession>(session: &S) -> Self {
        let first_text = |selector: &str| match session.elements(selector) {
            Ok(elements) => elements.into_iter().next().map(|e| e.text),
            Err(e) => {
                debug!(selector, error = %e, "series source unavailable");
                None
            }
        };
        Self {
            header_vs: first_text(HEADER_VS_SELECTOR),
            header: first_text(HEADER_SELECTOR),
            page_source: session
                .page_source()
                .inspect_err(|e| debug!(error = %e, "page source unavailable"))
                .ok(),
            body_text: session
                .body_text()
                .inspect_err(|e| debug!(error = %e, "body text unavailable"))
                .ok(),
            title: session
                .title()
                .inspect_err(|e| debug!(error = %e, "title unavailable"))
                .ok(),
        }
    }
}

type SeriesStrategy = fn(&SeriesSources) -> Option<SeriesScore>;

/// Tried in order; the first validated score wins.
const STRATEGIES: &[(&str, SeriesStrategy)] = &[
    ("header-vs", from_header_vs),
    ("header", from_header),
    ("page-source", from_page_source),
    ("body-text", from_body_text),
    ("title", from_title),
];

/// Work out how many maps a series went to.
///
/// Falls back to [`MapsPlayed::Unknown`] (bound 5) so that per-map iteration
/// never silently drops maps when the score cannot be read.
pub fn resolve_maps_played(sources: &SeriesSources) -> MapsPlayed {
    for (name, strategy) in STRATEGIES {
        if let Some(score) = strategy(sources) {
            debug!(
                strategy = name,
                team_score = score.team_score,
                opponent_score = score.opponent_score,
                total_maps = score.total_maps_played,
                "resolved series score"
            );
            return MapsPlayed::Confirmed(score);
        }
    }
    debug!("could not resolve series score, assuming all maps were played");
    MapsPlayed::Unknown
}

fn from_header_vs(sources: &SeriesSources) -> Option<SeriesScore> {
    sources.header_vs.as_deref().and_then(final_score)
}

fn from_header(sources: &SeriesSources) -> Option<SeriesScore> {
    sources.header.as_deref().and_then(final_score)
}

fn from_page_source(sources: &SeriesSources) -> Option<SeriesScore> {
    sources.page_source.as_deref().and_then(final_score)
}

fn from_body_text(sources: &SeriesSources) -> Option<SeriesScore> {
    let body = sources.body_text.as_deref()?;
    let normalized = normalize_page_text(body);
    single_digit_pairs(strip_comment_tail(&normalized))
        .into_iter()
        .find_map(|(a, b)| SeriesScore::new(a, b))
}

fn from_title(sources: &SeriesSources) -> Option<SeriesScore> {
    let title = sources.title.as_deref()?;
    let caps = TITLE_SCORE.captures(title)?;
    SeriesScore::new(caps[1].parse().ok()?, caps[2].parse().ok()?)
}

/// `final A:B vs`, only the first occurrence counts.
fn final_score(text: &str) -> Option<SeriesScore> {
    let caps = FINAL_SCORE.captures(text)?;
    SeriesScore::new(caps[1].parse().ok()?, caps[2].parse().ok()?)
}

/// Every `d:d` pair of single digits that is not part of a longer number
/// or a clock time such as `7:30 PM`.
fn single_digit_pairs(text: &str) -> Vec<(u32, u32)> {
    let mut pairs = vec![];
    let mut pos = 0;
    while let Some(caps) = DIGIT_PAIR.captures_at(text, pos) {
        let whole = caps.get(0).map(|m| (m.start(), m.end()));
        let Some((start, end)) = whole else { break };
        let rest = &text[end..];
        let followed_by_digit = rest.starts_with(|c: char| c.is_ascii_digit());
        let trimmed = rest.trim_start();
        let followed_by_meridiem = trimmed.starts_with("AM") || trimmed.starts_with("PM");
        if followed_by_digit || followed_by_meridiem {
            // The match starts on an ASCII digit, so one byte on is a char boundary.
            pos = start + 1;
            continue;
        }
        if let (Ok(a), Ok(b)) = (caps[1].parse(), caps[2].parse()) {
            pairs.push((a, b));
        }
        pos = end;
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> SeriesSources {
        SeriesSources {
            body_text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn validity_examples() {
        assert!(!is_valid_series_score(13, 11));
        assert!(is_valid_series_score(2, 1));
        assert!(is_valid_series_score(2, 0));
        assert!(!is_valid_series_score(4, 3));
    }

    #[test]
    fn header_vs_wins_first() {
        let sources = SeriesSources {
            header_vs: Some("FNATIC\n[2110]\nfinal\n2:0\nvs.\nBo3\nKarmine Corp".to_string()),
            title: Some("FNATIC 2-1 KC".to_string()),
            ..Default::default()
        };
        let played = resolve_maps_played(&sources);
        assert_eq!(played.bound(), 2);
    }

    #[test]
    fn invalid_candidate_falls_through_to_next_step() {
        let sources = SeriesSources {
            header_vs: Some("final 13:11 vs".to_string()),
            header: Some("final 3:2 vs".to_string()),
            ..Default::default()
        };
        match resolve_maps_played(&sources) {
            MapsPlayed::Confirmed(score) => {
                assert_eq!((score.team_score, score.opponent_score), (3, 2));
                assert_eq!(score.total_maps_played, 5);
            }
            MapsPlayed::Unknown => panic!("expected a confirmed score"),
        }
    }

    #[test]
    fn page_source_catches_hidden_markup() {
        let sources = SeriesSources {
            page_source: Some("<span>final</span> 1:0 <span>vs</span>".to_string()),
            ..Default::default()
        };
        // markup between the tokens defeats the pattern
        assert_eq!(resolve_maps_played(&sources), MapsPlayed::Unknown);

        let sources = SeriesSources {
            page_source: Some("<div data-x=\"final 1:0 vs\"></div>".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_maps_played(&sources).bound(), 1);
    }

    #[test]
    fn body_scan_skips_clock_times_and_round_scores() {
        let played = resolve_maps_played(&body("Starts 7:30 PM\nmap 13:11\nseries 2:1\n"));
        assert_eq!(played.bound(), 3);
    }

    #[test]
    fn body_scan_ignores_comments() {
        let played = resolve_maps_played(&body("no score here\n3 comments\n2:0"));
        assert_eq!(played, MapsPlayed::Unknown);
    }

    #[test]
    fn body_scan_ignores_forum_teasers() {
        let text = "Forums\nthread 1:0\n... 8 more matches\nseries 2:0";
        assert_eq!(resolve_maps_played(&body(text)).bound(), 2);
    }

    #[test]
    fn title_is_the_last_resort() {
        let sources = SeriesSources {
            title: Some("Sentinels vs. LOUD 1-2 | VLR.gg".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_maps_played(&sources).bound(), 3);
    }

    #[test]
    fn nothing_found_defaults_to_five() {
        assert_eq!(resolve_maps_played(&SeriesSources::default()), MapsPlayed::Unknown);
        assert_eq!(resolve_maps_played(&body("13:11 12:14")).bound(), 5);
    }

    #[test]
    fn digit_pairs() {
        assert_eq!(single_digit_pairs("2:1 and 12:30 and 4 : 0"), vec![(2, 1), (4, 0)]);
        assert_eq!(single_digit_pairs("9:15 AM"), vec![]);
        assert_eq!(single_digit_pairs("1:0 PM"), vec![]);
    }
}
