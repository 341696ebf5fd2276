use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::extract::map_score::resolve_map_score;
use crate::extract::normalize::normalize_page_text;
use crate::extract::series::{resolve_maps_played, SeriesSources};
use crate::model::{MapName, MapResult, MapScore, MatchContext};
use crate::session::{PageElement, PageSession};

/// Per-map tabs of a match page's stats section.
pub const MAP_NAV_SELECTOR: &str = ".vm-stats-gamesnav-item.js-map-switch";
/// Marks the "All Maps" tab.
const ALL_MAPS_CLASS: &str = "mod-all";

/// Characters on either side of a map name checked for a ban mention.
const BAN_CONTEXT_CHARS: usize = 20;

static REMAINS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\w+)\s+remains").expect("valid regex"));
static BAN_PHASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)ban\s+\w+.*?(\w+)\s+remains").expect("valid regex"));
static MAP_IN_CONTEXT: Lazy<Vec<(MapName, Regex)>> = Lazy::new(|| {
    MapName::KNOWN
        .iter()
        .map(|map| {
            let pattern = format!(
                r"(?i).{{0,{n}}}\b{map}\b.{{0,{n}}}",
                n = BAN_CONTEXT_CHARS,
                map = map.needle()
            );
            (*map, Regex::new(&pattern).expect("valid regex"))
        })
        .collect()
});

/// Extract one [`MapResult`] per map actually played in the match open in `session`.
///
/// Series with per-map tabs are walked tab by tab, skipping maps beyond the
/// resolved series length. Single-map pages get exactly one result, named by
/// the first fallback strategy that recognises a map.
#[instrument(skip(session, context), fields(match_url = %context.match_url))]
pub async fn extract_map_results<S: PageSession>(
    session: &mut S,
    context: &MatchContext,
) -> Vec<MapResult> {
    let tabs = match session.elements(MAP_NAV_SELECTOR) {
        Ok(tabs) => tabs,
        Err(e) => {
            warn!(error = %e, "could not read map navigation");
            vec![]
        }
    };
    let numbered = tabs
        .into_iter()
        .filter(|t| !t.has_class(ALL_MAPS_CLASS))
        .collect_vec();
    debug!(tabs = numbered.len(), "found map navigation items");

    let results = if numbered.is_empty() {
        vec![extract_single_map(session, context)]
    } else {
        extract_series_maps(session, context, &numbered).await
    };
    info!(maps = results.len(), "extracted map results");
    results
}

async fn extract_series_maps<S: PageSession>(
    session: &mut S,
    context: &MatchContext,
    tabs: &[PageElement],
) -> Vec<MapResult> {
    let maps_played = resolve_maps_played(&SeriesSources::collect(session));
    let bound = maps_played.bound();
    debug!(?maps_played, bound, "maps actually played");

    let mut results = vec![];
    for tab in tabs {
        let Some((map_number, map_name)) = parse_map_label(&tab.text) else {
            debug!(label = %tab.text, "skipping unlabelled map tab");
            continue;
        };
        if map_number > bound {
            debug!(map_number, %map_name, bound, "skipping map, series already decided");
            continue;
        }

        if let Err(e) = session.activate(tab).await {
            warn!(map_number, %map_name, error = %e, "could not switch to map");
            continue;
        }
        let text = match session.body_text() {
            Ok(text) => text,
            Err(e) => {
                warn!(map_number, %map_name, error = %e, "could not read map view");
                continue;
            }
        };
        let score = resolve_map_score(&normalize_page_text(&text), &context.team_name);
        debug!(map_number, %map_name, result = %score.outcome, "map processed");
        results.push(MapResult::new(context, map_number, map_name, score));
    }
    results
}

/// Parses a tab label such as `"1 Ascent"`. Unknown map names keep their number.
fn parse_map_label(label: &str) -> Option<(u8, MapName)> {
    let label = label.split_whitespace().join(" ");
    let (number, name) = label.split_once(' ')?;
    if !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let number: u8 = number.parse().ok()?;
    let map = MapName::from_word(name)
        .or_else(|| name.split_whitespace().next().and_then(MapName::from_word))
        .unwrap_or_default();
    Some((number, map))
}

/// The page as seen by the single-map naming strategies.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SingleMapPage<'a> {
    pub text: &'a str,
    pub title: &'a str,
}

type NamingStrategy = fn(&SingleMapPage<'_>) -> Option<MapName>;

/// Tried in order; the first recognised map wins.
const NAMING_STRATEGIES: &[(&str, NamingStrategy)] = &[
    ("remains", from_remains),
    ("ban-phase", from_ban_phase),
    ("title", from_title),
    ("text-scan", from_text_scan),
];

pub(crate) fn name_single_map(page: &SingleMapPage<'_>) -> MapName {
    for (name, strategy) in NAMING_STRATEGIES {
        if let Some(map) = strategy(page) {
            debug!(strategy = name, %map, "named single map");
            return map;
        }
    }
    debug!("could not determine map name");
    MapName::Unknown
}

fn extract_single_map<S: PageSession>(session: &S, context: &MatchContext) -> MapResult {
    let text = session
        .body_text()
        .inspect_err(|e| warn!(error = %e, "could not read page text"))
        .unwrap_or_default();
    let text = normalize_page_text(&text);
    let title = session
        .title()
        .inspect_err(|e| debug!(error = %e, "could not read title"))
        .unwrap_or_default();

    let map = name_single_map(&SingleMapPage {
        text: &text,
        title: &title,
    });

    // A best-of-one map result is the match result.
    let score = resolve_map_score(&text, &context.team_name);
    let score = if score.is_resolved() {
        score
    } else {
        MapScore {
            outcome: context.overall_result.into(),
            ..score
        }
    };
    MapResult::new(context, 1, map, score)
}

fn from_remains(page: &SingleMapPage<'_>) -> Option<MapName> {
    let caps = REMAINS.captures(page.text)?;
    MapName::from_word(&caps[1])
}

fn from_ban_phase(page: &SingleMapPage<'_>) -> Option<MapName> {
    let caps = BAN_PHASE.captures(page.text)?;
    MapName::from_word(&caps[1])
}

fn from_title(page: &SingleMapPage<'_>) -> Option<MapName> {
    let title = page.title.to_lowercase();
    MapName::KNOWN
        .into_iter()
        .find(|map| title.contains(map.needle()))
}

fn from_text_scan(page: &SingleMapPage<'_>) -> Option<MapName> {
    MAP_IN_CONTEXT.iter().find_map(|(map, pattern)| {
        let context = pattern.find(page.text)?;
        (!context.as_str().to_lowercase().contains("ban")).then_some(*map)
    })
}
