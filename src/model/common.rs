use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use strum_macros::EnumString;

/// Date format used by vlr.gg match history rows, e.g. `2025/07/12`.
pub const MATCH_DATE_FORMAT: &str = "%Y/%m/%d";

/// Outcome of a whole series from the tracked team's point of view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, strum_macros::Display,
)]
pub enum MatchOutcome {
    #[serde(rename = "W")]
    #[strum(serialize = "W")]
    Win,
    #[serde(rename = "L")]
    #[strum(serialize = "L")]
    Loss,
}

impl MatchOutcome {
    /// `W` only when the tracked side scored strictly more; ties count as a loss.
    pub fn from_scores(ours: u32, theirs: u32) -> Self {
        if ours > theirs {
            MatchOutcome::Win
        } else {
            MatchOutcome::Loss
        }
    }
}

/// Outcome of a single map. `Unknown` when the scores could not be attributed.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    EnumString,
    strum_macros::Display,
)]
pub enum MapOutcome {
    #[serde(rename = "W")]
    #[strum(serialize = "W")]
    Win,
    #[serde(rename = "L")]
    #[strum(serialize = "L")]
    Loss,
    #[default]
    Unknown,
}

impl From<MatchOutcome> for MapOutcome {
    fn from(outcome: MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::Win => MapOutcome::Win,
            MatchOutcome::Loss => MapOutcome::Loss,
        }
    }
}

/// The closed set of map names a `MapResult` may carry.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum MapName {
    Ascent,
    Bind,
    Haven,
    Icebox,
    Lotus,
    Sunset,
    Split,
    Breeze,
    Fracture,
    Pearl,
    Dust2,
    Abyss,
    Corrode,
    #[default]
    Unknown,
}

impl MapName {
    /// Every known map, in the order the fallback scans try them.
    pub const KNOWN: [MapName; 13] = [
        MapName::Ascent,
        MapName::Bind,
        MapName::Haven,
        MapName::Icebox,
        MapName::Lotus,
        MapName::Sunset,
        MapName::Split,
        MapName::Breeze,
        MapName::Fracture,
        MapName::Pearl,
        MapName::Dust2,
        MapName::Abyss,
        MapName::Corrode,
    ];

    /// Parse a single word into a known map, case-insensitively.
    pub fn from_word(word: &str) -> Option<MapName> {
        word.trim().parse().ok().filter(|map: &MapName| map.is_known())
    }

    /// Lowercase needle used when scanning free text.
    pub fn needle(self) -> &'static str {
        match self {
            MapName::Ascent => "ascent",
            MapName::Bind => "bind",
            MapName::Haven => "haven",
            MapName::Icebox => "icebox",
            MapName::Lotus => "lotus",
            MapName::Sunset => "sunset",
            MapName::Split => "split",
            MapName::Breeze => "breeze",
            MapName::Fracture => "fracture",
            MapName::Pearl => "pearl",
            MapName::Dust2 => "dust2",
            MapName::Abyss => "abyss",
            MapName::Corrode => "corrode",
            MapName::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != MapName::Unknown
    }
}

pub(crate) fn serialize_match_date<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(d) => serializer.serialize_str(&d.format(MATCH_DATE_FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_names_parse_case_insensitively() {
        assert_eq!(MapName::from_word("ascent"), Some(MapName::Ascent));
        assert_eq!(MapName::from_word("DUST2"), Some(MapName::Dust2));
        assert_eq!(MapName::from_word(" Lotus "), Some(MapName::Lotus));
    }

    #[test]
    fn unknown_is_not_parseable() {
        assert_eq!(MapName::from_word("Unknown"), None);
        assert_eq!(MapName::from_word("Overpass"), None);
        assert!(MapName::KNOWN.iter().all(|m| m.is_known()));
    }

    #[test]
    fn unknown_map_displays_as_sentinel() {
        assert_eq!(MapName::Unknown.to_string(), "Unknown");
        assert_eq!(MapName::Dust2.to_string(), "Dust2");
    }

    #[test]
    fn outcomes_render_as_letters() {
        assert_eq!(MatchOutcome::Win.to_string(), "W");
        assert_eq!(MapOutcome::Loss.to_string(), "L");
        assert_eq!(MapOutcome::Unknown.to_string(), "Unknown");
        assert_eq!(MatchOutcome::from_scores(1, 1), MatchOutcome::Loss);
    }
}
