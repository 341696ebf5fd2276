use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;

pub const BASE_URL: &str = "https://www.vlr.gg";

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_url: String,
    /// How many completed matches to collect per team.
    pub matches_per_team: usize,
    /// Concurrent page sessions. `1` keeps the run strictly sequential.
    pub workers: usize,
    /// Upper bound for any single page operation (load or interaction).
    pub page_timeout: Duration,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub delays: DelayPolicy,
    pub layout: LayoutOffsets,
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            matches_per_team: 50,
            workers: 1,
            page_timeout: Duration::from_secs(30),
            http_timeout: Duration::from_secs(20),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            delays: DelayPolicy::default(),
            layout: LayoutOffsets::default(),
            output_dir: PathBuf::from("data/raw/vlr_data"),
        }
    }
}

/// Positional assumptions about how vlr.gg lays out its rendered text.
///
/// These are coupled to one page layout; when the site shifts a row, change
/// the number here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOffsets {
    /// Lines between a player's name and their rating line.
    pub rating_name_before: usize,
    /// Lines between a player's team tag and their rating line.
    pub rating_tag_before: usize,
    /// Lines between the tournament name and the first `#` line of a match row.
    pub tournament_before_hash: usize,
}

impl Default for LayoutOffsets {
    fn default() -> Self {
        Self {
            rating_name_before: 2,
            rating_tag_before: 1,
            tournament_before_hash: 3,
        }
    }
}

/// Randomized pauses between requests, in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayPolicy {
    pub after_match: RangeInclusive<u64>,
    pub after_team: RangeInclusive<u64>,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            after_match: 1..=3,
            after_team: 2..=4,
        }
    }
}

impl DelayPolicy {
    /// No waiting at all. Meant for tests and offline fixtures.
    pub fn none() -> Self {
        Self {
            after_match: 0..=0,
            after_team: 0..=0,
        }
    }

    pub fn match_delay(&self) -> Duration {
        sample(&self.after_match)
    }

    pub fn team_delay(&self) -> Duration {
        sample(&self.after_team)
    }
}

fn sample(range: &RangeInclusive<u64>) -> Duration {
    if range.is_empty() {
        return Duration::ZERO;
    }
    Duration::from_secs(rand::thread_rng().gen_range(range.clone()))
}

/// A team to scrape, as listed on vlr.gg.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamEntry {
    pub id: u32,
    pub name: String,
}

impl TeamEntry {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// URL path segment vlr.gg uses for the team, e.g. `team-liquid`.
    pub fn slug(&self) -> String {
        self.name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
    }

    pub fn matches_url(&self, base_url: &str) -> String {
        format!(
            "{base_url}/team/matches/{}/{}/?group=completed",
            self.id,
            self.slug()
        )
    }
}

/// Read-only mapping from team name to vlr.gg team id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRegistry {
    teams: BTreeMap<String, u32>,
}

impl TeamRegistry {
    pub fn new(teams: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self {
            teams: teams.into_iter().collect(),
        }
    }

    /// The VCT partner teams across the four international leagues.
    pub fn vct_partners() -> Self {
        Self::new(VCT_PARTNERS.iter().map(|(name, id)| (name.to_string(), *id)))
    }

    pub fn get(&self, name: &str) -> Option<TeamEntry> {
        self.teams.get(name).map(|id| TeamEntry::new(*id, name))
    }

    /// Teams in a stable order (sorted by name).
    pub fn entries(&self) -> Vec<TeamEntry> {
        self.teams
            .iter()
            .map(|(name, id)| TeamEntry::new(*id, name.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

const VCT_PARTNERS: &[(&str, u32)] = &[
    // Americas
    ("Sentinels", 2),
    ("100 Thieves", 120),
    ("Cloud9", 188),
    ("NRG", 1034),
    ("Evil Geniuses", 5248),
    ("G2 Esports", 11058),
    ("LOUD", 6961),
    ("MIBR", 7386),
    ("FURIA", 2406),
    ("KRÜ Esports", 2355),
    ("LEVIATÁN", 2359),
    // EMEA
    ("FNATIC", 2593),
    ("Team Liquid", 474),
    ("Team Heretics", 1001),
    ("BBL Esports", 397),
    ("FUT Esports", 1184),
    ("Karmine Corp", 8877),
    ("Team Vitality", 2059),
    ("Natus Vincere", 4915),
    ("Gentle Mates", 12694),
    ("Apeks", 11479),
    // Pacific
    ("Paper Rex", 624),
    ("DRX", 8185),
    ("Gen.G", 17),
    ("T1", 14),
    ("Rex Regum Qeon", 878),
    ("TALON", 8304),
    ("Team Secret", 6199),
    ("ZETA DIVISION", 5448),
    ("DetonatioN FocusMe", 278),
    ("Global Esports", 918),
    // China
    ("EDward Gaming", 1120),
    ("Bilibili Gaming", 12010),
    ("FunPlus Phoenix", 628),
    ("Dragon Ranger Gaming", 11981),
    ("Wolves Esports", 13790),
    ("Trace Esports", 12685),
    ("Titan Esports Club", 14137),
    ("Nova Esports", 12064),
    ("All Gamers", 1119),
    ("TYLOO", 731),
    ("JDG Esports", 13576),
    ("Rare Atom", 11985),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_slug_and_url() {
        let team = TeamEntry::new(474, "Team Liquid");
        assert_eq!(team.slug(), "team-liquid");
        assert_eq!(
            team.matches_url(BASE_URL),
            "https://www.vlr.gg/team/matches/474/team-liquid/?group=completed"
        );
    }

    #[test]
    fn registry_lookup() {
        let registry = TeamRegistry::vct_partners();
        assert_eq!(registry.get("FNATIC"), Some(TeamEntry::new(2593, "FNATIC")));
        assert_eq!(registry.get("Nobody"), None);
        assert_eq!(registry.len(), VCT_PARTNERS.len());
    }

    #[test]
    fn zero_delay_policy() {
        let delays = DelayPolicy::none();
        assert_eq!(delays.match_delay(), Duration::ZERO);
        assert_eq!(delays.team_delay(), Duration::ZERO);
    }

    #[test]
    fn default_delays_stay_in_range() {
        let delays = DelayPolicy::default();
        for _ in 0..20 {
            let d = delays.match_delay().as_secs();
            assert!((1..=3).contains(&d));
            let d = delays.team_delay().as_secs();
            assert!((2..=4).contains(&d));
        }
    }
}
