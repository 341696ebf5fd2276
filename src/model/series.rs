/// Most maps a Valorant series can go to (best of five).
pub const MAX_SERIES_MAPS: u8 = 5;

/// Maps needed to win the longest series format.
const MAX_MAPS_WON: u32 = 3;

/// A validated series score, e.g. `2:1` for a best-of-three that went the distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesScore {
    pub team_score: u8,
    pub opponent_score: u8,
    pub total_maps_played: u8,
}

impl SeriesScore {
    /// Whether `a:b` can be the final score of a best-of-one/three/five.
    ///
    /// Rejects round scores such as `13:11` as well as impossible series like `4:3`.
    pub fn is_valid(a: u32, b: u32) -> bool {
        let total = a.saturating_add(b);
        let max = a.max(b);
        (1..=u32::from(MAX_SERIES_MAPS)).contains(&total)
            && (1..=MAX_MAPS_WON).contains(&max)
            && a <= MAX_MAPS_WON
            && b <= MAX_MAPS_WON
    }

    pub fn new(a: u32, b: u32) -> Option<Self> {
        if !Self::is_valid(a, b) {
            return None;
        }
        let team_score = u8::try_from(a).ok()?;
        let opponent_score = u8::try_from(b).ok()?;
        Some(Self {
            team_score,
            opponent_score,
            total_maps_played: team_score + opponent_score,
        })
    }
}

/// How many maps a series went to, as far as the page lets us tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapsPlayed {
    Confirmed(SeriesScore),
    /// No cue survived validation. Per-map iteration must not skip anything.
    Unknown,
}

impl MapsPlayed {
    /// Highest map number that may be emitted for this series.
    pub fn bound(&self) -> u8 {
        match self {
            MapsPlayed::Confirmed(score) => score.total_maps_played,
            MapsPlayed::Unknown => MAX_SERIES_MAPS,
        }
    }
}
