//! # Team
//!
//! Identity, placement and metrics for a tournament team.
//!
//! A team is placed by its [`Seed`] within one of four [`Region`]s. The
//! [`TeamMetrics`] record carries the full statistical profile consumed by
//! the probability model; optional [`MascotProfile`] and [`CoachingProfile`]
//! records exist for modes that declare the matching data source.
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Internal unique identifier for teams.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, Display, Eq, PartialEq, Hash, Ord, PartialOrd, From,
    Into,
)]
pub struct TeamId(pub u32);

/// Mapping from id to team, the roster form consumed by the engine.
pub type Teams = HashMap<TeamId, Team>;

/// Collect a list of teams into a roster keyed by id.
pub fn roster(teams: impl IntoIterator<Item = Team>) -> Teams {
    teams.into_iter().map(|team| (team.id, team)).collect()
}

/// Seed within a region, 1..=16. 1 is best.
#[derive(
    Serialize, Debug, Clone, Copy, Display, Eq, PartialEq, Hash, Ord, PartialOrd, Into,
)]
pub struct Seed(u8);

/// Custom deserializer: seeds outside 1..=16 are rejected at the boundary.
impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Seed::try_new(value).map_err(serde::de::Error::custom)
    }
}

impl Seed {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 16;

    /// Fallible `Seed` constructor
    ///
    /// # Errors
    ///
    /// Errors if the seed is outside 1..=16.
    pub fn try_new(seed: u8) -> Result<Self, TeamError> {
        if (Self::MIN..=Self::MAX).contains(&seed) {
            Ok(Seed(seed))
        } else {
            Err(TeamError::InvalidSeed(seed))
        }
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Seed {
    type Error = TeamError;
    fn try_from(seed: u8) -> Result<Self, Self::Error> {
        Self::try_new(seed)
    }
}

/// One of the four regional brackets.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, Display, Eq, PartialEq, Hash, Ord, PartialOrd,
)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[display(fmt = "east")]
    East,
    #[display(fmt = "west")]
    West,
    #[display(fmt = "south")]
    South,
    #[display(fmt = "midwest")]
    Midwest,
}

impl Region {
    /// All regions in bracket-construction order.
    pub const ALL: [Region; 4] = [Region::East, Region::West, Region::South, Region::Midwest];
}

/// Men's or women's tournament.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, Display, Eq, PartialEq, Hash, Ord, PartialOrd,
)]
#[serde(rename_all = "lowercase")]
pub enum TournamentType {
    #[display(fmt = "mens")]
    Mens,
    #[display(fmt = "womens")]
    Womens,
}

#[derive(Display, Debug, Clone, AsRef, From, Into, Deserialize, Serialize, PartialEq, Eq)]
#[as_ref(forward)]
pub struct TeamName(pub String);

#[derive(Display, Debug, Clone, AsRef, From, Into, Deserialize, Serialize, PartialEq, Eq)]
#[as_ref(forward)]
pub struct ShortName(pub String);

#[derive(Display, Debug, Clone, AsRef, From, Into, Deserialize, Serialize, PartialEq, Eq)]
#[as_ref(forward)]
pub struct Conference(pub String);

/// Full statistical profile of a team.
///
/// Field names follow the external data feed. Missing fields deserialize to
/// Division-I midpoints so a partial record is still usable.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMetrics {
    /// Points scored per 100 possessions, opponent-adjusted.
    pub adj_offensive_efficiency: f64,
    /// Points allowed per 100 possessions, opponent-adjusted. Lower is better.
    pub adj_defensive_efficiency: f64,
    /// Possessions per 40 minutes.
    pub adj_tempo: f64,
    pub strength_of_schedule: f64,
    pub effective_fg_pct: f64,
    pub turnover_pct: f64,
    pub offensive_rebound_pct: f64,
    pub defensive_rebound_pct: f64,
    pub free_throw_rate: f64,
    pub free_throw_pct: f64,
    pub three_point_rate: f64,
    pub three_point_pct: f64,
    pub steal_pct: f64,
    /// Average roster height in inches.
    pub avg_height: f64,
    pub bench_minutes_pct: f64,
    pub experience_rating: f64,
    pub wins: u32,
    pub losses: u32,
    pub conference_wins: u32,
    pub conference_losses: u32,
    pub last10_wins: u32,
    pub last10_losses: u32,
    pub win_streak: u32,
}

impl Default for TeamMetrics {
    /// Division-I midpoints.
    fn default() -> Self {
        Self {
            adj_offensive_efficiency: 100.0,
            adj_defensive_efficiency: 100.0,
            adj_tempo: 67.0,
            strength_of_schedule: 0.0,
            effective_fg_pct: 0.50,
            turnover_pct: 0.18,
            offensive_rebound_pct: 0.30,
            defensive_rebound_pct: 0.70,
            free_throw_rate: 0.32,
            free_throw_pct: 0.72,
            three_point_rate: 0.38,
            three_point_pct: 0.34,
            steal_pct: 0.09,
            avg_height: 77.0,
            bench_minutes_pct: 0.30,
            experience_rating: 1.8,
            wins: 16,
            losses: 15,
            conference_wins: 9,
            conference_losses: 9,
            last10_wins: 5,
            last10_losses: 5,
            win_streak: 0,
        }
    }
}

/// Mascot record for whimsical modes.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MascotProfile {
    pub mascot: String,
    /// 0..=10, how much you would not want to meet it in the paint.
    pub ferocity: f64,
}

/// Coaching record for modes weighting sideline pedigree.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoachingProfile {
    pub coach: String,
    pub seasons: u32,
    pub tournament_wins: u32,
    /// Composite rating, roughly 0..=10.
    pub rating: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: TeamName,
    pub short_name: ShortName,
    pub seed: Seed,
    pub region: Region,
    pub conference: Conference,
    pub tournament_type: TournamentType,
    #[serde(default)]
    pub metrics: TeamMetrics,
    #[serde(default)]
    pub mascot: Option<MascotProfile>,
    #[serde(default)]
    pub coaching: Option<CoachingProfile>,
}

impl Team {
    pub fn new<N: AsRef<str> + ?Sized>(
        id: TeamId,
        name: &N,
        short_name: &str,
        seed: Seed,
        region: Region,
    ) -> Self {
        Team {
            id,
            name: TeamName(String::from(name.as_ref())),
            short_name: ShortName(String::from(short_name)),
            seed,
            region,
            conference: Conference(String::from("independent")),
            tournament_type: TournamentType::Mens,
            metrics: TeamMetrics::default(),
            mascot: None,
            coaching: None,
        }
    }

    pub fn with_metrics(mut self, metrics: TeamMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_mascot(mut self, mascot: MascotProfile) -> Self {
        self.mascot = Some(mascot);
        self
    }

    pub fn with_coaching(mut self, coaching: CoachingProfile) -> Self {
        self.coaching = Some(coaching);
        self
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name)
    }
}

#[derive(Error, Debug, Clone)]
pub enum TeamError {
    #[error("Seed {0} outside the valid range 1..=16")]
    InvalidSeed(u8),
    #[error("Team id {0} not present in the roster")]
    UnknownTeam(TeamId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize() {
        let data = r#"
        {
            "id": 12,
            "name": "Gonzaga",
            "shortName": "GON",
            "seed": 1,
            "region": "west",
            "conference": "WCC",
            "tournamentType": "mens",
            "metrics": {
                "adjOffensiveEfficiency": 121.3,
                "adjDefensiveEfficiency": 89.6,
                "winStreak": 7
            }
        }"#;
        let parsed: Team = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.id, TeamId(12));
        assert_eq!(parsed.seed, Seed::try_new(1).unwrap());
        assert_eq!(parsed.region, Region::West);
        assert_eq!(parsed.metrics.adj_offensive_efficiency, 121.3);
        // Unspecified metric falls back to the D-I midpoint.
        assert_eq!(parsed.metrics.adj_tempo, 67.0);
        assert_eq!(parsed.metrics.win_streak, 7);
    }

    #[test]
    fn seed_bounds() {
        assert!(Seed::try_new(0).is_err());
        assert!(Seed::try_new(17).is_err());
        assert!(Seed::try_new(1).is_ok());
        assert!(Seed::try_new(16).is_ok());
    }

    #[test]
    fn roster_from_list() {
        let teams = roster(vec![
            Team::new(TeamId(1), "Duke", "DUK", Seed::try_new(1).unwrap(), Region::East),
            Team::new(TeamId(2), "Yale", "YAL", Seed::try_new(13).unwrap(), Region::East),
        ]);
        assert_eq!(teams.len(), 2);
        assert_eq!(teams.get(&TeamId(2)).unwrap().name, TeamName("Yale".into()));
    }
}
