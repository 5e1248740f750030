//! # Bracket slots and rounds
use crate::live::LiveGameState;
use crate::team::{Region, TeamId};
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Tournament rounds in play order.
///
/// The derived `Ord` follows declaration order, which *is* the round order;
/// the propagator and every count matrix rely on that.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
)]
pub enum Round {
    #[serde(rename = "first-four")]
    FirstFour,
    #[serde(rename = "round-of-64")]
    RoundOf64,
    #[serde(rename = "round-of-32")]
    RoundOf32,
    #[serde(rename = "sweet-sixteen")]
    SweetSixteen,
    #[serde(rename = "elite-eight")]
    EliteEight,
    #[serde(rename = "final-four")]
    FinalFour,
    #[serde(rename = "championship")]
    Championship,
}

impl Round {
    /// Every round, play order.
    pub const ALL: [Round; 7] = [
        Round::FirstFour,
        Round::RoundOf64,
        Round::RoundOf32,
        Round::SweetSixteen,
        Round::EliteEight,
        Round::FinalFour,
        Round::Championship,
    ];

    /// The 63-slot main draw, excluding the play-in games.
    pub const MAIN_DRAW: [Round; 6] = [
        Round::RoundOf64,
        Round::RoundOf32,
        Round::SweetSixteen,
        Round::EliteEight,
        Round::FinalFour,
        Round::Championship,
    ];

    /// Conventional round index: first-four is -1, round-of-64 is 0.
    pub fn index(&self) -> i8 {
        match self {
            Round::FirstFour => -1,
            Round::RoundOf64 => 0,
            Round::RoundOf32 => 1,
            Round::SweetSixteen => 2,
            Round::EliteEight => 3,
            Round::FinalFour => 4,
            Round::Championship => 5,
        }
    }

    /// Dense index for count-matrix rows, 0..7.
    pub(crate) fn count_index(&self) -> usize {
        (self.index() + 1) as usize
    }

    /// Stable string label.
    pub fn label(&self) -> &'static str {
        match self {
            Round::FirstFour => "first-four",
            Round::RoundOf64 => "round-of-64",
            Round::RoundOf32 => "round-of-32",
            Round::SweetSixteen => "sweet-sixteen",
            Round::EliteEight => "elite-eight",
            Round::FinalFour => "final-four",
            Round::Championship => "championship",
        }
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Opaque slot identifier, unique within a bracket.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Display,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    AsRef,
    From,
    Into,
)]
#[as_ref(forward)]
pub struct SlotId(pub String);

impl From<&str> for SlotId {
    fn from(id: &str) -> Self {
        SlotId(String::from(id))
    }
}

/// Where a slot sits: one of the four regional brackets, or the national
/// rounds (the two semifinals and the championship game).
#[derive(
    Deserialize, Serialize, Debug, Display, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd,
)]
#[serde(rename_all = "kebab-case")]
pub enum SlotRegion {
    #[display(fmt = "east")]
    East,
    #[display(fmt = "west")]
    West,
    #[display(fmt = "south")]
    South,
    #[display(fmt = "midwest")]
    Midwest,
    #[display(fmt = "final-four")]
    FinalFour,
}

impl From<Region> for SlotRegion {
    fn from(region: Region) -> Self {
        match region {
            Region::East => SlotRegion::East,
            Region::West => SlotRegion::West,
            Region::South => SlotRegion::South,
            Region::Midwest => SlotRegion::Midwest,
        }
    }
}

/// Which side of the downstream slot a feeder's winner fills.
///
/// Feeder ordering is stable: the feeder earlier in construction order is
/// the first feeder and fills `team1`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FeederPos {
    Team1,
    Team2,
}

/// A node in the bracket graph.
///
/// Round-of-64 slots carry both teams from construction; every later slot
/// starts empty and is filled exclusively by winner advancement (or by a
/// locked live result).
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BracketSlot {
    pub id: SlotId,
    pub round: Round,
    pub region: SlotRegion,
    #[serde(default)]
    pub team1: Option<TeamId>,
    #[serde(default)]
    pub team2: Option<TeamId>,
    #[serde(default)]
    pub winner: Option<TeamId>,
    #[serde(default)]
    pub next_slot: Option<SlotId>,
    /// In-progress game state attached by the live blender.
    #[serde(default)]
    pub live: Option<LiveGameState>,
}

impl BracketSlot {
    pub fn new(id: impl Into<SlotId>, round: Round, region: SlotRegion) -> Self {
        Self {
            id: id.into(),
            round,
            region,
            team1: None,
            team2: None,
            winner: None,
            next_slot: None,
            live: None,
        }
    }

    pub fn with_teams(mut self, team1: TeamId, team2: TeamId) -> Self {
        self.team1 = Some(team1);
        self.team2 = Some(team2);
        self
    }

    pub fn advancing_to(mut self, next: impl Into<SlotId>) -> Self {
        self.next_slot = Some(next.into());
        self
    }

    /// Both teams assigned and no winner yet.
    pub fn is_ready(&self) -> bool {
        self.team1.is_some() && self.team2.is_some() && self.winner.is_none()
    }

    /// The unordered team pair, if both are assigned.
    pub fn teams(&self) -> Option<(TeamId, TeamId)> {
        match (self.team1, self.team2) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}
