//! # Live game state
//!
//! Read-only snapshots of in-progress games, supplied by an external
//! scoreboard feed, and the blender that attaches them to bracket slots
//! before a re-simulation.
//!
//! The blender is a pre-pass: it runs once, outside the parallel region,
//! and produces a fresh bracket view. Locked results are recorded on the
//! *base* bracket and survive every subsequent blend.
use crate::bracket::{Bracket, BracketError, Round, SlotId};
use crate::team::TeamId;
use chrono::{DateTime, Utc};
use derive_more::{AsRef, Display, From, Into};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// External identifier of a live game, opaque to the engine.
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
pub struct LiveGameId(pub String);

impl From<&str> for LiveGameId {
    fn from(id: &str) -> Self {
        LiveGameId(String::from(id))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    PreGame,
    InProgress,
    Halftime,
    Final,
}

/// Cumulative shooting counters for one team in one half.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShootingLine {
    pub fg_made: u32,
    pub fg_attempted: u32,
    pub three_made: u32,
    pub three_attempted: u32,
    pub ft_made: u32,
    pub ft_attempted: u32,
}

/// The most recent unanswered scoring run.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRun {
    pub team: TeamId,
    pub points: u32,
}

/// Snapshot of a single game, keyed externally by [`LiveGameId`].
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LiveGameState {
    pub game_id: LiveGameId,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub round: Round,
    pub home_score: u32,
    pub away_score: u32,
    /// Current period; 1 and 2 are regulation halves, 3+ are overtimes.
    pub period: u32,
    /// Total seconds remaining in the game, current period included.
    pub time_remaining_s: u32,
    pub possession: Option<TeamId>,
    pub home_fouls: u32,
    pub away_fouls: u32,
    pub home_bonus: bool,
    pub away_bonus: bool,
    /// Per-half shooting counters, first and second half.
    #[serde(default)]
    pub home_shooting: [ShootingLine; 2],
    #[serde(default)]
    pub away_shooting: [ShootingLine; 2],
    #[serde(default)]
    pub last_run: Option<ScoringRun>,
    pub home_timeouts: u8,
    pub away_timeouts: u8,
    pub status: GameStatus,
    pub last_updated: DateTime<Utc>,
}

impl LiveGameState {
    /// Pre-game snapshot with empty counters.
    pub fn pregame(
        game_id: impl Into<LiveGameId>,
        home_team: TeamId,
        away_team: TeamId,
        round: Round,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            home_team,
            away_team,
            round,
            home_score: 0,
            away_score: 0,
            period: 1,
            time_remaining_s: 2400,
            possession: None,
            home_fouls: 0,
            away_fouls: 0,
            home_bonus: false,
            away_bonus: false,
            home_shooting: [ShootingLine::default(); 2],
            away_shooting: [ShootingLine::default(); 2],
            last_run: None,
            home_timeouts: 4,
            away_timeouts: 4,
            status: GameStatus::PreGame,
            last_updated: Utc::now(),
        }
    }

    /// Whether this game is between exactly these two teams, either way
    /// around.
    pub fn involves(&self, a: TeamId, b: TeamId) -> bool {
        (self.home_team == a && self.away_team == b)
            || (self.home_team == b && self.away_team == a)
    }

    /// Score for one of the participants.
    pub fn score_for(&self, team: TeamId) -> Option<u32> {
        if team == self.home_team {
            Some(self.home_score)
        } else if team == self.away_team {
            Some(self.away_score)
        } else {
            None
        }
    }

    /// The team currently ahead; `None` when tied.
    pub fn leader(&self) -> Option<TeamId> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(self.home_team),
            std::cmp::Ordering::Less => Some(self.away_team),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Full game length implied by the current period: 2400 s regulation
    /// plus 300 s per overtime.
    pub fn total_seconds(&self) -> f64 {
        2400.0 + 300.0 * f64::from(self.period.saturating_sub(2))
    }

    /// In-progress or at the half; the states the probability model blends.
    pub fn is_underway(&self) -> bool {
        matches!(self.status, GameStatus::InProgress | GameStatus::Halftime)
    }
}

/// Snapshot of all known games, keyed by external game id.
pub type LiveSnapshot = BTreeMap<LiveGameId, LiveGameState>;

/// Result of a blend pass.
#[derive(Debug, Clone)]
pub struct BlendedBracket {
    pub bracket: Bracket,
    /// Slots with a game currently underway.
    pub active_slot_ids: Vec<SlotId>,
    /// Slots completed by this blend (not previously locked).
    pub completed_slot_ids: Vec<SlotId>,
}

/// Attaches live snapshots to bracket slots and locks finished results.
///
/// Matching is by unordered team pair: a live game belongs to a slot when
/// its two participants are exactly the slot's two teams. A live game whose
/// teams match no slot has no effect.
#[derive(Debug, Clone)]
pub struct LiveStateBlender {
    base: Bracket,
    locked: BTreeSet<SlotId>,
}

impl LiveStateBlender {
    pub fn new(bracket: Bracket) -> Self {
        Self {
            base: bracket,
            locked: BTreeSet::new(),
        }
    }

    /// The base bracket, including every locked result so far.
    pub fn base(&self) -> &Bracket {
        &self.base
    }

    pub fn locked_slot_ids(&self) -> impl Iterator<Item = &SlotId> {
        self.locked.iter()
    }

    /// Produce a fresh bracket view with the snapshot applied.
    ///
    /// Idempotent: blending the same snapshot twice yields the same view.
    /// Locked slots pass through untouched. Slots are visited in
    /// construction order, so a final result in an early round is already
    /// advanced when its downstream slot is considered.
    pub fn blend(&self, snapshot: &LiveSnapshot) -> BlendedBracket {
        let mut bracket = self.base.clone();
        let mut active_slot_ids = Vec::new();
        let mut completed_slot_ids = Vec::new();

        for idx in 0..bracket.len() {
            let (slot_id, teams, already_won) = {
                let slot = bracket.slot(idx);
                (slot.id.clone(), slot.teams(), slot.winner.is_some())
            };
            if self.locked.contains(&slot_id) || already_won {
                continue;
            }
            let Some((team1, team2)) = teams else {
                continue;
            };
            let Some(live) = snapshot.values().find(|game| game.involves(team1, team2))
            else {
                continue;
            };
            match live.status {
                GameStatus::Final => match live.leader() {
                    Some(winner) => {
                        bracket.set_winner(idx, winner);
                        completed_slot_ids.push(slot_id);
                    }
                    None => {
                        // A final basketball score cannot be level; keep
                        // the slot open and visible instead of dropping
                        // the game.
                        warn!(
                            "live game '{}' reports a tied final for slot '{slot_id}'; leaving slot active",
                            live.game_id
                        );
                        bracket.attach_live(idx, live.clone());
                        active_slot_ids.push(slot_id);
                    }
                },
                GameStatus::InProgress | GameStatus::Halftime => {
                    bracket.attach_live(idx, live.clone());
                    active_slot_ids.push(slot_id);
                }
                GameStatus::PreGame => {
                    bracket.attach_live(idx, live.clone());
                }
            }
        }

        BlendedBracket {
            bracket,
            active_slot_ids,
            completed_slot_ids,
        }
    }

    /// Permanently record a result on the base bracket and advance the
    /// winner downstream.
    ///
    /// Locked slots are never overwritten by later blends. Re-locking a
    /// slot with the same winner is a no-op; a conflicting winner is an
    /// error.
    pub fn lock_result(&mut self, slot_id: &SlotId, winner: TeamId) -> Result<(), BracketError> {
        let idx = self
            .base
            .index_of(slot_id)
            .ok_or_else(|| BracketError::UnknownSlot(slot_id.clone()))?;
        let slot = self.base.slot(idx);
        if slot.team1 != Some(winner) && slot.team2 != Some(winner) {
            return Err(BracketError::InvalidWinner {
                slot: slot_id.clone(),
                team: winner,
            });
        }
        if self.locked.contains(slot_id) {
            return if slot.winner == Some(winner) {
                Ok(())
            } else {
                Err(BracketError::SlotAlreadyLocked(slot_id.clone()))
            };
        }
        self.base.set_winner(idx, winner);
        self.locked.insert(slot_id.clone());
        Ok(())
    }
}
