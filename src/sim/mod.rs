//! # Simulation core
//!
//! The hot path. [`engine::simulate_run`] plays out one tournament;
//! [`runner::run_simulation`] fans runs out across workers and merges the
//! per-worker [`CountMatrix`] values; [`aggregator::aggregate`] turns the
//! merged counts into the published result.
pub mod aggregator;
pub mod engine;
pub mod runner;

pub use aggregator::{aggregate, ProjectedUpset, TeamSimulationResult, TournamentSimulationResult};
pub use engine::simulate_run;
pub use runner::{run_simulation, SimulationConfig};

use crate::bracket::{Round, SlotRegion};
use crate::team::{TeamId, TournamentType};
use derive_more::{Add, AddAssign, Display, From, Into, Sum};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only per-game context handed to a mode's probability adjuster.
#[derive(Debug, Clone, Copy)]
pub struct SimulationContext {
    pub round: Round,
    pub region: SlotRegion,
    pub tournament_type: TournamentType,
    /// Games already played by each side in this simulated tournament.
    pub games_played_team1: u32,
    pub games_played_team2: u32,
}

/// Non-negative count of Monte Carlo runs.
#[derive(
    Default,
    Debug,
    Display,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    From,
    Into,
    Add,
    AddAssign,
    Sum,
)]
pub struct RunCount(pub u64);

impl num::Zero for RunCount {
    fn zero() -> RunCount {
        RunCount(0)
    }
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Per-team round-reach and championship tallies over a batch of runs.
///
/// Merging is elementwise addition, associative and commutative, so the
/// parallel driver can combine worker-local matrices in any order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountMatrix {
    runs: RunCount,
    rounds: HashMap<TeamId, [RunCount; Round::ALL.len()]>,
    champions: HashMap<TeamId, RunCount>,
}

impl CountMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_run(&mut self) {
        self.runs += RunCount(1);
    }

    pub(crate) fn record_reach(&mut self, team: TeamId, round: Round) {
        self.rounds.entry(team).or_default()[round.count_index()] += RunCount(1);
    }

    pub(crate) fn record_champion(&mut self, team: TeamId) {
        *self.champions.entry(team).or_default() += RunCount(1);
    }

    /// Total runs recorded into this matrix.
    pub fn runs(&self) -> u64 {
        self.runs.0
    }

    /// Times `team` reached `round`.
    pub fn reach(&self, team: TeamId, round: Round) -> u64 {
        self.rounds
            .get(&team)
            .map(|row| row[round.count_index()].0)
            .unwrap_or(0)
    }

    /// Times `team` won the championship.
    pub fn champion_count(&self, team: TeamId) -> u64 {
        self.champions.get(&team).map(|count| count.0).unwrap_or(0)
    }

    /// Championship wins summed over every team; equals `runs()` for a
    /// well-formed bracket.
    pub fn champion_total(&self) -> u64 {
        self.champions.values().map(|count| count.0).sum()
    }

    /// Elementwise merge, consuming both operands.
    pub fn merge(mut self, other: CountMatrix) -> CountMatrix {
        self.runs += other.runs;
        for (team, row) in other.rounds {
            let own = self.rounds.entry(team).or_default();
            for (slot, count) in own.iter_mut().zip(row) {
                *slot += count;
            }
        }
        for (team, count) in other.champions {
            *self.champions.entry(team).or_default() += count;
        }
        self
    }
}
