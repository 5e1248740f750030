//! # Bracket propagator
//!
//! Plays out one Monte Carlo run: walk the rounds in order, sample a winner
//! for every ready game, advance winners through the slot graph and tally
//! round reaches and the champion.
//!
//! The bracket structure is shared read-only across runs; all mutation
//! happens on a [`RunState`] owned by the run. Slots are visited in the
//! bracket's fixed construction order, never in hash-map order, so equal
//! seeds give bit-identical count matrices.
use crate::bracket::{Bracket, FeederPos, Round};
use crate::metrics::MetricWeights;
use crate::mode::SimulationMode;
use crate::prob::{self, VarianceConfig};
use crate::rng::SimRng;
use crate::sim::{CountMatrix, SimulationContext};
use crate::team::{TeamId, Teams};
use log::warn;
use std::collections::HashMap;

/// Mode configuration resolved once per simulation batch.
///
/// Modes are deterministic, so their weights and variance config are fixed
/// for the lifetime of a batch; resolving them up front keeps allocation
/// out of the per-game loop.
#[derive(Debug, Clone)]
pub struct ModeProfile {
    pub weights: MetricWeights,
    pub variance: VarianceConfig,
}

impl ModeProfile {
    pub fn of(mode: &dyn SimulationMode) -> Self {
        Self {
            weights: mode.weights(),
            variance: mode.variance_config(),
        }
    }
}

/// Mutable team assignments and winners for one run, index-parallel to the
/// bracket's slot list. Created at run start, discarded at run end.
pub(crate) struct RunState {
    teams: Vec<(Option<TeamId>, Option<TeamId>)>,
    winners: Vec<Option<TeamId>>,
}

impl RunState {
    fn from_bracket(bracket: &Bracket) -> Self {
        let teams = bracket
            .slots()
            .iter()
            .map(|slot| (slot.team1, slot.team2))
            .collect();
        let winners = bracket.slots().iter().map(|slot| slot.winner).collect();
        Self { teams, winners }
    }

    fn pair(&self, idx: usize) -> Option<(TeamId, TeamId)> {
        match self.teams[idx] {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    fn advance(&mut self, target: usize, pos: FeederPos, team: TeamId) {
        match pos {
            FeederPos::Team1 => self.teams[target].0 = Some(team),
            FeederPos::Team2 => self.teams[target].1 = Some(team),
        }
    }
}

/// Simulate one tournament run, accumulating into `counts`.
///
/// Slots whose winner is already fixed (locked live results) count round
/// reaches and advance without consuming randomness. A slot referencing a
/// team missing from the roster is skipped with a warning and neither team
/// accrues a reach for that round.
#[allow(clippy::too_many_arguments)]
pub fn simulate_run(
    bracket: &Bracket,
    teams: &Teams,
    mode: &dyn SimulationMode,
    profile: &ModeProfile,
    live_gamma: f64,
    rng: &mut SimRng,
    counts: &mut CountMatrix,
) {
    let mut state = RunState::from_bracket(bracket);
    let mut games_played: HashMap<TeamId, u32> = HashMap::new();
    let mut mode_state = mode.initialize_sim_state();
    counts.record_run();

    for round in Round::ALL {
        for &idx in bracket.round_slots(round) {
            let Some((id1, id2)) = state.pair(idx) else {
                continue;
            };
            let (Some(team1), Some(team2)) = (teams.get(&id1), teams.get(&id2)) else {
                warn!(
                    "slot '{}' references a team missing from the roster; skipping game",
                    bracket.slot(idx).id
                );
                continue;
            };

            counts.record_reach(id1, round);
            counts.record_reach(id2, round);

            let winner_id = match state.winners[idx] {
                // Locked by the live blender before dispatch.
                Some(locked) => locked,
                None => {
                    let ctx = SimulationContext {
                        round,
                        region: bracket.slot(idx).region,
                        tournament_type: team1.tournament_type,
                        games_played_team1: games_played.get(&id1).copied().unwrap_or(0),
                        games_played_team2: games_played.get(&id2).copied().unwrap_or(0),
                    };
                    let p = prob::win_probability(
                        team1,
                        team2,
                        &profile.weights,
                        &profile.variance,
                        mode,
                        &ctx,
                        bracket.slot(idx).live.as_ref(),
                        live_gamma,
                    );
                    let team1_wins = prob::sample_outcome(p, &profile.variance, round, rng);
                    let winner = if team1_wins { id1 } else { id2 };
                    state.winners[idx] = Some(winner);
                    winner
                }
            };

            if let Some((target, pos)) = bracket.next_of(idx) {
                state.advance(target, pos, winner_id);
            }
            *games_played.entry(id1).or_insert(0) += 1;
            *games_played.entry(id2).or_insert(0) += 1;

            if let Some(sim_state) = mode_state.as_mut() {
                let loser_id = if winner_id == id1 { id2 } else { id1 };
                // Lookups cannot fail here; both ids resolved above.
                if let (Some(winner), Some(loser)) = (teams.get(&winner_id), teams.get(&loser_id))
                {
                    mode.on_game_complete(winner, loser, round, sim_state);
                }
            }
        }
    }

    if let Some(champion) = state.winners[bracket.championship()] {
        counts.record_champion(champion);
    }
}
