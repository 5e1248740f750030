//! # Score model
//!
//! Auxiliary to the win-probability pipeline: winners are decided by the
//! noisy sampler, but callers that want a plausible box score (dashboards,
//! exhibition output) sample one here. Expected points come from each
//! team's offense against the opponent's defense at the blended tempo.
use crate::rng::SimRng;
use crate::team::Team;
use serde::{Deserialize, Serialize};

/// Division-I average efficiency, points per 100 possessions.
pub const D1_AVERAGE_EFFICIENCY: f64 = 100.0;

/// Floor for a sampled final score.
const MIN_SCORE: u32 = 30;

/// Standard deviation of a sampled regulation score.
const SCORE_SIGMA: f64 = 8.0;

/// Mean and sigma of one team's overtime points.
const OT_MEAN: f64 = 7.0;
const OT_SIGMA: f64 = 3.0;
const MAX_OVERTIMES: u32 = 5;

/// A sampled final score, team 1 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameScore {
    pub team1: u32,
    pub team2: u32,
    pub overtimes: u32,
}

impl GameScore {
    pub fn winner_is_team1(&self) -> bool {
        self.team1 > self.team2
    }

    pub fn margin(&self) -> u32 {
        self.team1.abs_diff(self.team2)
    }
}

/// Estimated possessions for a matchup: the average of the two tempos.
pub fn possessions(team1: &Team, team2: &Team) -> f64 {
    (team1.metrics.adj_tempo + team2.metrics.adj_tempo) / 2.0
}

/// Expected points for a team against a given defense at a given tempo.
pub fn expected_score(own_offense: f64, opp_defense: f64, possessions: f64) -> f64 {
    (own_offense + (D1_AVERAGE_EFFICIENCY - opp_defense)) / 100.0 * possessions
}

fn sample_score(expected: f64, rng: &mut SimRng) -> u32 {
    let sampled = (expected + rng.gaussian() * SCORE_SIGMA).round();
    (sampled.max(0.0) as u32).max(MIN_SCORE)
}

fn overtime_points(rng: &mut SimRng) -> u32 {
    let sampled = (OT_MEAN + rng.gaussian() * OT_SIGMA).round();
    (sampled.max(0.0) as u32).max(2)
}

/// Sample a full final score, resolving ties with overtime periods.
///
/// Each overtime adds an independent handful of points per team; after
/// five overtimes a still-tied game is settled by a fair coin and a single
/// point, so the result always has a winner.
pub fn simulate_game(team1: &Team, team2: &Team, rng: &mut SimRng) -> GameScore {
    let pace = possessions(team1, team2);
    let expected1 = expected_score(
        team1.metrics.adj_offensive_efficiency,
        team2.metrics.adj_defensive_efficiency,
        pace,
    );
    let expected2 = expected_score(
        team2.metrics.adj_offensive_efficiency,
        team1.metrics.adj_defensive_efficiency,
        pace,
    );
    let mut score1 = sample_score(expected1, rng);
    let mut score2 = sample_score(expected2, rng);

    let mut overtimes = 0;
    while score1 == score2 && overtimes < MAX_OVERTIMES {
        score1 += overtime_points(rng);
        score2 += overtime_points(rng);
        overtimes += 1;
    }
    if score1 == score2 {
        if rng.chance(0.5) {
            score1 += 1;
        } else {
            score2 += 1;
        }
    }

    GameScore {
        team1: score1,
        team2: score2,
        overtimes,
    }
}
