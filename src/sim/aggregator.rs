//! # Result aggregation
//!
//! Turns merged count matrices into the published forecast: per-team
//! advancement probabilities and expected wins, the most likely Final Four
//! and champion, a volatility index for how concentrated the championship
//! distribution is, and the biggest projected upset against historical
//! seed baselines.
use crate::bracket::Round;
use crate::sim::CountMatrix;
use crate::team::{Region, Seed, TeamId, TeamName, Teams, TournamentType};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Historical tournament advancement rates by seed (rows 1..=8), mens.
///
/// Columns: reached round-of-32, sweet sixteen, elite eight, final four,
/// championship game. Seeds 9 and worse borrow the seed-8 row; deep runs
/// from there are rare enough that the rows stop being distinguishable.
const HISTORICAL_BASELINES: [[f64; 5]; 8] = [
    [0.99, 0.86, 0.68, 0.41, 0.24],
    [0.93, 0.64, 0.45, 0.21, 0.12],
    [0.86, 0.52, 0.26, 0.12, 0.06],
    [0.79, 0.47, 0.16, 0.10, 0.04],
    [0.65, 0.33, 0.07, 0.05, 0.02],
    [0.62, 0.30, 0.10, 0.03, 0.02],
    [0.61, 0.19, 0.07, 0.02, 0.01],
    [0.49, 0.10, 0.06, 0.03, 0.02],
];

/// Rounds with a historical baseline column, in column order.
const BASELINE_ROUNDS: [Round; 5] = [
    Round::RoundOf32,
    Round::SweetSixteen,
    Round::EliteEight,
    Round::FinalFour,
    Round::Championship,
];

/// Historical reach probability for a seed at a round, if tabulated.
///
/// Seed lookups are capped at 8.
pub fn historical_baseline(seed: Seed, round: Round) -> Option<f64> {
    let row = usize::from(seed.as_u8().min(8)) - 1;
    let column = BASELINE_ROUNDS.iter().position(|r| *r == round)?;
    Some(HISTORICAL_BASELINES[row][column])
}

/// Forecast for one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSimulationResult {
    pub team_id: TeamId,
    pub name: TeamName,
    pub seed: Seed,
    pub region: Region,
    /// Probability of reaching each round. First-four and round-of-64 are
    /// 1 by convention; the field starts there.
    pub round_probabilities: BTreeMap<Round, f64>,
    /// Probability of winning it all.
    pub championship_probability: f64,
    /// Expected tournament wins.
    pub expected_wins: f64,
}

/// An underdog run the forecast believes in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedUpset {
    pub team_id: TeamId,
    pub round: Round,
    /// Simulated probability of the run.
    pub probability: f64,
    /// Historical rate for that seed and round.
    pub baseline: f64,
    /// Simulated minus historical.
    pub surprise: f64,
}

/// The full published forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSimulationResult {
    pub mode_id: String,
    pub mode_name: String,
    pub tournament_type: TournamentType,
    pub timestamp: DateTime<Utc>,
    pub simulation_count: u64,
    pub teams: BTreeMap<TeamId, TeamSimulationResult>,
    /// Top four by final-four probability.
    pub most_likely_final_four: Vec<TeamId>,
    pub most_likely_champion: Option<TeamId>,
    pub biggest_projected_upset: Option<ProjectedUpset>,
    /// Population standard deviation of championship probabilities.
    pub volatility_index: f64,
}

/// Convert merged counts into the published forecast.
///
/// Iterates the roster in id order throughout, so equal counts always
/// produce identical output regardless of map internals.
pub fn aggregate(
    counts: &CountMatrix,
    teams: &Teams,
    mode_id: &str,
    mode_name: &str,
    tournament_type: TournamentType,
) -> TournamentSimulationResult {
    let n = counts.runs().max(1) as f64;
    let ordered_ids = teams.keys().copied().sorted().collect_vec();

    let mut team_results = BTreeMap::new();
    for id in &ordered_ids {
        let team = &teams[id];
        let mut round_probabilities = BTreeMap::new();
        for round in Round::ALL {
            let p = match round {
                // Every bracket team is in by convention, play-in included.
                Round::FirstFour | Round::RoundOf64 => 1.0,
                _ => counts.reach(*id, round) as f64 / n,
            };
            round_probabilities.insert(round, p);
        }
        let expected_wins: f64 = BASELINE_ROUNDS
            .iter()
            .map(|round| round_probabilities[round])
            .sum();
        team_results.insert(
            *id,
            TeamSimulationResult {
                team_id: *id,
                name: team.name.clone(),
                seed: team.seed,
                region: team.region,
                round_probabilities,
                championship_probability: counts.champion_count(*id) as f64 / n,
                expected_wins,
            },
        );
    }

    let most_likely_final_four = team_results
        .values()
        .sorted_by(|a, b| {
            let by_final_four = partial_desc(
                a.round_probabilities[&Round::FinalFour],
                b.round_probabilities[&Round::FinalFour],
            );
            by_final_four
                .then_with(|| {
                    partial_desc(a.championship_probability, b.championship_probability)
                })
                .then_with(|| a.seed.cmp(&b.seed))
        })
        .take(4)
        .map(|result| result.team_id)
        .collect_vec();

    let most_likely_champion = ordered_ids
        .iter()
        .map(|id| (*id, counts.champion_count(*id), teams[id].seed))
        .fold(None, |best: Option<(TeamId, u64, Seed)>, candidate| {
            match best {
                None => Some(candidate),
                Some(incumbent) => {
                    let (_, best_count, best_seed) = incumbent;
                    let (_, count, seed) = candidate;
                    if count > best_count || (count == best_count && seed < best_seed) {
                        Some(candidate)
                    } else {
                        Some(incumbent)
                    }
                }
            }
        })
        .map(|(id, _, _)| id);

    let biggest_projected_upset = find_biggest_upset(&team_results);

    let volatility_index = {
        let probs = team_results
            .values()
            .map(|result| result.championship_probability)
            .collect_vec();
        population_std(&probs)
    };

    TournamentSimulationResult {
        mode_id: mode_id.to_string(),
        mode_name: mode_name.to_string(),
        tournament_type,
        timestamp: Utc::now(),
        simulation_count: counts.runs(),
        teams: team_results,
        most_likely_final_four,
        most_likely_champion,
        biggest_projected_upset,
        volatility_index,
    }
}

/// Descending order for probabilities; NaN sorts last.
fn partial_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Over 9-seeds and worse, find the (team, round) whose simulated reach
/// probability most exceeds the historical baseline. Runs below a 1%
/// simulated chance are ignored.
fn find_biggest_upset(
    team_results: &BTreeMap<TeamId, TeamSimulationResult>,
) -> Option<ProjectedUpset> {
    let mut best: Option<ProjectedUpset> = None;
    for result in team_results.values() {
        if result.seed.as_u8() < 9 {
            continue;
        }
        for round in BASELINE_ROUNDS {
            let probability = result.round_probabilities[&round];
            if probability < 0.01 {
                continue;
            }
            let Some(baseline) = historical_baseline(result.seed, round) else {
                continue;
            };
            let surprise = probability - baseline;
            if best
                .as_ref()
                .map(|incumbent| surprise > incumbent.surprise)
                .unwrap_or(true)
            {
                best = Some(ProjectedUpset {
                    team_id: result.team_id,
                    round,
                    probability,
                    baseline,
                    surprise,
                });
            }
        }
    }
    best
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    variance.sqrt()
}
