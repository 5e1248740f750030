//! # Win-probability model
//!
//! The pre-game probability is a weighted logistic over normalized metric
//! differentials, optionally pulled toward the seed-implied probability and,
//! for games already underway, blended with a live estimate whose influence
//! grows as the game clock runs down.
//!
//! Pipeline per matchup: base -> seed-gap adjust -> mode adjust -> live
//! blend -> clamp -> noisy outcome sample. Every stage must stay inside
//! `[0, 1]`; debug builds assert it, release builds clamp at the exit.
use crate::bracket::Round;
use crate::live::LiveGameState;
use crate::metrics::{Metric, MetricWeights};
use crate::mode::SimulationMode;
use crate::rng::SimRng;
use crate::sim::SimulationContext;
use crate::team::{Seed, Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Calibration constant: one weighted sigma of total differential maps to
/// roughly a 73% win probability.
pub const LOGIT_SCALE: f64 = 0.25;

/// Logit scale of the seed-implied probability per seed of gap.
const SEED_GAP_SCALE: f64 = 0.18;

/// Blend fraction toward the seed-implied probability at sensitivity 1.
const SEED_GAP_BLEND: f64 = 0.15;

/// Probabilities leaving the pipeline are clamped to this band so the
/// sampler never sees a certainty.
pub const PROB_FLOOR: f64 = 0.001;
pub const PROB_CEIL: f64 = 0.999;

/// Default time-decay exponent for live-state blending.
pub const DEFAULT_LIVE_GAMMA: f64 = 0.7;

const REGULATION_SECONDS: f64 = 2400.0;
/// Possessions in a full regulation game, for the live variance estimate.
const LIVE_POSSESSION_RATE: f64 = 70.0;
/// Points of spread per remaining-possession sigma.
const LIVE_SCORE_SPREAD: f64 = 2.5;

/// Outcome-noise configuration carried by a mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceConfig {
    /// Base sigma of the logit-space noise, before round multipliers.
    pub base_variance: f64,
    /// Compression of sampled probabilities toward a coin flip; values
    /// above 1 compress, values below 1 stretch.
    pub upset_multiplier: f64,
    /// Mode-declared appetite for live-state influence. Carried and
    /// blended as configuration; the pipeline's time decay is driven by the
    /// gamma setting alone.
    pub live_state_weight: f64,
    /// Scales the seed-gap blend; 0 disables it.
    pub seed_gap_sensitivity: f64,
    /// Per-round noise multipliers; unset rounds default to 1.
    #[serde(default)]
    pub round_variance_multipliers: BTreeMap<Round, f64>,
}

impl VarianceConfig {
    /// Effective noise sigma for a round.
    pub fn effective_sigma(&self, round: Round) -> f64 {
        let multiplier = self
            .round_variance_multipliers
            .get(&round)
            .copied()
            .unwrap_or(1.0);
        self.base_variance * multiplier
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// Standard normal CDF, Abramowitz-Stegun 7.1.26 (error ~ 1.5e-7).
pub fn normal_cdf(x: f64) -> f64 {
    let z = x / std::f64::consts::SQRT_2;
    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let z = z.abs();
    let t = 1.0 / (1.0 + 0.3275911 * z);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    let erf = 1.0 - poly * (-z * z).exp();
    0.5 * (1.0 + sign * erf)
}

/// Base pre-game probability that `team1` beats `team2` under `weights`.
///
/// Identical teams come out at 0.5 and `p(a, b) + p(b, a) = 1`: the
/// differential sum negates exactly when the teams swap.
pub fn base_probability(team1: &Team, team2: &Team, weights: &MetricWeights) -> f64 {
    let total: f64 = Metric::ALL
        .iter()
        .map(|metric| weights.get(*metric) * metric.signed_diff(&team1.metrics, &team2.metrics))
        .sum();
    sigmoid(total * LOGIT_SCALE)
}

/// Pull a probability toward the seed-implied one.
///
/// With equal seeds or zero sensitivity the input is returned unchanged.
pub fn apply_seed_gap(p: f64, seed1: Seed, seed2: Seed, sensitivity: f64) -> f64 {
    if sensitivity == 0.0 || seed1 == seed2 {
        return p;
    }
    let gap = f64::from(i16::from(seed2.as_u8()) - i16::from(seed1.as_u8()));
    let seed_implied = sigmoid(gap * SEED_GAP_SCALE);
    let blend = SEED_GAP_BLEND * sensitivity;
    p * (1.0 - blend) + seed_implied * blend
}

/// Blend a pre-game probability with the state of a game underway.
///
/// `alpha = (elapsed / total)^gamma` weights a score-and-clock estimate
/// against the pre-game number; early in the game the model barely moves,
/// late in the game the scoreboard dominates. Finished games collapse to
/// 0/1 (0.5 on a tie, which the scoreboard should never report).
pub fn blend_live_state(
    base: f64,
    live: &LiveGameState,
    team1: TeamId,
    team2: TeamId,
    gamma: f64,
) -> f64 {
    match live.status {
        crate::live::GameStatus::PreGame => base,
        crate::live::GameStatus::Final => {
            let (Some(s1), Some(s2)) = (live.score_for(team1), live.score_for(team2)) else {
                return base;
            };
            match s1.cmp(&s2) {
                std::cmp::Ordering::Greater => 1.0,
                std::cmp::Ordering::Less => 0.0,
                std::cmp::Ordering::Equal => 0.5,
            }
        }
        crate::live::GameStatus::InProgress | crate::live::GameStatus::Halftime => {
            let (Some(s1), Some(s2)) = (live.score_for(team1), live.score_for(team2)) else {
                return base;
            };
            let total = live.total_seconds();
            let remaining = f64::from(live.time_remaining_s).min(total);
            let elapsed = total - remaining;
            let alpha = (elapsed / total).powf(gamma);
            let score_diff = f64::from(s1) - f64::from(s2);
            let remaining_possessions =
                (remaining / REGULATION_SECONDS * LIVE_POSSESSION_RATE).max(1.0);
            let live_prob =
                normal_cdf(score_diff / (remaining_possessions.sqrt() * LIVE_SCORE_SPREAD));
            alpha * live_prob + (1.0 - alpha) * base
        }
    }
}

/// Sample a game outcome with logit-space noise and upset compression.
///
/// Returns whether team 1 wins. Noise sigma is the variance config's base
/// sigma scaled by the round multiplier; the upset multiplier then
/// compresses (M > 1) or stretches (M < 1) the noisy probability around a
/// coin flip. A stretched value can leave the unit interval, which is what
/// the final clamp is for. A zero multiplier is treated as no compression.
pub fn sample_outcome(p: f64, variance: &VarianceConfig, round: Round, rng: &mut SimRng) -> bool {
    let p = p.clamp(PROB_FLOOR, PROB_CEIL);
    let sigma = variance.effective_sigma(round);
    let noisy = sigmoid(logit(p) + rng.gaussian() * sigma * 4.0);
    let m = variance.upset_multiplier;
    let compressed = if m > 0.0 {
        noisy / m + 0.5 * (1.0 - 1.0 / m)
    } else {
        noisy
    };
    let final_prob = compressed.clamp(PROB_FLOOR, PROB_CEIL);
    rng.chance(final_prob)
}

/// Full pre-sample pipeline for one matchup.
///
/// Applies the base model, the seed-gap blend at the mode's sensitivity,
/// the mode's deterministic adjustment and, when a game is underway on the
/// slot, the live-state blend. The result is clamped to the probability
/// band; sampling is a separate step so callers can inspect the number.
pub fn win_probability(
    team1: &Team,
    team2: &Team,
    weights: &MetricWeights,
    variance: &VarianceConfig,
    mode: &dyn SimulationMode,
    ctx: &SimulationContext,
    live: Option<&LiveGameState>,
    gamma: f64,
) -> f64 {
    let base = base_probability(team1, team2, weights);
    debug_assert!((0.0..=1.0).contains(&base), "base probability {base}");

    let seeded = apply_seed_gap(base, team1.seed, team2.seed, variance.seed_gap_sensitivity);
    debug_assert!((0.0..=1.0).contains(&seeded), "seed-gap output {seeded}");

    let adjusted = mode.adjust_probability(seeded, team1, team2, ctx);
    debug_assert!(
        (0.0..=1.0).contains(&adjusted),
        "mode adjustment {adjusted}"
    );

    let blended = match live {
        Some(game) if game.is_underway() || game.status == crate::live::GameStatus::Final => {
            blend_live_state(adjusted, game, team1.id, team2.id, gamma)
        }
        _ => adjusted,
    };
    debug_assert!((0.0..=1.0).contains(&blended), "live blend {blended}");

    blended.clamp(PROB_FLOOR, PROB_CEIL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{GameStatus, LiveGameState};
    use crate::mock_data::{seeded_team, synthetic_field};
    use crate::mode;
    use crate::team::Region;
    use assert_approx_eq::assert_approx_eq;
    use more_asserts::{assert_gt, assert_lt};

    fn strong_and_weak() -> (Team, Team) {
        let mut strong = seeded_team(1, Region::East, 1);
        strong.metrics.adj_offensive_efficiency = 125.0;
        strong.metrics.adj_defensive_efficiency = 85.0;
        strong.metrics.strength_of_schedule = 10.0;
        let mut weak = seeded_team(2, Region::East, 16);
        weak.metrics.adj_offensive_efficiency = 90.0;
        weak.metrics.adj_defensive_efficiency = 110.0;
        weak.metrics.strength_of_schedule = -5.0;
        (strong, weak)
    }

    #[test]
    fn identical_teams_split_even() {
        let a = seeded_team(1, Region::East, 1);
        let b = seeded_team(2, Region::West, 1);
        let p = base_probability(&a, &b, &mode::default_weights());
        assert!((p - 0.5).abs() < 1e-6, "p = {p}");
    }

    #[test]
    fn complementarity() {
        let (strong, weak) = strong_and_weak();
        let weights = mode::default_weights();
        let forward = base_probability(&strong, &weak, &weights);
        let backward = base_probability(&weak, &strong, &weights);
        assert!((forward + backward - 1.0).abs() < 1e-9);
    }

    #[test]
    fn chalk_favorite_is_heavy() {
        // 1-vs-16 with elite versus bottom-tier profiles.
        let (strong, weak) = strong_and_weak();
        let p = base_probability(&strong, &weak, &mode::default_weights());
        assert_gt!(p, 0.80);
    }

    #[test]
    fn seed_gap_idempotent_on_equal_seeds() {
        let s5 = Seed::try_new(5).unwrap();
        assert_approx_eq!(apply_seed_gap(0.60, s5, s5, 1.0), 0.60);
    }

    #[test]
    fn seed_gap_idempotent_at_zero_sensitivity() {
        let s1 = Seed::try_new(1).unwrap();
        let s16 = Seed::try_new(16).unwrap();
        assert_approx_eq!(apply_seed_gap(0.60, s16, s1, 0.0), 0.60);
    }

    #[test]
    fn seed_gap_dampens_underdog() {
        let s1 = Seed::try_new(1).unwrap();
        let s16 = Seed::try_new(16).unwrap();
        // A 16-seed modeled at 0.60 over a 1-seed gets pulled down.
        assert_lt!(apply_seed_gap(0.60, s16, s1, 1.0), 0.60);
        // The favorite gets pushed up.
        assert_gt!(apply_seed_gap(0.60, s1, s16, 1.0), 0.60);
    }

    #[test]
    fn normal_cdf_reference_values() {
        assert_approx_eq!(normal_cdf(0.0), 0.5, 1e-7);
        assert_approx_eq!(normal_cdf(1.0), 0.841_344_7, 1e-6);
        assert_approx_eq!(normal_cdf(-1.0), 0.158_655_3, 1e-6);
        assert_approx_eq!(normal_cdf(1.96), 0.975_002, 1e-5);
    }

    fn live_game(team1: TeamId, team2: TeamId) -> LiveGameState {
        LiveGameState::pregame("test-game", team1, team2, Round::RoundOf64)
    }

    #[test]
    fn pregame_live_state_leaves_base() {
        let game = live_game(TeamId(1), TeamId(2));
        assert_approx_eq!(
            blend_live_state(0.7, &game, TeamId(1), TeamId(2), DEFAULT_LIVE_GAMMA),
            0.7
        );
    }

    #[test]
    fn final_live_state_is_decisive() {
        let mut game = live_game(TeamId(1), TeamId(2));
        game.status = GameStatus::Final;
        game.home_score = 80;
        game.away_score = 70;
        assert_approx_eq!(
            blend_live_state(0.3, &game, TeamId(1), TeamId(2), DEFAULT_LIVE_GAMMA),
            1.0
        );
        assert_approx_eq!(
            blend_live_state(0.3, &game, TeamId(2), TeamId(1), DEFAULT_LIVE_GAMMA),
            0.0
        );
    }

    #[test]
    fn late_lead_dominates_pregame_model() {
        let mut game = live_game(TeamId(1), TeamId(2));
        game.status = GameStatus::InProgress;
        game.period = 2;
        game.time_remaining_s = 60;
        game.home_score = 80;
        game.away_score = 68;
        // Twelve up with a minute left: near-certain despite a poor
        // pre-game number.
        let p = blend_live_state(0.2, &game, TeamId(1), TeamId(2), DEFAULT_LIVE_GAMMA);
        assert_gt!(p, 0.95);
    }

    #[test]
    fn early_score_barely_moves_the_model() {
        let mut game = live_game(TeamId(1), TeamId(2));
        game.status = GameStatus::InProgress;
        game.period = 1;
        game.time_remaining_s = 2300;
        game.home_score = 6;
        game.away_score = 2;
        let p = blend_live_state(0.4, &game, TeamId(1), TeamId(2), DEFAULT_LIVE_GAMMA);
        assert!((p - 0.4).abs() < 0.1, "p = {p}");
    }

    #[test]
    fn overtime_extends_total_time() {
        let mut game = live_game(TeamId(1), TeamId(2));
        game.status = GameStatus::InProgress;
        game.period = 3; // first overtime
        game.time_remaining_s = 150;
        assert_approx_eq!(game.total_seconds(), 2700.0);
    }

    #[test]
    fn sampler_respects_probability() {
        let variance = mode::default_variance_config();
        let mut rng = SimRng::seeded(7);
        let trials = 20_000;
        let wins = (0..trials)
            .filter(|_| sample_outcome(0.8, &variance, Round::RoundOf64, &mut rng))
            .count();
        let rate = wins as f64 / trials as f64;
        // Logit noise is symmetric around the input but the sigmoid is
        // concave above 0.5, so the realized rate sits slightly below 0.8.
        assert_gt!(rate, 0.70);
        assert_lt!(rate, 0.85);
    }

    #[test]
    fn upset_multiplier_compresses_toward_coin_flip() {
        let mut compressed = mode::default_variance_config();
        compressed.upset_multiplier = 4.0;
        let plain = mode::default_variance_config();
        let mut rng1 = SimRng::seeded(11);
        let mut rng2 = SimRng::seeded(11);
        let trials = 20_000;
        let favorite_rate = |variance: &VarianceConfig, rng: &mut SimRng| {
            (0..trials)
                .filter(|_| sample_outcome(0.9, variance, Round::RoundOf64, rng))
                .count() as f64
                / trials as f64
        };
        let plain_rate = favorite_rate(&plain, &mut rng1);
        let compressed_rate = favorite_rate(&compressed, &mut rng2);
        assert_lt!(compressed_rate, plain_rate);
        assert_gt!(compressed_rate, 0.5);
    }

    #[test]
    fn round_multiplier_raises_outcome_variance() {
        let mut wild = mode::default_variance_config();
        wild.round_variance_multipliers
            .insert(Round::Championship, 6.0);
        let calm = mode::default_variance_config();
        let trials = 20_000;
        let upset_rate = |variance: &VarianceConfig, seed: u64| {
            let mut rng = SimRng::seeded(seed);
            (0..trials)
                .filter(|_| !sample_outcome(0.9, variance, Round::Championship, &mut rng))
                .count() as f64
                / trials as f64
        };
        // More logit noise drags a 0.9 favorite toward 0.5, so upsets rise.
        assert_gt!(upset_rate(&wild, 3), upset_rate(&calm, 3));
    }

    #[test]
    fn pipeline_output_stays_in_band() {
        let (teams, _) = synthetic_field();
        let statistical = crate::mode::builtin::StatisticalMode;
        let weights = mode::default_weights();
        let variance = mode::default_variance_config();
        let ctx = crate::sim::SimulationContext {
            round: Round::RoundOf64,
            region: crate::bracket::SlotRegion::East,
            tournament_type: crate::team::TournamentType::Mens,
            games_played_team1: 0,
            games_played_team2: 0,
        };
        let ids: Vec<_> = teams.keys().copied().collect();
        for window in ids.chunks(2) {
            if let [a, b] = window {
                let p = win_probability(
                    &teams[a],
                    &teams[b],
                    &weights,
                    &variance,
                    &statistical,
                    &ctx,
                    None,
                    DEFAULT_LIVE_GAMMA,
                );
                assert!((PROB_FLOOR..=PROB_CEIL).contains(&p));
            }
        }
    }
}
