//! # Built-in modes
//!
//! The roster the engine ships with: one statistically grounded reference
//! mode, a seeds-only chalk mode, a high-variance chaos mode, a mascot
//! showdown for entertainment brackets and a momentum mode that tracks hot
//! streaks within each simulated tournament.
use crate::bracket::Round;
use crate::metrics::{Metric, MetricWeights};
use crate::mode::{
    default_variance_config, default_weights, ConfidenceTag, DataSource, ModeCategory, ModeState,
    SimulationMode,
};
use crate::prob::{logit, sigmoid, VarianceConfig};
use crate::sim::SimulationContext;
use crate::team::Team;

/// Reference research mode: default weights, default variance, no
/// adjustment. Everything else is measured against this one.
#[derive(Debug)]
pub struct StatisticalMode;

impl SimulationMode for StatisticalMode {
    fn id(&self) -> &str {
        "statistical"
    }
    fn name(&self) -> &str {
        "Statistical"
    }
    fn description(&self) -> &str {
        "Weighted efficiency model over the full metric set"
    }
    fn category(&self) -> ModeCategory {
        ModeCategory::Research
    }
    fn confidence(&self) -> ConfidenceTag {
        ConfidenceTag::StatisticallyValidated
    }
    fn weights(&self) -> MetricWeights {
        default_weights()
    }
    fn variance_config(&self) -> VarianceConfig {
        default_variance_config()
    }
    fn adjust_probability(
        &self,
        base: f64,
        _team1: &Team,
        _team2: &Team,
        _ctx: &SimulationContext,
    ) -> f64 {
        base.clamp(0.0, 1.0)
    }
}

/// Seeds pick games: low noise, heavy seed-gap pull and a sharpened logit
/// so favorites survive the way the committee intended.
#[derive(Debug)]
pub struct ChalkMode;

impl ChalkMode {
    const LOGIT_SHARPEN: f64 = 1.3;
}

impl SimulationMode for ChalkMode {
    fn id(&self) -> &str {
        "chalk"
    }
    fn name(&self) -> &str {
        "Chalk"
    }
    fn description(&self) -> &str {
        "Favors the bracket seeding; upsets are rare"
    }
    fn category(&self) -> ModeCategory {
        ModeCategory::Research
    }
    fn confidence(&self) -> ConfidenceTag {
        ConfidenceTag::StatisticallyValidated
    }
    fn weights(&self) -> MetricWeights {
        default_weights()
    }
    fn variance_config(&self) -> VarianceConfig {
        VarianceConfig {
            base_variance: 0.06,
            seed_gap_sensitivity: 2.0,
            ..default_variance_config()
        }
    }
    fn adjust_probability(
        &self,
        base: f64,
        _team1: &Team,
        _team2: &Team,
        _ctx: &SimulationContext,
    ) -> f64 {
        let clamped = base.clamp(0.001, 0.999);
        sigmoid(logit(clamped) * Self::LOGIT_SHARPEN)
    }
    fn data_sources(&self) -> Vec<DataSource> {
        vec![DataSource::HistoricalResults]
    }
}

/// Madness dialed up: every probability is squeezed toward a coin flip and
/// the late rounds get noisier still.
#[derive(Debug)]
pub struct ChaosMode;

impl SimulationMode for ChaosMode {
    fn id(&self) -> &str {
        "chaos"
    }
    fn name(&self) -> &str {
        "Chaos"
    }
    fn description(&self) -> &str {
        "High-variance bracket where anyone can beat anyone"
    }
    fn category(&self) -> ModeCategory {
        ModeCategory::Entertainment
    }
    fn confidence(&self) -> ConfidenceTag {
        ConfidenceTag::Experimental
    }
    fn weights(&self) -> MetricWeights {
        default_weights()
    }
    fn variance_config(&self) -> VarianceConfig {
        let mut variance = VarianceConfig {
            base_variance: 0.25,
            upset_multiplier: 1.6,
            seed_gap_sensitivity: 0.3,
            ..default_variance_config()
        };
        variance
            .round_variance_multipliers
            .insert(Round::EliteEight, 1.2);
        variance
            .round_variance_multipliers
            .insert(Round::FinalFour, 1.4);
        variance
            .round_variance_multipliers
            .insert(Round::Championship, 1.5);
        variance
    }
    fn adjust_probability(
        &self,
        base: f64,
        _team1: &Team,
        _team2: &Team,
        _ctx: &SimulationContext,
    ) -> f64 {
        0.5 + (base.clamp(0.0, 1.0) - 0.5) * 0.7
    }
}

/// Would their mascot win the fight? Metric signal is dampened and the
/// ferocity differential does the rest.
#[derive(Debug)]
pub struct MascotMode;

impl MascotMode {
    /// Ferocity for a team that never filed a mascot profile.
    const DEFAULT_FEROCITY: f64 = 5.0;
    const FEROCITY_SLOPE: f64 = 0.04;

    fn ferocity(team: &Team) -> f64 {
        team.mascot
            .as_ref()
            .map(|profile| profile.ferocity)
            .unwrap_or(Self::DEFAULT_FEROCITY)
    }
}

impl SimulationMode for MascotMode {
    fn id(&self) -> &str {
        "mascot"
    }
    fn name(&self) -> &str {
        "Mascot Showdown"
    }
    fn description(&self) -> &str {
        "Settled on ferocity; the numbers are a tiebreaker"
    }
    fn category(&self) -> ModeCategory {
        ModeCategory::Entertainment
    }
    fn confidence(&self) -> ConfidenceTag {
        ConfidenceTag::Whimsical
    }
    fn weights(&self) -> MetricWeights {
        // A fifth of the usual signal; ferocity carries the matchup.
        default_weights()
            .iter()
            .map(|(key, weight)| (key.to_string(), weight * 0.2))
            .collect()
    }
    fn variance_config(&self) -> VarianceConfig {
        VarianceConfig {
            base_variance: 0.2,
            upset_multiplier: 1.2,
            seed_gap_sensitivity: 0.2,
            ..default_variance_config()
        }
    }
    fn adjust_probability(
        &self,
        base: f64,
        team1: &Team,
        team2: &Team,
        _ctx: &SimulationContext,
    ) -> f64 {
        let edge = (Self::ferocity(team1) - Self::ferocity(team2)) * Self::FEROCITY_SLOPE;
        (base + edge).clamp(0.0, 1.0)
    }
    fn data_sources(&self) -> Vec<DataSource> {
        vec![DataSource::MascotData]
    }
}

/// Recent form weighted up, with per-run bookkeeping of who keeps winning.
#[derive(Debug)]
pub struct MomentumMode;

impl MomentumMode {
    fn wins_key(team: &Team) -> String {
        format!("wins:{}", team.id)
    }
}

impl SimulationMode for MomentumMode {
    fn id(&self) -> &str {
        "momentum"
    }
    fn name(&self) -> &str {
        "Momentum"
    }
    fn description(&self) -> &str {
        "Rides hot streaks and tournament experience"
    }
    fn category(&self) -> ModeCategory {
        ModeCategory::Hybrid
    }
    fn confidence(&self) -> ConfidenceTag {
        ConfidenceTag::Experimental
    }
    fn weights(&self) -> MetricWeights {
        default_weights()
            .with(Metric::MomentumScore, 1.2)
            .with(Metric::ExperienceRating, 0.5)
    }
    fn variance_config(&self) -> VarianceConfig {
        default_variance_config()
    }
    fn adjust_probability(
        &self,
        base: f64,
        _team1: &Team,
        _team2: &Team,
        _ctx: &SimulationContext,
    ) -> f64 {
        base.clamp(0.0, 1.0)
    }
    fn initialize_sim_state(&self) -> Option<ModeState> {
        Some(ModeState::new())
    }
    fn on_game_complete(&self, winner: &Team, _loser: &Team, _round: Round, state: &mut ModeState) {
        state.bump(Self::wins_key(winner), 1.0);
    }
}
