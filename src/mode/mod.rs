//! # Simulation modes
//!
//! A *mode* is the pluggable strategy that parameterizes the probability
//! pipeline: which metrics matter and how much, how noisy outcomes are, and
//! an optional deterministic adjustment applied to every matchup.
//!
//! Modes are capability sets, not a class hierarchy. A mode that mostly
//! agrees with the defaults holds a copy of [`default_weights`] /
//! [`default_variance_config`] and overrides the keys it cares about.
//! Composition happens through [`blend::BlendedMode`], a weighted average
//! of two or more component modes.
//!
//! The [`registry::ModeRegistry`] maps stable string ids to factories; the
//! embedding runtime registers every mode it wants once, before the first
//! simulation, and dispatches by id after that.
pub mod blend;
pub mod builtin;
pub mod registry;

pub use blend::BlendedMode;
pub use registry::{register_builtin_modes, ModeRegistry};

use crate::bracket::Round;
use crate::metrics::{Metric, MetricWeights};
use crate::prob::VarianceConfig;
use crate::sim::SimulationContext;
use crate::team::Team;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Broad intent of a mode.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ModeCategory {
    Research,
    Entertainment,
    Hybrid,
}

/// How seriously to take a mode's numbers.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceTag {
    StatisticallyValidated,
    Experimental,
    Whimsical,
}

/// External datasets a mode may declare a dependency on. The embedding
/// runtime uses the declaration to decide what to load; the engine itself
/// only ever sees the loaded fields on [`Team`].
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
    MascotData,
    CoachingRatings,
    NbaDraftRankings,
    BettingLines,
    HistoricalResults,
    AiModel,
}

/// Opaque per-run scratch state for modes that track the tournament as it
/// unfolds. Owned by exactly one Monte Carlo run and discarded with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeState(BTreeMap<String, f64>);

impl ModeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Add to a keyed counter, creating it at zero.
    pub fn bump(&mut self, key: impl Into<String>, delta: f64) {
        *self.0.entry(key.into()).or_insert(0.0) += delta;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another state in; colliding keys take the other state's value.
    pub(crate) fn absorb(&mut self, other: ModeState) {
        self.0.extend(other.0);
    }
}

/// The capability set every mode implements.
///
/// `adjust_probability` must be deterministic: equal inputs produce equal
/// outputs, and a mode never holds per-run mutable state on itself (that is
/// what [`ModeState`] is for).
pub trait SimulationMode: Send + Sync + std::fmt::Debug {
    /// Stable identifier used for registry dispatch.
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn category(&self) -> ModeCategory;
    fn confidence(&self) -> ConfidenceTag;

    /// Metric weights for the base probability model. All non-negative.
    fn weights(&self) -> MetricWeights;

    /// Outcome-noise configuration. Base variance strictly positive.
    fn variance_config(&self) -> VarianceConfig;

    /// Deterministic adjustment of a pipeline probability, in `[0, 1]`.
    fn adjust_probability(
        &self,
        base: f64,
        team1: &Team,
        team2: &Team,
        ctx: &SimulationContext,
    ) -> f64;

    /// External datasets this mode needs loaded onto the roster.
    fn data_sources(&self) -> Vec<DataSource> {
        Vec::new()
    }

    /// Fresh per-run state, for modes that track the run. `None` opts out.
    fn initialize_sim_state(&self) -> Option<ModeState> {
        None
    }

    /// Hook invoked after every simulated game in a run that carries state.
    fn on_game_complete(
        &self,
        _winner: &Team,
        _loser: &Team,
        _round: Round,
        _state: &mut ModeState,
    ) {
    }
}

/// The baseline metric weights most modes start from.
pub fn default_weights() -> MetricWeights {
    MetricWeights::new()
        .with(Metric::AdjOffensiveEfficiency, 1.0)
        .with(Metric::AdjDefensiveEfficiency, 1.0)
        .with(Metric::AdjTempo, 0.1)
        .with(Metric::StrengthOfSchedule, 0.35)
        .with(Metric::EffectiveFgPct, 0.5)
        .with(Metric::ThreePointRate, 0.15)
        .with(Metric::ThreePointPct, 0.35)
        .with(Metric::FreeThrowRate, 0.1)
        .with(Metric::FreeThrowPct, 0.15)
        .with(Metric::OffensiveReboundPct, 0.25)
        .with(Metric::DefensiveReboundPct, 0.25)
        .with(Metric::TurnoverPct, 0.3)
        .with(Metric::ExperienceRating, 0.2)
        .with(Metric::MomentumScore, 0.25)
}

/// The baseline variance configuration most modes start from.
pub fn default_variance_config() -> VarianceConfig {
    VarianceConfig {
        base_variance: 0.12,
        upset_multiplier: 1.0,
        live_state_weight: 0.7,
        seed_gap_sensitivity: 1.0,
        round_variance_multipliers: BTreeMap::new(),
    }
}

#[derive(Error, Debug, Clone)]
pub enum ModeError {
    #[error("Unknown mode '{id}'. Available modes: {available}")]
    UnknownMode { id: String, available: String },
    #[error("Mode '{0}' is already registered")]
    DuplicateRegistration(String),
    #[error("A blended mode needs at least two components, got {0}")]
    TooFewComponents(usize),
    #[error("Blend weight for component '{0}' must be non-negative")]
    NegativeBlendWeight(String),
    #[error("Blend weights must not all be zero")]
    ZeroBlendWeight,
    #[error("Global mode registry is already installed")]
    RegistryAlreadyInstalled,
    #[error("Global mode registry is not installed; call install_global first")]
    RegistryNotInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_cover_all_metrics() {
        let weights = default_weights();
        for metric in Metric::ALL {
            assert!(weights.get(metric) > 0.0, "{} unweighted", metric.key());
        }
        assert!(weights.all_non_negative());
    }

    #[test]
    fn default_variance_is_sane() {
        let variance = default_variance_config();
        assert!(variance.base_variance > 0.0);
        assert!(variance.upset_multiplier >= 0.0);
        assert!(variance.round_variance_multipliers.is_empty());
    }

    #[test]
    fn data_source_serde_labels() {
        let json = serde_json::to_string(&DataSource::MascotData).unwrap();
        assert_eq!(json, "\"mascot-data\"");
        let json = serde_json::to_string(&DataSource::NbaDraftRankings).unwrap();
        assert_eq!(json, "\"nba-draft-rankings\"");
    }

    #[test]
    fn mode_state_counters() {
        let mut state = ModeState::new();
        state.bump("wins:12", 1.0);
        state.bump("wins:12", 1.0);
        assert_eq!(state.get("wins:12"), Some(2.0));
        assert_eq!(state.get("wins:99"), None);
    }
}
