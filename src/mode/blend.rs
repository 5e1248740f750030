//! # Mode blending
//!
//! A [`BlendedMode`] is a weighted average of two or more component modes:
//! averaged metric weights over the union of keys, averaged scalar variance
//! fields, and an adjustment that is exactly the weighted average of the
//! component adjustments. Round-variance multipliers are deliberately not
//! blended; a composite inherits none.
use crate::bracket::Round;
use crate::metrics::MetricWeights;
use crate::mode::{
    ConfidenceTag, DataSource, ModeCategory, ModeError, ModeState, SimulationMode,
};
use crate::prob::VarianceConfig;
use crate::sim::SimulationContext;
use crate::team::Team;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Weighted composite of component modes.
#[derive(Debug)]
pub struct BlendedMode {
    id: String,
    name: String,
    description: String,
    /// Components with normalized weights summing to 1.
    components: Vec<(Box<dyn SimulationMode>, f64)>,
}

impl BlendedMode {
    /// Fallible constructor.
    ///
    /// # Errors
    ///
    /// Requires at least two components with non-negative weights, not all
    /// zero. Weights are normalized by their sum.
    pub fn try_new(
        components: Vec<(Box<dyn SimulationMode>, f64)>,
    ) -> Result<Self, ModeError> {
        if components.len() < 2 {
            return Err(ModeError::TooFewComponents(components.len()));
        }
        for (mode, weight) in &components {
            if *weight < 0.0 {
                return Err(ModeError::NegativeBlendWeight(mode.id().to_string()));
            }
        }
        let total: f64 = components.iter().map(|(_, weight)| weight).sum();
        if total <= 0.0 {
            return Err(ModeError::ZeroBlendWeight);
        }
        let ids = components.iter().map(|(mode, _)| mode.id()).join("+");
        let names = components.iter().map(|(mode, _)| mode.name()).join(" / ");
        let components = components
            .into_iter()
            .map(|(mode, weight)| (mode, weight / total))
            .collect_vec();
        Ok(Self {
            id: format!("blend:{ids}"),
            name: format!("Blend ({names})"),
            description: String::from("Weighted blend of component modes"),
            components,
        })
    }

    pub fn component_ids(&self) -> Vec<&str> {
        self.components.iter().map(|(mode, _)| mode.id()).collect()
    }
}

impl SimulationMode for BlendedMode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    /// Any whimsical component drags the composite to entertainment; a
    /// panel of pure research modes stays research; everything else is a
    /// hybrid.
    fn category(&self) -> ModeCategory {
        if self
            .components
            .iter()
            .any(|(mode, _)| mode.confidence() == ConfidenceTag::Whimsical)
        {
            ModeCategory::Entertainment
        } else if self
            .components
            .iter()
            .all(|(mode, _)| mode.category() == ModeCategory::Research)
        {
            ModeCategory::Research
        } else {
            ModeCategory::Hybrid
        }
    }

    fn confidence(&self) -> ConfidenceTag {
        if self
            .components
            .iter()
            .all(|(mode, _)| mode.confidence() == ConfidenceTag::StatisticallyValidated)
        {
            ConfidenceTag::StatisticallyValidated
        } else {
            ConfidenceTag::Experimental
        }
    }

    /// Weight-averaged metric weights over the union of component keys;
    /// a key missing from a component contributes zero.
    fn weights(&self) -> MetricWeights {
        let mut merged: BTreeMap<String, f64> = BTreeMap::new();
        for (mode, share) in &self.components {
            for (key, weight) in mode.weights().iter() {
                *merged.entry(key.to_string()).or_insert(0.0) += weight * share;
            }
        }
        merged.into_iter().collect()
    }

    fn variance_config(&self) -> VarianceConfig {
        let mut blended = VarianceConfig {
            base_variance: 0.0,
            upset_multiplier: 0.0,
            live_state_weight: 0.0,
            seed_gap_sensitivity: 0.0,
            round_variance_multipliers: BTreeMap::new(),
        };
        for (mode, share) in &self.components {
            let variance = mode.variance_config();
            blended.base_variance += variance.base_variance * share;
            blended.upset_multiplier += variance.upset_multiplier * share;
            blended.live_state_weight += variance.live_state_weight * share;
            blended.seed_gap_sensitivity += variance.seed_gap_sensitivity * share;
        }
        blended
    }

    fn adjust_probability(
        &self,
        base: f64,
        team1: &Team,
        team2: &Team,
        ctx: &SimulationContext,
    ) -> f64 {
        self.components
            .iter()
            .map(|(mode, share)| share * mode.adjust_probability(base, team1, team2, ctx))
            .sum()
    }

    /// Union of component data sources.
    fn data_sources(&self) -> Vec<DataSource> {
        self.components
            .iter()
            .flat_map(|(mode, _)| mode.data_sources())
            .sorted()
            .dedup()
            .collect()
    }

    fn initialize_sim_state(&self) -> Option<ModeState> {
        let mut merged = ModeState::new();
        let mut any = false;
        for (mode, _) in &self.components {
            if let Some(state) = mode.initialize_sim_state() {
                merged.absorb(state);
                any = true;
            }
        }
        any.then_some(merged)
    }

    fn on_game_complete(&self, winner: &Team, loser: &Team, round: Round, state: &mut ModeState) {
        for (mode, _) in &self.components {
            mode.on_game_complete(winner, loser, round, state);
        }
    }
}
