//! # Metric model
//!
//! Every named metric has a fixed normalization sigma, the empirical
//! Division-I standard deviation of that statistic. The probability model
//! works on differentials divided by sigma, so one "unit" means the same
//! thing whether the metric is efficiency (points per 100 possessions) or a
//! shooting percentage.
//!
//! Two metrics are better when lower (defensive efficiency, turnover rate);
//! their differentials are negated before weighting so that a positive
//! signed differential always favors team 1.
use crate::team::TeamMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of metrics recognized by the base probability model.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Metric {
    AdjOffensiveEfficiency,
    AdjDefensiveEfficiency,
    AdjTempo,
    StrengthOfSchedule,
    EffectiveFgPct,
    ThreePointRate,
    ThreePointPct,
    FreeThrowRate,
    FreeThrowPct,
    OffensiveReboundPct,
    DefensiveReboundPct,
    TurnoverPct,
    ExperienceRating,
    MomentumScore,
}

impl Metric {
    /// All recognized metrics, in weighting order.
    pub const ALL: [Metric; 14] = [
        Metric::AdjOffensiveEfficiency,
        Metric::AdjDefensiveEfficiency,
        Metric::AdjTempo,
        Metric::StrengthOfSchedule,
        Metric::EffectiveFgPct,
        Metric::ThreePointRate,
        Metric::ThreePointPct,
        Metric::FreeThrowRate,
        Metric::FreeThrowPct,
        Metric::OffensiveReboundPct,
        Metric::DefensiveReboundPct,
        Metric::TurnoverPct,
        Metric::ExperienceRating,
        Metric::MomentumScore,
    ];

    /// Stable string key, as used in weight maps and external config.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::AdjOffensiveEfficiency => "adjOffensiveEfficiency",
            Metric::AdjDefensiveEfficiency => "adjDefensiveEfficiency",
            Metric::AdjTempo => "adjTempo",
            Metric::StrengthOfSchedule => "strengthOfSchedule",
            Metric::EffectiveFgPct => "effectiveFGPct",
            Metric::ThreePointRate => "threePointRate",
            Metric::ThreePointPct => "threePointPct",
            Metric::FreeThrowRate => "freeThrowRate",
            Metric::FreeThrowPct => "freeThrowPct",
            Metric::OffensiveReboundPct => "offensiveReboundPct",
            Metric::DefensiveReboundPct => "defensiveReboundPct",
            Metric::TurnoverPct => "turnoverPct",
            Metric::ExperienceRating => "experienceRating",
            Metric::MomentumScore => "momentumScore",
        }
    }

    /// Empirical D-I standard deviation used for normalization.
    pub fn sigma(&self) -> f64 {
        match self {
            Metric::AdjOffensiveEfficiency => 8.0,
            Metric::AdjDefensiveEfficiency => 8.0,
            Metric::AdjTempo => 4.0,
            Metric::StrengthOfSchedule => 4.0,
            Metric::EffectiveFgPct => 0.035,
            Metric::ThreePointRate => 0.06,
            Metric::ThreePointPct => 0.035,
            Metric::FreeThrowRate => 0.08,
            Metric::FreeThrowPct => 0.06,
            Metric::OffensiveReboundPct => 0.04,
            Metric::DefensiveReboundPct => 0.04,
            Metric::TurnoverPct => 0.03,
            Metric::ExperienceRating => 0.6,
            Metric::MomentumScore => 0.5,
        }
    }

    /// Whether a smaller raw value is the better one.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Metric::AdjDefensiveEfficiency | Metric::TurnoverPct)
    }

    /// Raw metric value for a team.
    pub fn extract(&self, metrics: &TeamMetrics) -> f64 {
        match self {
            Metric::AdjOffensiveEfficiency => metrics.adj_offensive_efficiency,
            Metric::AdjDefensiveEfficiency => metrics.adj_defensive_efficiency,
            Metric::AdjTempo => metrics.adj_tempo,
            Metric::StrengthOfSchedule => metrics.strength_of_schedule,
            Metric::EffectiveFgPct => metrics.effective_fg_pct,
            Metric::ThreePointRate => metrics.three_point_rate,
            Metric::ThreePointPct => metrics.three_point_pct,
            Metric::FreeThrowRate => metrics.free_throw_rate,
            Metric::FreeThrowPct => metrics.free_throw_pct,
            Metric::OffensiveReboundPct => metrics.offensive_rebound_pct,
            Metric::DefensiveReboundPct => metrics.defensive_rebound_pct,
            Metric::TurnoverPct => metrics.turnover_pct,
            Metric::ExperienceRating => metrics.experience_rating,
            Metric::MomentumScore => momentum_score(metrics),
        }
    }

    /// Normalized, sign-corrected differential between two teams.
    ///
    /// Positive favors `team1` for every metric, including the
    /// lower-is-better ones.
    pub fn signed_diff(&self, team1: &TeamMetrics, team2: &TeamMetrics) -> f64 {
        let diff = (self.extract(team1) - self.extract(team2)) / self.sigma();
        if self.lower_is_better() {
            -diff
        } else {
            diff
        }
    }
}

/// Derived momentum score.
///
/// `2 * (last10WinPct - 0.5) + clamp(winStreak * 0.03, 0, 0.15)`
pub fn momentum_score(metrics: &TeamMetrics) -> f64 {
    let last10_games = metrics.last10_wins + metrics.last10_losses;
    let last10_pct = if last10_games == 0 {
        0.5
    } else {
        f64::from(metrics.last10_wins) / f64::from(last10_games)
    };
    let streak_bonus = (f64::from(metrics.win_streak) * 0.03).clamp(0.0, 0.15);
    2.0 * (last10_pct - 0.5) + streak_bonus
}

/// Weight per metric key.
///
/// Keys are strings so that externally supplied maps may carry unknown keys;
/// the base probability model only ever reads the keys in [`Metric::ALL`].
/// Backed by an ordered map so that blending and iteration are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricWeights(BTreeMap<String, f64>);

impl MetricWeights {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert for a recognized metric.
    pub fn with(mut self, metric: Metric, weight: f64) -> Self {
        self.0.insert(metric.key().to_string(), weight);
        self
    }

    /// Insert by raw key. Unknown keys are carried but ignored by the model.
    pub fn insert_key(&mut self, key: impl Into<String>, weight: f64) {
        self.0.insert(key.into(), weight);
    }

    /// Weight for a recognized metric, 0 if absent.
    pub fn get(&self, metric: Metric) -> f64 {
        self.0.get(metric.key()).copied().unwrap_or(0.0)
    }

    /// Weight for a raw key, 0 if absent.
    pub fn get_key(&self, key: &str) -> f64 {
        self.0.get(key).copied().unwrap_or(0.0)
    }

    /// All keys present in the map, recognized or not, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, w)| (k.as_str(), *w))
    }

    /// True if every weight is non-negative, part of the mode contract.
    pub fn all_non_negative(&self) -> bool {
        self.0.values().all(|w| *w >= 0.0)
    }
}

impl FromIterator<(String, f64)> for MetricWeights {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
