//! Shared fixtures for the integration tests.
#![allow(dead_code)]
use madness_core::bracket::Bracket;
use madness_core::team::{roster, Region, Seed, Team, TeamId, TeamMetrics, Teams};

/// Metrics scaled linearly by seed quality `(17 - seed) / 16`: a 1-seed is
/// elite in everything that matters, a 16-seed is not.
pub fn seeded_metrics(seed: u8) -> TeamMetrics {
    let quality = f64::from(17 - u16::from(seed)) / 16.0;
    TeamMetrics {
        adj_offensive_efficiency: 90.0 + 35.0 * quality,
        adj_defensive_efficiency: 110.0 - 25.0 * quality,
        strength_of_schedule: 10.0 * quality - 5.0,
        effective_fg_pct: 0.46 + 0.08 * quality,
        experience_rating: 1.0 + quality,
        last10_wins: (quality * 10.0).round() as u32,
        last10_losses: 10 - (quality * 10.0).round() as u32,
        ..TeamMetrics::default()
    }
}

pub fn seeded_team(id: u32, region: Region, seed: u8) -> Team {
    let seed = Seed::try_new(seed).expect("valid test seed");
    Team::new(
        TeamId(id),
        &format!("{region} {seed}"),
        &format!("T{id:02}"),
        seed,
        region,
    )
    .with_metrics(seeded_metrics(seed.as_u8()))
}

/// 64 synthetic teams; ids are `region_index * 16 + seed`.
pub fn synthetic_field() -> Teams {
    let mut teams = Vec::with_capacity(64);
    for (r, region) in Region::ALL.iter().enumerate() {
        for seed in 1..=16u8 {
            let id = (r as u32) * 16 + u32::from(seed);
            teams.push(seeded_team(id, *region, seed));
        }
    }
    roster(teams)
}

pub fn standard_bracket(teams: &Teams) -> Bracket {
    Bracket::from_teams(teams).expect("synthetic field builds a valid bracket")
}

/// Ids of every team at a given seed line across the four regions.
pub fn ids_at_seed(seed: u8) -> Vec<TeamId> {
    (0..4u32).map(|r| TeamId(r * 16 + u32::from(seed))).collect()
}
