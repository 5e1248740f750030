//! Shared fixtures for unit tests.
use crate::team::{roster, Region, Seed, Team, TeamId, TeamMetrics, Teams};

/// Metrics scaled linearly by seed quality: `(17 - seed) / 16`.
///
/// A 1-seed gets elite numbers, a 16-seed the bottom of the division, so
/// chalk should dominate any simulation over this field.
pub(crate) fn seeded_metrics(seed: Seed) -> TeamMetrics {
    let quality = f64::from(17 - u16::from(seed.as_u8())) / 16.0;
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

pub(crate) fn seeded_team(id: u32, region: Region, seed: u8) -> Team {
    let seed = Seed::try_new(seed).expect("valid test seed");
    Team::new(
        TeamId(id),
        &format!("{region} {seed}"),
        &format!("T{id:02}"),
        seed,
        region,
    )
    .with_metrics(seeded_metrics(seed))
}

/// 64 synthetic teams, four full regions, quality driven by seed.
///
/// Ids are `region_index * 16 + seed`, so East 1 is id 1 and Midwest 16 is
/// id 64. Returns the roster plus all ids in ascending order.
pub(crate) fn synthetic_field() -> (Teams, Vec<TeamId>) {
    let mut teams = Vec::with_capacity(64);
    for (r, region) in Region::ALL.iter().enumerate() {
        for seed in 1..=16u8 {
            let id = (r as u32) * 16 + u32::from(seed);
            teams.push(seeded_team(id, *region, seed));
        }
    }
    let ids = teams.iter().map(|team| team.id).collect();
    (roster(teams), ids)
}
