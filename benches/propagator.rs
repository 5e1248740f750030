use criterion::{black_box, criterion_group, criterion_main, Criterion};
use madness_core::bracket::Bracket;
use madness_core::mode::builtin::StatisticalMode;
use madness_core::team::{roster, Region, Seed, Team, TeamId, TeamMetrics};
use madness_core::{run_simulation, SimulationConfig};

fn synthetic_teams() -> madness_core::team::Teams {
    let mut teams = Vec::with_capacity(64);
    for (r, region) in Region::ALL.iter().enumerate() {
        for seed in 1..=16u8 {
            let id = (r as u32) * 16 + u32::from(seed);
            let quality = f64::from(17 - u16::from(seed)) / 16.0;
            let metrics = TeamMetrics {
                adj_offensive_efficiency: 90.0 + 35.0 * quality,
                adj_defensive_efficiency: 110.0 - 25.0 * quality,
                strength_of_schedule: 10.0 * quality - 5.0,
                ..TeamMetrics::default()
            };
            teams.push(
                Team::new(
                    TeamId(id),
                    &format!("{region} {seed}"),
                    &format!("T{id:02}"),
                    Seed::try_new(seed).unwrap(),
                    *region,
                )
                .with_metrics(metrics),
            );
        }
    }
    roster(teams)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let teams = synthetic_teams();
    let bracket = Bracket::from_teams(&teams).unwrap();
    let config = SimulationConfig::with_simulations(200).with_seed(0).with_workers(1);
    c.bench_function("simulate_200_tournaments", |b| {
        b.iter(|| {
            run_simulation(
                black_box(&bracket),
                black_box(&teams),
                &StatisticalMode,
                &config,
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
