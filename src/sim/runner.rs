//! # Parallel driver
//!
//! Splits a batch of Monte Carlo runs across a worker pool and merges the
//! worker-local count matrices. Run `i` is always seeded `base_seed + i`
//! with `i` the global run index, so the merged counts are independent of
//! the worker count: the same `(bracket, teams, mode, N, base_seed)` gives
//! bit-identical results at any parallelism.
use crate::bracket::Bracket;
use crate::mode::SimulationMode;
use crate::prob::DEFAULT_LIVE_GAMMA;
use crate::rng::SimRng;
use crate::sim::engine::{simulate_run, ModeProfile};
use crate::sim::{aggregate, CountMatrix, TournamentSimulationResult};
use crate::team::{Teams, TournamentType};
use crate::EngineError;
use log::{debug, warn};
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Batch configuration.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of tournament runs.
    pub simulations: u32,
    /// Base RNG seed; run `i` uses `base_seed + i`.
    pub base_seed: u64,
    /// Worker threads; `None` means hardware concurrency minus one, at
    /// least one.
    pub workers: Option<usize>,
    /// Time-decay exponent for live-state blending.
    pub live_gamma: f64,
    /// Wall-time target; exceeding it logs a warning.
    pub target_duration: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulations: 1_000,
            base_seed: 42,
            workers: None,
            live_gamma: DEFAULT_LIVE_GAMMA,
            target_duration: Duration::from_secs(2),
        }
    }
}

impl SimulationConfig {
    pub fn with_simulations(simulations: u32) -> Self {
        Self {
            simulations,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_live_gamma(mut self, live_gamma: f64) -> Self {
        self.live_gamma = live_gamma;
        self
    }

    fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().saturating_sub(1))
            .max(1)
    }
}

/// Run a full batch and aggregate the result.
///
/// The bracket, roster and mode are shared read-only across workers; each
/// run owns its private state. Workers fold runs into local count matrices
/// which are merged pairwise at the join point, an associative and
/// commutative reduction, so completion order never shows in the result.
pub fn run_simulation(
    bracket: &Bracket,
    teams: &Teams,
    mode: &dyn SimulationMode,
    config: &SimulationConfig,
) -> TournamentSimulationResult {
    let started = Instant::now();
    let profile = ModeProfile::of(mode);
    let counts = dispatch(bracket, teams, mode, &profile, config);

    let elapsed = started.elapsed();
    if elapsed > config.target_duration {
        warn!(
            "simulation batch of {} runs took {elapsed:?}, over the {:?} target",
            config.simulations, config.target_duration
        );
    } else {
        debug!(
            "simulation batch of {} runs finished in {elapsed:?}",
            config.simulations
        );
    }

    let tournament_type = teams
        .values()
        .next()
        .map(|team| team.tournament_type)
        .unwrap_or(TournamentType::Mens);
    aggregate(&counts, teams, mode.id(), mode.name(), tournament_type)
}

/// Look the mode up in the installed global registry, then run.
pub fn run_simulation_for_mode(
    bracket: &Bracket,
    teams: &Teams,
    mode_id: &str,
    config: &SimulationConfig,
) -> Result<TournamentSimulationResult, EngineError> {
    let mode = crate::mode::registry::global()?.create(mode_id)?;
    Ok(run_simulation(bracket, teams, mode.as_ref(), config))
}

fn dispatch(
    bracket: &Bracket,
    teams: &Teams,
    mode: &dyn SimulationMode,
    profile: &ModeProfile,
    config: &SimulationConfig,
) -> CountMatrix {
    let workers = config.worker_count();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build();
    match pool {
        Ok(pool) => pool.install(|| parallel_counts(bracket, teams, mode, profile, config)),
        Err(err) => {
            // A pool failure is a resource problem, not a modeling one;
            // fall back to a sequential pass rather than dropping the batch.
            warn!("failed to build worker pool ({err}); running sequentially");
            sequential_counts(bracket, teams, mode, profile, config)
        }
    }
}

fn parallel_counts(
    bracket: &Bracket,
    teams: &Teams,
    mode: &dyn SimulationMode,
    profile: &ModeProfile,
    config: &SimulationConfig,
) -> CountMatrix {
    (0..u64::from(config.simulations))
        .into_par_iter()
        .fold(CountMatrix::new, |mut counts, run_index| {
            let mut rng = SimRng::for_run(config.base_seed, run_index);
            simulate_run(
                bracket,
                teams,
                mode,
                profile,
                config.live_gamma,
                &mut rng,
                &mut counts,
            );
            counts
        })
        .reduce(CountMatrix::new, CountMatrix::merge)
}

fn sequential_counts(
    bracket: &Bracket,
    teams: &Teams,
    mode: &dyn SimulationMode,
    profile: &ModeProfile,
    config: &SimulationConfig,
) -> CountMatrix {
    let mut counts = CountMatrix::new();
    for run_index in 0..u64::from(config.simulations) {
        let mut rng = SimRng::for_run(config.base_seed, run_index);
        simulate_run(
            bracket,
            teams,
            mode,
            profile,
            config.live_gamma,
            &mut rng,
            &mut counts,
        );
    }
    counts
}
