#![forbid(unsafe_code)]
// Enable as many useful Rust warnings as we can stand.
#![warn(
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]

//! # Tournament forecasting engine
//!
//! A deterministic, parallel Monte Carlo pipeline for a 68-team
//! single-elimination basketball bracket.
//!
//! The engine is a pure function of `(bracket, teams, mode, simulation count,
//! RNG seed, optional live snapshot)`:
//!
//! 1. A [`mode::SimulationMode`] parameterizes the win-probability pipeline
//!    in [`prob`]: weighted logistic on normalized metric differentials,
//!    seed-gap blending and time-decayed live-state blending.
//! 2. The propagator in [`sim::engine`] walks the [`bracket::Bracket`] round
//!    by round, sampling winners and advancing them through the slot graph.
//! 3. The parallel driver in [`sim::runner`] splits runs across workers and
//!    merges the per-worker count matrices.
//! 4. The aggregator in [`sim::aggregator`] converts round-reach counts into
//!    advancement probabilities, expected wins, the most likely Final Four
//!    and champion, a volatility index and the biggest projected upset.
//!
//! Everything outside that data flow (network, persistence, scheduling, UI)
//! lives in the embedding runtime, not here.

pub mod bracket;
pub mod error;
#[cfg(test)]
pub(crate) mod mock_data;
pub mod live;
pub mod metrics;
pub mod mode;
pub mod prob;
pub mod rng;
pub mod score;
pub mod sim;
pub mod team;

pub use error::EngineError;
pub use sim::runner::{run_simulation, run_simulation_for_mode, SimulationConfig};
pub use sim::TournamentSimulationResult;
