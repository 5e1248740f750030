//! # Tournament bracket
//!
//! The single-elimination draw is modeled as a slot graph:
//!
//! - **Structure** ([`Bracket`]): the static topology, validated once at
//!   construction. Slots live in a fixed construction order and winner
//!   advancement is resolved to slot indices, so walking the bracket never
//!   depends on hash-map iteration order.
//! - **Per-run state** ([`crate::sim::engine::RunState`]): a cheap mutable
//!   copy of team assignments and winners, owned by one Monte Carlo run.
//!
//! A bracket is fully described by its slot list; the feeder edges are
//! implicit in each slot's `next_slot` reference. Construction rejects
//! duplicate ids, unresolvable references, over-full feeders, cycles and a
//! malformed main draw, so the propagator can trust the graph wholesale.

pub mod slot;
pub mod structure;

pub use slot::{BracketSlot, FeederPos, Round, SlotId, SlotRegion};
pub use structure::Bracket;

use crate::team::{Region, TeamId};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BracketError {
    #[error("Duplicate slot id '{0}'")]
    DuplicateSlotId(SlotId),
    #[error("Slot '{0}' not present in bracket")]
    UnknownSlot(SlotId),
    #[error("Team {team} is not a participant of slot '{slot}'")]
    InvalidWinner { slot: SlotId, team: TeamId },
    #[error("Slot '{0}' is locked with a different winner")]
    SlotAlreadyLocked(SlotId),
    #[error("Slot '{slot}' advances to unknown slot '{next}'")]
    UnknownNextSlot { slot: SlotId, next: SlotId },
    #[error("Slot '{0}' has more than two feeders")]
    TooManyFeeders(SlotId),
    #[error("Cannot place feeder '{slot}' into '{target}': no vacant side")]
    AmbiguousFeeder { slot: SlotId, target: SlotId },
    #[error("Bracket must have exactly one terminal slot, found {0}")]
    TerminalSlotCount(usize),
    #[error("Bracket contains a cycle")]
    CyclicBracket,
    #[error("Main draw must have 63 slots, found {0}")]
    MainDrawSize(usize),
    #[error("Region {0} missing from the roster")]
    MissingRegion(Region),
    #[error("Region {region} has {count} entries for seed {seed}, expected exactly 1")]
    SeedCardinality { region: Region, seed: u8, count: usize },
    #[error("Roster must contain 64 teams, found {0}")]
    RosterSize(usize),
}
