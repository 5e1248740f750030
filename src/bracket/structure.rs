//! # Bracket structure
//!
//! Validated slot graph plus the advancement wiring derived from it.
//!
//! Construction resolves every `next_slot` reference to a slot index and a
//! [`FeederPos`], so winner advancement during simulation is a pair of
//! vector writes. Validation happens once, here; the propagator assumes a
//! well-formed graph.
use crate::bracket::{BracketError, BracketSlot, FeederPos, Round, SlotId, SlotRegion};
use crate::live::LiveGameState;
use crate::team::{Region, Seed, TeamId, Teams};
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Round-of-64 seed pairings within a region, in game order.
pub const R64_PAIRINGS: [(u8, u8); 8] = [
    (1, 16),
    (8, 9),
    (5, 12),
    (4, 13),
    (6, 11),
    (3, 14),
    (7, 10),
    (2, 15),
];

/// Number of slots in the main draw: 4 regions of 15, two national
/// semifinals and the championship game.
pub const MAIN_DRAW_SLOTS: usize = 63;

/// The static bracket topology.
///
/// Slots are stored in construction order; that order is the deterministic
/// iteration order for everything downstream (ready games, feeder sides,
/// count accumulation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<BracketSlot>", into = "Vec<BracketSlot>")]
pub struct Bracket {
    slots: Vec<BracketSlot>,
    index: HashMap<SlotId, usize>,
    /// Advancement wiring: slot index -> (downstream index, side to fill).
    next: Vec<Option<(usize, FeederPos)>>,
    /// Slot indices per round (dense round index), construction order.
    by_round: Vec<Vec<usize>>,
}

impl Bracket {
    /// Fallible constructor from a slot list.
    ///
    /// # Errors
    ///
    /// Rejects duplicate slot ids, unresolvable `next_slot` references,
    /// slots with more than two feeders, a feeder whose target has no
    /// vacant side, zero or multiple terminal slots, cycles, and a main
    /// draw that is not exactly 63 slots.
    pub fn try_new(slots: Vec<BracketSlot>) -> Result<Self, BracketError> {
        let mut index = HashMap::with_capacity(slots.len());
        for (i, slot) in slots.iter().enumerate() {
            if index.insert(slot.id.clone(), i).is_some() {
                return Err(BracketError::DuplicateSlotId(slot.id.clone()));
            }
        }

        // Feeders per target, in construction order.
        let mut feeders: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut terminals = 0usize;
        for (i, slot) in slots.iter().enumerate() {
            match &slot.next_slot {
                Some(next_id) => {
                    let target = *index.get(next_id).ok_or_else(|| {
                        BracketError::UnknownNextSlot {
                            slot: slot.id.clone(),
                            next: next_id.clone(),
                        }
                    })?;
                    feeders.entry(target).or_default().push(i);
                }
                None => terminals += 1,
            }
        }
        if terminals != 1 {
            return Err(BracketError::TerminalSlotCount(terminals));
        }

        let mut next = vec![None; slots.len()];
        for (&target, sources) in &feeders {
            match sources.as_slice() {
                [single] => {
                    // A lone feeder (a play-in game) must have an
                    // unambiguous vacant side to fill.
                    let target_slot = &slots[target];
                    let pos = match (target_slot.team1, target_slot.team2) {
                        (None, Some(_)) => FeederPos::Team1,
                        (Some(_), None) => FeederPos::Team2,
                        _ => {
                            return Err(BracketError::AmbiguousFeeder {
                                slot: slots[*single].id.clone(),
                                target: target_slot.id.clone(),
                            })
                        }
                    };
                    next[*single] = Some((target, pos));
                }
                [first, second] => {
                    next[*first] = Some((target, FeederPos::Team1));
                    next[*second] = Some((target, FeederPos::Team2));
                }
                _ => return Err(BracketError::TooManyFeeders(slots[target].id.clone())),
            }
        }

        let mut graph = DiGraph::<usize, ()>::new();
        let nodes: Vec<_> = (0..slots.len()).map(|i| graph.add_node(i)).collect();
        for (i, wired) in next.iter().enumerate() {
            if let Some((target, _)) = wired {
                graph.add_edge(nodes[i], nodes[*target], ());
            }
        }
        if petgraph::algo::is_cyclic_directed(&graph) {
            return Err(BracketError::CyclicBracket);
        }

        let main_draw = slots
            .iter()
            .filter(|slot| slot.round != Round::FirstFour)
            .count();
        if main_draw != MAIN_DRAW_SLOTS {
            return Err(BracketError::MainDrawSize(main_draw));
        }

        let mut by_round = vec![Vec::new(); Round::ALL.len()];
        for (i, slot) in slots.iter().enumerate() {
            by_round[slot.round.count_index()].push(i);
        }

        Ok(Self {
            slots,
            index,
            next,
            by_round,
        })
    }

    /// Build the standard 63-slot bracket from a 64-team roster.
    ///
    /// Region games follow the fixed seed pairings in [`R64_PAIRINGS`];
    /// round-of-64 games 1..=8 feed round-of-32 game `ceil(g / 2)` and so on
    /// up the draw. East and West champions meet in the first national
    /// semifinal, South and Midwest in the second.
    ///
    /// # Errors
    ///
    /// The roster must contain exactly 64 teams: four regions with seeds
    /// 1..=16 appearing exactly once each.
    pub fn from_teams(teams: &Teams) -> Result<Self, BracketError> {
        if teams.len() != 64 {
            return Err(BracketError::RosterSize(teams.len()));
        }
        let mut by_placement: HashMap<(Region, Seed), TeamId> = HashMap::new();
        for region in Region::ALL {
            if !teams.values().any(|team| team.region == region) {
                return Err(BracketError::MissingRegion(region));
            }
            for seed in Seed::MIN..=Seed::MAX {
                let seed = Seed::try_new(seed).expect("seed in range");
                let mut found: Vec<TeamId> = teams
                    .values()
                    .filter(|team| team.region == region && team.seed == seed)
                    .map(|team| team.id)
                    .collect();
                if found.len() != 1 {
                    return Err(BracketError::SeedCardinality {
                        region,
                        seed: seed.as_u8(),
                        count: found.len(),
                    });
                }
                by_placement.insert((region, seed), found.pop().expect("checked length"));
            }
        }

        let mut slots = Vec::with_capacity(MAIN_DRAW_SLOTS);
        for region in Region::ALL {
            let zone = SlotRegion::from(region);
            for (g, (high, low)) in R64_PAIRINGS.iter().enumerate() {
                let g = g + 1;
                let high = by_placement[&(region, Seed::try_new(*high).expect("seed in range"))];
                let low = by_placement[&(region, Seed::try_new(*low).expect("seed in range"))];
                slots.push(
                    BracketSlot::new(format!("{region}-r64-g{g}"), Round::RoundOf64, zone)
                        .with_teams(high, low)
                        .advancing_to(format!("{region}-r32-g{}", g.div_ceil(2))),
                );
            }
            for g in 1..=4usize {
                slots.push(
                    BracketSlot::new(format!("{region}-r32-g{g}"), Round::RoundOf32, zone)
                        .advancing_to(format!("{region}-s16-g{}", g.div_ceil(2))),
                );
            }
            for g in 1..=2usize {
                slots.push(
                    BracketSlot::new(format!("{region}-s16-g{g}"), Round::SweetSixteen, zone)
                        .advancing_to(format!("{region}-e8")),
                );
            }
            let semifinal = match region {
                Region::East | Region::West => 1,
                Region::South | Region::Midwest => 2,
            };
            slots.push(
                BracketSlot::new(format!("{region}-e8"), Round::EliteEight, zone)
                    .advancing_to(format!("final-four-g{semifinal}")),
            );
        }
        for g in 1..=2usize {
            slots.push(
                BracketSlot::new(format!("final-four-g{g}"), Round::FinalFour, SlotRegion::FinalFour)
                    .advancing_to("championship"),
            );
        }
        slots.push(BracketSlot::new(
            "championship",
            Round::Championship,
            SlotRegion::FinalFour,
        ));

        Self::try_new(slots)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in construction order.
    pub fn slots(&self) -> &[BracketSlot] {
        &self.slots
    }

    pub fn slot(&self, idx: usize) -> &BracketSlot {
        &self.slots[idx]
    }

    pub fn slot_by_id(&self, id: &SlotId) -> Option<&BracketSlot> {
        self.index.get(id).map(|&i| &self.slots[i])
    }

    pub fn index_of(&self, id: &SlotId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Advancement wiring for a slot.
    pub fn next_of(&self, idx: usize) -> Option<(usize, FeederPos)> {
        self.next[idx]
    }

    /// Slot indices of a round, construction order.
    pub fn round_slots(&self, round: Round) -> &[usize] {
        &self.by_round[round.count_index()]
    }

    /// Index of the championship slot.
    pub fn championship(&self) -> usize {
        self.by_round[Round::Championship.count_index()][0]
    }

    /// Record a winner and advance it into the downstream slot.
    ///
    /// Used by the live blender when locking real results into the base
    /// bracket; Monte Carlo runs never touch the structure.
    pub(crate) fn set_winner(&mut self, idx: usize, winner: TeamId) {
        self.slots[idx].winner = Some(winner);
        if let Some((target, pos)) = self.next[idx] {
            match pos {
                FeederPos::Team1 => self.slots[target].team1 = Some(winner),
                FeederPos::Team2 => self.slots[target].team2 = Some(winner),
            }
        }
    }

    pub(crate) fn attach_live(&mut self, idx: usize, live: LiveGameState) {
        self.slots[idx].live = Some(live);
    }
}

impl TryFrom<Vec<BracketSlot>> for Bracket {
    type Error = BracketError;
    fn try_from(slots: Vec<BracketSlot>) -> Result<Self, Self::Error> {
        Self::try_new(slots)
    }
}

impl From<Bracket> for Vec<BracketSlot> {
    fn from(bracket: Bracket) -> Self {
        bracket.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_data::synthetic_field;

    #[test]
    fn standard_bracket_shape() {
        let (teams, _) = synthetic_field();
        let bracket = Bracket::from_teams(&teams).unwrap();
        assert_eq!(bracket.len(), 63);
        assert_eq!(bracket.round_slots(Round::RoundOf64).len(), 32);
        assert_eq!(bracket.round_slots(Round::RoundOf32).len(), 16);
        assert_eq!(bracket.round_slots(Round::SweetSixteen).len(), 8);
        assert_eq!(bracket.round_slots(Round::EliteEight).len(), 4);
        assert_eq!(bracket.round_slots(Round::FinalFour).len(), 2);
        assert_eq!(bracket.round_slots(Round::Championship).len(), 1);
        // Every round-of-64 slot is populated, everything later starts empty.
        for &i in bracket.round_slots(Round::RoundOf64) {
            assert!(bracket.slot(i).is_ready());
        }
        for round in [Round::RoundOf32, Round::FinalFour, Round::Championship] {
            for &i in bracket.round_slots(round) {
                assert!(bracket.slot(i).teams().is_none());
            }
        }
    }

    #[test]
    fn feeder_order_fills_team1_then_team2() {
        let (teams, _) = synthetic_field();
        let bracket = Bracket::from_teams(&teams).unwrap();
        let g1 = bracket.index_of(&SlotId::from("east-r64-g1")).unwrap();
        let g2 = bracket.index_of(&SlotId::from("east-r64-g2")).unwrap();
        let (t1, p1) = bracket.next_of(g1).unwrap();
        let (t2, p2) = bracket.next_of(g2).unwrap();
        assert_eq!(t1, t2);
        assert_eq!(p1, FeederPos::Team1);
        assert_eq!(p2, FeederPos::Team2);
        assert_eq!(bracket.slot(t1).id, SlotId::from("east-r32-g1"));
    }

    #[test]
    fn final_four_wiring() {
        let (teams, _) = synthetic_field();
        let bracket = Bracket::from_teams(&teams).unwrap();
        for (region, semifinal, pos) in [
            ("east", "final-four-g1", FeederPos::Team1),
            ("west", "final-four-g1", FeederPos::Team2),
            ("south", "final-four-g2", FeederPos::Team1),
            ("midwest", "final-four-g2", FeederPos::Team2),
        ] {
            let e8 = bracket.index_of(&SlotId::from(format!("{region}-e8"))).unwrap();
            let (target, side) = bracket.next_of(e8).unwrap();
            assert_eq!(bracket.slot(target).id, SlotId::from(semifinal));
            assert_eq!(side, pos);
        }
        let champ = bracket.championship();
        assert_eq!(bracket.slot(champ).id, SlotId::from("championship"));
        assert!(bracket.next_of(champ).is_none());
    }

    #[test]
    fn duplicate_slot_id_rejected() {
        let (teams, _) = synthetic_field();
        let mut slots: Vec<BracketSlot> = Bracket::from_teams(&teams).unwrap().into();
        let copy = slots[0].clone();
        slots.push(copy);
        assert!(matches!(
            Bracket::try_new(slots),
            Err(BracketError::DuplicateSlotId(_))
        ));
    }

    #[test]
    fn cycle_rejected() {
        let (teams, _) = synthetic_field();
        let mut slots: Vec<BracketSlot> = Bracket::from_teams(&teams).unwrap().into();
        // Wire two round-of-64 games into each other, leaving each a vacant
        // side so the feeder placement itself is well-formed.
        for id in ["east-r64-g1", "east-r64-g2"] {
            let slot = slots
                .iter_mut()
                .find(|slot| slot.id == SlotId::from(id))
                .unwrap();
            slot.team2 = None;
        }
        slots
            .iter_mut()
            .find(|slot| slot.id == SlotId::from("east-r64-g1"))
            .unwrap()
            .next_slot = Some(SlotId::from("east-r64-g2"));
        slots
            .iter_mut()
            .find(|slot| slot.id == SlotId::from("east-r64-g2"))
            .unwrap()
            .next_slot = Some(SlotId::from("east-r64-g1"));
        assert!(matches!(
            Bracket::try_new(slots),
            Err(BracketError::CyclicBracket)
        ));
    }

    #[test]
    fn unknown_next_slot_rejected() {
        let (teams, _) = synthetic_field();
        let mut slots: Vec<BracketSlot> = Bracket::from_teams(&teams).unwrap().into();
        slots[0].next_slot = Some(SlotId::from("nowhere"));
        assert!(matches!(
            Bracket::try_new(slots),
            Err(BracketError::UnknownNextSlot { .. })
        ));
    }

    #[test]
    fn play_in_slot_feeds_vacant_side() {
        let (teams, _) = synthetic_field();
        let mut slots: Vec<BracketSlot> = Bracket::from_teams(&teams).unwrap().into();
        // Free a side of the first round-of-64 game and feed it from a
        // play-in game between two extra teams.
        let r64 = slots
            .iter_mut()
            .find(|slot| slot.id == SlotId::from("east-r64-g1"))
            .unwrap();
        let displaced = r64.team2.take().unwrap();
        slots.push(
            BracketSlot::new("first-four-g1", Round::FirstFour, SlotRegion::East)
                .with_teams(displaced, TeamId(999))
                .advancing_to("east-r64-g1"),
        );
        let bracket = Bracket::try_new(slots).unwrap();
        let ff = bracket.index_of(&SlotId::from("first-four-g1")).unwrap();
        let (target, pos) = bracket.next_of(ff).unwrap();
        assert_eq!(bracket.slot(target).id, SlotId::from("east-r64-g1"));
        assert_eq!(pos, FeederPos::Team2);
    }

    #[test]
    fn wrong_seed_cardinality_rejected() {
        let (mut teams, _) = synthetic_field();
        // Give two east teams the same seed.
        let east_ids: Vec<_> = teams
            .values()
            .filter(|team| team.region == crate::team::Region::East)
            .map(|team| team.id)
            .collect();
        let seed = teams[&east_ids[0]].seed;
        teams.get_mut(&east_ids[1]).unwrap().seed = seed;
        assert!(matches!(
            Bracket::from_teams(&teams),
            Err(BracketError::SeedCardinality { .. })
        ));
    }

    #[test]
    fn serde_round_trip() {
        let (teams, _) = synthetic_field();
        let bracket = Bracket::from_teams(&teams).unwrap();
        let json = serde_json::to_string(&bracket).unwrap();
        let back: Bracket = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), bracket.len());
        assert_eq!(
            back.slot(back.championship()).id,
            SlotId::from("championship")
        );
    }
}
