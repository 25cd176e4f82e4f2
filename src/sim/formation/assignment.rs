//! Greedy slot assignment
//!
//! Each member ranks the slots it can afford. Members with the fewest cheap
//! options pick first, taking their cheapest slot not already claimed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pattern::{COST_LIMIT, FormationPattern, Loadout, SlotLocation};
use crate::sim::arena::Handle;
use crate::sim::sort::{quicksort_by, quicksort_by_cost};

/// A formation member as the assigner sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub agent: Handle,
    pub loadout: Loadout,
}

/// One member bound to one slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub agent: Handle,
    /// Index into the pattern's slots
    pub slot: usize,
    pub cost: f32,
}

#[derive(Debug, Clone, Copy)]
struct CostAndSlot {
    cost: f32,
    slot: usize,
}

#[derive(Debug)]
struct CharacterAndSlots {
    agent: Handle,
    /// Affordable slots, cheapest first
    options: Vec<CostAndSlot>,
    /// Σ 1/(1+cost); low ease means few good choices
    ease: f32,
}

impl CharacterAndSlots {
    fn rank(pattern: &FormationPattern, member: &Member) -> Self {
        let mut options: Vec<CostAndSlot> = pattern
            .slots()
            .iter()
            .enumerate()
            .filter_map(|(slot, s)| {
                let cost = pattern.cost(member.loadout, s.role);
                (cost <= COST_LIMIT).then_some(CostAndSlot { cost, slot })
            })
            .collect();

        // Equal costs keep slot order
        quicksort_by(&mut options, |a, b| {
            a.cost.total_cmp(&b.cost).then(a.slot.cmp(&b.slot))
        });
        let ease = options.iter().map(|o| 1.0 / (1.0 + o.cost)).sum();

        Self {
            agent: member.agent,
            options,
            ease,
        }
    }
}

/// Assign members to slots; the result is sorted by agent handle
///
/// No slot is used twice and no assignment exceeds `COST_LIMIT`. Members with
/// no affordable free slot are left out.
pub fn reconstruct_slot_assignments(pattern: &FormationPattern, members: &[Member]) -> Vec<SlotAssignment> {
    let mut characters: Vec<CharacterAndSlots> = members
        .iter()
        .map(|member| CharacterAndSlots::rank(pattern, member))
        .collect();
    quicksort_by(&mut characters, |a, b| {
        a.ease.total_cmp(&b.ease).then(a.agent.cmp(&b.agent))
    });

    let mut filled = vec![false; pattern.slot_count()];
    let mut assignments = Vec::with_capacity(characters.len());
    for character in &characters {
        let free = character.options.iter().find(|o| !filled[o.slot]);
        match free {
            Some(option) => {
                filled[option.slot] = true;
                assignments.push(SlotAssignment {
                    agent: character.agent,
                    slot: option.slot,
                    cost: option.cost,
                });
            }
            None => log::debug!("formation: no affordable slot left for {:?}", character.agent),
        }
    }

    quicksort_by(&mut assignments, |a, b| a.agent.cmp(&b.agent));
    assignments
}

/// Mean location of the occupied slots
///
/// Orientation is the circular mean; a set of facings that cancel out
/// averages to 0.
pub fn drift_offset(pattern: &FormationPattern, assignments: &[SlotAssignment]) -> SlotLocation {
    let slots = pattern.slots();
    let occupied: Vec<_> = assignments
        .iter()
        .filter_map(|a| slots.get(a.slot))
        .collect();
    if occupied.is_empty() {
        return SlotLocation::default();
    }

    let count = occupied.len() as f32;
    let position = occupied.iter().map(|s| s.position).sum::<Vec2>() / count;
    let heading: Vec2 = occupied
        .iter()
        .map(|s| Vec2::new(s.orientation.cos(), s.orientation.sin()))
        .sum();
    let orientation = if heading.length_squared() <= 1.0e-8 {
        0.0
    } else {
        crate::vec_to_orientation(heading)
    };

    SlotLocation {
        position,
        orientation,
    }
}

/// Costs of every slot a loadout could take, cheapest first
pub fn affordable_costs(pattern: &FormationPattern, loadout: Loadout) -> Vec<f32> {
    let mut costs: Vec<f32> = pattern
        .slots()
        .iter()
        .map(|s| pattern.cost(loadout, s.role))
        .filter(|c| *c <= COST_LIMIT)
        .collect();
    quicksort_by_cost(&mut costs, |c| *c);
    costs
}
