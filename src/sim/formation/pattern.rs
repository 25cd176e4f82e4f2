//! Formation slot layouts and slot-cost tables
//!
//! Slots are expressed in the anchor's frame: +x is the direction the
//! formation faces, orientations are relative to the anchor heading.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::normalize_angle;

/// Slots costing more than this are never assigned
pub const COST_LIMIT: f32 = 1000.0;

/// Cost of a loadout/role pairing the table has no entry for
pub const INELIGIBLE_COST: f32 = f32::INFINITY;

/// What a slot wants its occupant to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotRole {
    Defender,
    Mage,
    Melee,
    Ranged,
}

/// Weapon an agent carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Loadout {
    Shield,
    Staff,
    #[default]
    Sword,
    Bow,
    Unarmed,
}

/// One position/orientation offset within a pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub position: Vec2,
    pub orientation: f32,
    /// Locked slots keep `orientation` in world space regardless of the anchor
    pub locked: bool,
    pub role: SlotRole,
}

/// Position + orientation pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotLocation {
    pub position: Vec2,
    pub orientation: f32,
}

/// Pattern variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationKind {
    /// Ring of outward-facing slots around the anchor
    DefensiveCircle,
    /// Wedge with its tip at the anchor, opening backwards
    VShape,
}

/// A slot layout plus its cost table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationPattern {
    kind: FormationKind,
    slots: Vec<Slot>,
}

impl FormationPattern {
    /// Generate `slot_count` slots spaced roughly `spacing` apart
    pub fn new(kind: FormationKind, slot_count: usize, spacing: f32) -> Self {
        let slots = match kind {
            FormationKind::DefensiveCircle => defensive_circle(slot_count, spacing),
            FormationKind::VShape => v_shape(slot_count, spacing),
        };
        Self { kind, slots }
    }

    /// Pattern with a hand-made layout
    pub fn from_slots(kind: FormationKind, slots: Vec<Slot>) -> Self {
        Self { kind, slots }
    }

    pub fn kind(&self) -> FormationKind {
        self.kind
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Lock or unlock a slot's facing; false for an unknown index
    pub fn set_locked(&mut self, index: usize, locked: bool) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.locked = locked;
                true
            }
            None => false,
        }
    }

    /// How badly a loadout suits a role in this pattern
    ///
    /// Pairs missing from the table cost `INELIGIBLE_COST`.
    pub fn cost(&self, loadout: Loadout, role: SlotRole) -> f32 {
        match self.kind {
            FormationKind::DefensiveCircle => defensive_circle_cost(loadout, role),
            FormationKind::VShape => v_shape_cost(loadout, role),
        }
    }
}

fn circle_role(index: usize) -> SlotRole {
    match index % 6 {
        0 | 3 => SlotRole::Defender,
        1 | 4 => SlotRole::Melee,
        2 => SlotRole::Mage,
        _ => SlotRole::Ranged,
    }
}

fn defensive_circle(slot_count: usize, spacing: f32) -> Vec<Slot> {
    if slot_count == 0 {
        return Vec::new();
    }
    if slot_count == 1 {
        return vec![Slot {
            position: Vec2::ZERO,
            orientation: 0.0,
            locked: false,
            role: circle_role(0),
        }];
    }

    // Chord between neighbours equals `spacing`
    let step = TAU / slot_count as f32;
    let radius = spacing * 0.5 / (step * 0.5).sin();
    (0..slot_count)
        .map(|i| {
            let angle = normalize_angle(step * i as f32);
            Slot {
                position: Vec2::new(angle.cos(), angle.sin()) * radius,
                orientation: angle,
                locked: false,
                role: circle_role(i),
            }
        })
        .collect()
}

fn v_role(rank: usize) -> SlotRole {
    match rank {
        0 | 2 => SlotRole::Melee,
        1 => SlotRole::Defender,
        r if r % 2 == 1 => SlotRole::Ranged,
        _ => SlotRole::Mage,
    }
}

fn v_shape(slot_count: usize, spacing: f32) -> Vec<Slot> {
    (0..slot_count)
        .map(|i| {
            // Tip first, then alternate left/right wings one rank further back
            let rank = i.div_ceil(2);
            let side = if i % 2 == 1 { 1.0 } else { -1.0 };
            let offset = rank as f32 * spacing;
            Slot {
                position: Vec2::new(-offset, side * offset),
                orientation: 0.0,
                locked: false,
                role: v_role(rank),
            }
        })
        .collect()
}

fn defensive_circle_cost(loadout: Loadout, role: SlotRole) -> f32 {
    match (loadout, role) {
        (Loadout::Shield, SlotRole::Defender) => 0.0,
        (Loadout::Shield, SlotRole::Melee) => 300.0,
        (Loadout::Sword, SlotRole::Melee) => 0.0,
        (Loadout::Sword, SlotRole::Defender) => 400.0,
        (Loadout::Staff, SlotRole::Mage) => 0.0,
        (Loadout::Staff, SlotRole::Ranged) => 500.0,
        (Loadout::Bow, SlotRole::Ranged) => 0.0,
        (Loadout::Bow, SlotRole::Mage) => 600.0,
        (Loadout::Unarmed, SlotRole::Melee) => 800.0,
        (Loadout::Unarmed, SlotRole::Defender) => 900.0,
        (Loadout::Sword, SlotRole::Ranged) => 1500.0,
        _ => INELIGIBLE_COST,
    }
}

fn v_shape_cost(loadout: Loadout, role: SlotRole) -> f32 {
    match (loadout, role) {
        (Loadout::Sword, SlotRole::Melee) => 0.0,
        (Loadout::Sword, SlotRole::Defender) => 200.0,
        (Loadout::Shield, SlotRole::Defender) => 0.0,
        (Loadout::Shield, SlotRole::Melee) => 200.0,
        (Loadout::Bow, SlotRole::Ranged) => 0.0,
        (Loadout::Bow, SlotRole::Mage) => 300.0,
        (Loadout::Staff, SlotRole::Mage) => 0.0,
        (Loadout::Staff, SlotRole::Ranged) => 300.0,
        (Loadout::Unarmed, SlotRole::Melee | SlotRole::Defender) => 900.0,
        _ => INELIGIBLE_COST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_slot_spacing() {
        let pattern = FormationPattern::new(FormationKind::DefensiveCircle, 6, 40.0);
        let slots = pattern.slots();
        assert_eq!(slots.len(), 6);
        let chord = slots[0].position.distance(slots[1].position);
        assert!((chord - 40.0).abs() < 1e-3);
        // Every slot faces away from the centre
        for slot in slots {
            let facing = Vec2::new(slot.orientation.cos(), slot.orientation.sin());
            assert!(facing.dot(slot.position) > 0.0);
        }
    }

    #[test]
    fn test_v_shape_layout() {
        let pattern = FormationPattern::new(FormationKind::VShape, 5, 30.0);
        let slots = pattern.slots();
        assert_eq!(slots[0].position, Vec2::ZERO);
        assert_eq!(slots[1].position, Vec2::new(-30.0, 30.0));
        assert_eq!(slots[2].position, Vec2::new(-30.0, -30.0));
        assert_eq!(slots[4].position, Vec2::new(-60.0, -60.0));
        assert_eq!(slots[0].role, SlotRole::Melee);
        assert_eq!(slots[1].role, SlotRole::Defender);
    }

    #[test]
    fn test_unmatched_pairs_are_ineligible() {
        let circle = FormationPattern::new(FormationKind::DefensiveCircle, 4, 10.0);
        assert_eq!(circle.cost(Loadout::Unarmed, SlotRole::Mage), INELIGIBLE_COST);
        assert!(circle.cost(Loadout::Sword, SlotRole::Ranged) > COST_LIMIT);
        assert_eq!(circle.cost(Loadout::Shield, SlotRole::Defender), 0.0);

        let v = FormationPattern::new(FormationKind::VShape, 4, 10.0);
        assert_eq!(v.cost(Loadout::Staff, SlotRole::Defender), INELIGIBLE_COST);
    }

    #[test]
    fn test_set_locked() {
        let mut pattern = FormationPattern::new(FormationKind::VShape, 3, 10.0);
        assert!(pattern.set_locked(2, true));
        assert!(pattern.slots()[2].locked);
        assert!(!pattern.set_locked(9, true));
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(FormationPattern::new(FormationKind::DefensiveCircle, 0, 10.0).slots().is_empty());
        let single = FormationPattern::new(FormationKind::DefensiveCircle, 1, 10.0);
        assert_eq!(single.slots()[0].position, Vec2::ZERO);
    }
}
