//! Formation management
//!
//! A manager owns one pattern, an anchor that walks toward a target (usually
//! the player) and the current member→slot assignment. Each tick it advances
//! the anchor and hands back a world-space target for every assigned member;
//! the tick driver writes those into the members' `BehaviorData`.

mod anchor;
mod assignment;
mod pattern;

pub use anchor::AnchorPoint;
pub use assignment::{Member, SlotAssignment, affordable_costs, drift_offset, reconstruct_slot_assignments};
pub use pattern::{
    COST_LIMIT, FormationKind, FormationPattern, INELIGIBLE_COST, Loadout, Slot, SlotLocation, SlotRole,
};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::Handle;
use super::collider::Collider;
use super::sort::{binary_search_by_key, insertion_point_by_key};
use super::vector::VecExt;
use crate::normalize_angle;

/// Formation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationState {
    /// Anchor still travelling or too few slots on screen
    Forming,
    /// Terminal until `reset`
    InPosition,
}

/// Tunables shared by every formation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationParams {
    /// Anchor travel speed (units/s)
    pub anchor_speed: f32,
    /// Anchor-to-target distance that counts as arrived
    pub arrival_tolerance: f32,
    /// Share of assigned slots that must be inside the view rectangle
    pub visible_fraction: f32,
    /// Distance between neighbouring slots
    pub slot_spacing: f32,
}

impl Default for FormationParams {
    fn default() -> Self {
        Self {
            anchor_speed: 80.0,
            arrival_tolerance: 8.0,
            visible_fraction: 0.75,
            slot_spacing: 48.0,
        }
    }
}

/// World-space slot target for one member
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotTarget {
    pub agent: Handle,
    pub position: Vec2,
    pub orientation: f32,
}

#[derive(Debug, Clone)]
pub struct FormationManager {
    pattern: FormationPattern,
    anchor: AnchorPoint,
    params: FormationParams,
    /// Sorted by handle
    members: Vec<Member>,
    /// Sorted by handle
    assignments: Vec<SlotAssignment>,
    drift: SlotLocation,
    state: FormationState,
}

impl FormationManager {
    pub fn new(pattern: FormationPattern, anchor: AnchorPoint, params: FormationParams) -> Self {
        Self {
            pattern,
            anchor,
            params,
            members: Vec::new(),
            assignments: Vec::new(),
            drift: SlotLocation::default(),
            state: FormationState::Forming,
        }
    }

    pub fn pattern(&self) -> &FormationPattern {
        &self.pattern
    }

    pub fn anchor(&self) -> &AnchorPoint {
        &self.anchor
    }

    pub fn params(&self) -> &FormationParams {
        &self.params
    }

    pub fn state(&self) -> FormationState {
        self.state
    }

    pub fn members(&self) -> impl Iterator<Item = Handle> + '_ {
        self.members.iter().map(|m| m.agent)
    }

    pub fn contains(&self, agent: Handle) -> bool {
        binary_search_by_key(&self.members, &agent, |m| m.agent).is_some()
    }

    /// Add a member and reassign every slot; false if already a member
    pub fn add_character(&mut self, agent: Handle, loadout: Loadout) -> bool {
        if self.contains(agent) {
            return false;
        }
        let at = insertion_point_by_key(&self.members, &agent, |m| m.agent);
        self.members.insert(at, Member { agent, loadout });
        self.reconstruct();
        true
    }

    /// Drop a member and reassign every slot; false if not a member
    pub fn remove_character(&mut self, agent: Handle) -> bool {
        match binary_search_by_key(&self.members, &agent, |m| m.agent) {
            Some(index) => {
                self.members.remove(index);
                self.reconstruct();
                true
            }
            None => false,
        }
    }

    fn reconstruct(&mut self) {
        self.assignments = reconstruct_slot_assignments(&self.pattern, &self.members);
        self.drift = drift_offset(&self.pattern, &self.assignments);
        log::debug!(
            "formation {:?}: {} members, {} assigned",
            self.pattern.kind(),
            self.members.len(),
            self.assignments.len()
        );
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.anchor.target = target;
    }

    pub fn get_slot_assignments(&self) -> &[SlotAssignment] {
        &self.assignments
    }

    pub fn assignment_for(&self, agent: Handle) -> Option<&SlotAssignment> {
        binary_search_by_key(&self.assignments, &agent, |a| a.agent).map(|i| &self.assignments[i])
    }

    /// Drift-corrected world location of one pattern slot
    pub fn slot_location(&self, slot: &Slot) -> SlotLocation {
        let relative = (slot.position - self.drift.position).rotated(self.anchor.orientation);
        let orientation = if slot.locked {
            slot.orientation
        } else {
            normalize_angle(self.anchor.orientation + slot.orientation - self.drift.orientation)
        };
        SlotLocation {
            position: self.anchor.position + relative,
            orientation,
        }
    }

    /// Advance the anchor and compute every assigned member's target
    ///
    /// Also re-evaluates the Forming → InPosition transition against `view`.
    pub fn update_slots(&mut self, dt: f32, view: &Collider) -> Vec<SlotTarget> {
        if self.state == FormationState::Forming {
            self.anchor.advance(dt);
        }

        let slots = self.pattern.slots();
        let targets: Vec<SlotTarget> = self
            .assignments
            .iter()
            .filter_map(|a| {
                let location = self.slot_location(slots.get(a.slot)?);
                Some(SlotTarget {
                    agent: a.agent,
                    position: location.position,
                    orientation: location.orientation,
                })
            })
            .collect();

        if self.state == FormationState::Forming && self.in_position(&targets, view) {
            self.state = FormationState::InPosition;
            log::info!(
                "formation {:?} in position at ({:.1}, {:.1})",
                self.pattern.kind(),
                self.anchor.position.x,
                self.anchor.position.y
            );
        }

        targets
    }

    fn in_position(&self, targets: &[SlotTarget], view: &Collider) -> bool {
        if targets.is_empty() || self.anchor.distance_to_target() > self.params.arrival_tolerance {
            return false;
        }
        let visible = targets.iter().filter(|t| view.contains_point(t.position)).count();
        visible as f32 >= self.params.visible_fraction * targets.len() as f32
    }

    /// Back to Forming; membership and assignments are kept
    pub fn reset(&mut self) {
        if self.state != FormationState::Forming {
            log::info!("formation {:?} reset to forming", self.pattern.kind());
        }
        self.state = FormationState::Forming;
    }
}
