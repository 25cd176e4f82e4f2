//! Combining behaviors: weighted blend groups arbitrated by priority

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{AgentView, Behavior, BehaviorData, SteeringOutput};
use crate::consts::PRIORITY_EPSILON;

/// A weighted sum of behaviors evaluated together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendGroup {
    entries: Vec<(Behavior, f32)>,
}

impl BlendGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style add
    #[must_use]
    pub fn with(mut self, behavior: Behavior, weight: f32) -> Self {
        self.add(behavior, weight);
        self
    }

    /// Add a behavior; an existing entry of the same behavior is reweighted
    pub fn add(&mut self, behavior: Behavior, weight: f32) {
        match self.entries.iter_mut().find(|(b, _)| *b == behavior) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((behavior, weight)),
        }
    }

    /// Remove a behavior; returns whether it was present
    pub fn remove(&mut self, behavior: Behavior) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(b, _)| *b != behavior);
        self.entries.len() != before
    }

    /// Swap `old` for `new` in place, keeping its slot in evaluation order
    ///
    /// Returns false (and changes nothing) when `old` is not in the group.
    pub fn replace(&mut self, old: Behavior, new: Behavior, weight: f32) -> bool {
        if !self.contains(old) {
            return false;
        }
        if old != new {
            self.remove(new);
        }
        for entry in self.entries.iter_mut().filter(|(b, _)| *b == old) {
            *entry = (new, weight);
        }
        true
    }

    pub fn contains(&self, behavior: Behavior) -> bool {
        self.entries.iter().any(|(b, _)| *b == behavior)
    }

    pub fn weight(&self, behavior: Behavior) -> Option<f32> {
        self.entries
            .iter()
            .find(|(b, _)| *b == behavior)
            .map(|(_, w)| *w)
    }

    pub fn behaviors(&self) -> impl Iterator<Item = Behavior> + '_ {
        self.entries.iter().map(|(b, _)| *b)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weighted sum of every behavior's output
    pub fn steer<R: Rng>(&self, data: &mut BehaviorData, view: &AgentView, rng: &mut R) -> SteeringOutput {
        self.entries
            .iter()
            .fold(SteeringOutput::ZERO, |total, (behavior, weight)| {
                total.combine(behavior.steer(data, view, rng).scale(*weight))
            })
    }
}

/// Ordered blend groups; the first one with a non-trivial output wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritySteering {
    groups: Vec<BlendGroup>,
    /// Outputs at or below this (linear length and |angular|) count as inactive
    pub epsilon: f32,
}

impl Default for PrioritySteering {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            epsilon: PRIORITY_EPSILON,
        }
    }
}

impl PrioritySteering {
    pub fn new(epsilon: f32) -> Self {
        Self {
            groups: Vec::new(),
            epsilon,
        }
    }

    /// Builder-style group append (lowest priority so far)
    #[must_use]
    pub fn with_group(mut self, group: BlendGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn push_group(&mut self, group: BlendGroup) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[BlendGroup] {
        &self.groups
    }

    pub fn group_mut(&mut self, index: usize) -> Option<&mut BlendGroup> {
        self.groups.get_mut(index)
    }

    /// Add a behavior to group `index`; false if there is no such group
    pub fn add(&mut self, index: usize, behavior: Behavior, weight: f32) -> bool {
        self.group_mut(index)
            .map(|group| group.add(behavior, weight))
            .is_some()
    }

    pub fn remove(&mut self, index: usize, behavior: Behavior) -> bool {
        self.group_mut(index)
            .is_some_and(|group| group.remove(behavior))
    }

    pub fn replace(&mut self, index: usize, old: Behavior, new: Behavior, weight: f32) -> bool {
        self.group_mut(index)
            .is_some_and(|group| group.replace(old, new, weight))
    }

    /// Evaluate groups in order, returning the first active result
    ///
    /// Lower groups are never evaluated once a higher one is active, and never
    /// blended with it. If every group is inactive the result is zero.
    pub fn steer<R: Rng>(&self, data: &mut BehaviorData, view: &AgentView, rng: &mut R) -> SteeringOutput {
        self.groups
            .iter()
            .map(|group| group.steer(data, view, rng))
            .find(|output| output.exceeds(self.epsilon))
            .unwrap_or(SteeringOutput::ZERO)
    }

    /// Enemy chasing a target: dodge first, otherwise close in while spreading out
    pub fn chaser() -> Self {
        Self::default()
            .with_group(
                BlendGroup::new()
                    .with(Behavior::CollisionAvoidance, 1.0)
                    .with(Behavior::ObstacleAvoidance, 1.0),
            )
            .with_group(
                BlendGroup::new()
                    .with(Behavior::Separation, 1.0)
                    .with(Behavior::Arrive, 1.0)
                    .with(Behavior::Face, 1.0),
            )
    }

    /// Formation member: same as a chaser but settles into the slot facing
    pub fn formation_member() -> Self {
        Self::default()
            .with_group(
                BlendGroup::new()
                    .with(Behavior::CollisionAvoidance, 1.0)
                    .with(Behavior::ObstacleAvoidance, 1.0),
            )
            .with_group(
                BlendGroup::new()
                    .with(Behavior::Separation, 0.5)
                    .with(Behavior::Arrive, 1.0)
                    .with(Behavior::Align, 1.0),
            )
    }

    /// Idle roamer that still steers around walls
    pub fn wanderer() -> Self {
        Self::default()
            .with_group(BlendGroup::new().with(Behavior::ObstacleAvoidance, 1.0))
            .with_group(
                BlendGroup::new()
                    .with(Behavior::Wander, 1.0)
                    .with(Behavior::Separation, 0.5),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::agent::ObjectKind;
    use crate::sim::arena::Arena;
    use crate::sim::collider::Collider;
    use crate::sim::steering::Neighbor;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_blend_sums_weighted_outputs() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut data = BehaviorData {
            target_position: Vec2::new(100.0, 0.0),
            ..Default::default()
        };
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);

        let seek = Behavior::Seek.steer(&mut data, &view, &mut rng);
        let group = BlendGroup::new().with(Behavior::Seek, 0.5).with(Behavior::Flee, 0.25);
        let blended = group.steer(&mut data, &view, &mut rng);
        assert!((blended.linear - seek.linear * 0.25).length() < 1e-3);
    }

    #[test]
    fn test_add_remove_replace() {
        let mut group = BlendGroup::new().with(Behavior::Seek, 1.0);
        group.add(Behavior::Seek, 2.0);
        assert_eq!(group.weight(Behavior::Seek), Some(2.0));
        assert_eq!(group.behaviors().count(), 1);

        assert!(group.replace(Behavior::Seek, Behavior::Arrive, 0.5));
        assert!(!group.contains(Behavior::Seek));
        assert_eq!(group.weight(Behavior::Arrive), Some(0.5));
        assert!(!group.replace(Behavior::Flee, Behavior::Seek, 1.0));

        assert!(group.remove(Behavior::Arrive));
        assert!(!group.remove(Behavior::Arrive));
        assert!(group.is_empty());
    }

    #[test]
    fn test_priority_prefers_first_active_group() {
        let mut handles = Arena::with_capacity(4);
        let other_pos = Vec2::new(100.0, 2.0);
        let neighbors = [Neighbor {
            handle: handles.insert(()).unwrap(),
            kind: ObjectKind::Agent,
            position: other_pos,
            velocity: Vec2::new(-100.0, 0.0),
            collider: Collider::circle(other_pos, 10.0),
        }];
        let view = AgentView {
            handle: None,
            position: Vec2::ZERO,
            orientation: 0.0,
            velocity: Vec2::new(50.0, 0.0),
            rotation: 0.0,
            collider: Collider::circle(Vec2::ZERO, 10.0),
            neighbors: &neighbors,
        };
        let mut data = BehaviorData {
            target_position: Vec2::new(800.0, 300.0),
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);

        let avoid_only = BlendGroup::new().with(Behavior::CollisionAvoidance, 1.0);
        let expected = avoid_only.steer(&mut data, &view, &mut rng);
        assert!(expected.exceeds(1e-3));

        let priority = PrioritySteering::default()
            .with_group(avoid_only)
            .with_group(BlendGroup::new().with(Behavior::Arrive, 1.0));
        assert_eq!(priority.steer(&mut data, &view, &mut rng), expected);
    }

    #[test]
    fn test_priority_falls_through_inactive_groups() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut data = BehaviorData {
            target_position: Vec2::new(300.0, 0.0),
            ..Default::default()
        };
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);

        let priority = PrioritySteering::chaser();
        let arrive = Behavior::Arrive.steer(&mut data, &view, &mut rng);
        let face = Behavior::Face.steer(&mut data, &view, &mut rng);
        let out = priority.steer(&mut data, &view, &mut rng);
        assert_eq!(out.linear, arrive.linear);
        assert_eq!(out.angular, face.angular);
    }

    #[test]
    fn test_priority_all_inactive_is_zero() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut data = BehaviorData::default();
        let view = AgentView::new(Vec2::ZERO, 0.0, Vec2::ZERO, 0.0);
        let priority = PrioritySteering::default()
            .with_group(BlendGroup::new().with(Behavior::Arrive, 1.0));
        assert_eq!(priority.steer(&mut data, &view, &mut rng), SteeringOutput::ZERO);
        assert_eq!(PrioritySteering::default().steer(&mut data, &view, &mut rng), SteeringOutput::ZERO);
    }

    #[test]
    fn test_priority_group_edits() {
        let mut priority = PrioritySteering::chaser();
        assert!(priority.replace(1, Behavior::Arrive, Behavior::Pursue, 1.0));
        assert!(priority.groups()[1].contains(Behavior::Pursue));
        assert!(priority.remove(0, Behavior::ObstacleAvoidance));
        assert!(priority.add(0, Behavior::Evade, 0.3));
        assert!(!priority.add(5, Behavior::Seek, 1.0));
    }
}
