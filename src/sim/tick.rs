//! Fixed timestep simulation tick
//!
//! Order per tick: rebuild the spatial index, snapshot every agent's
//! neighbours, steer everyone against that snapshot, integrate, then let the
//! formations and chasers pick next tick's targets.

use glam::Vec2;

use super::agent::{Agent, ObjectKind};
use super::arena::Handle;
use super::collider::Collider;
use super::state::SimState;
use super::steering::{Neighbor, SteeringOutput};

/// External commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Overrides the player's velocity for this tick
    pub player_velocity: Option<Vec2>,
}

/// Advance the simulation by one step of `dt` seconds
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) {
    apply_input(state, input);
    rebuild_spatial_index(state);
    gather_neighbors(state);

    let outputs = evaluate_steering(state);
    integrate(state, &outputs, dt);

    update_formations(state, dt);
    retarget_chasers(state);

    state.time_ticks += 1;
}

fn apply_input(state: &mut SimState, input: &TickInput) {
    let Some(velocity) = input.player_velocity else {
        return;
    };
    if let Some(player) = state.player.and_then(|h| state.agents.get_mut(h)) {
        player.velocity = velocity;
    }
}

/// Clear the quadtree and insert every active collider
pub fn rebuild_spatial_index(state: &mut SimState) {
    state.quadtree.clear();
    let mut rejected = 0usize;
    for (handle, agent) in state.agents.iter() {
        if !agent.collider.active {
            continue;
        }
        if !state.quadtree.insert(handle, agent.collider) {
            rejected += 1;
        }
    }
    if rejected > 0 {
        log::debug!("{rejected} colliders outside the world bounds");
    }
}

/// Fill each moving agent's neighbour cache from the quadtree
fn gather_neighbors(state: &mut SimState) {
    let radius = state.settings.query_radius;
    let mut found: Vec<Handle> = Vec::new();

    for handle in state.agents.handles() {
        let Some(agent) = state.agents.get(handle) else {
            continue;
        };
        if agent.is_static() {
            continue;
        }

        found.clear();
        state
            .quadtree
            .query_into(&Collider::circle(agent.position, radius), &mut found);
        let neighbors: Vec<Neighbor> = found
            .iter()
            .filter(|&&other| other != handle)
            .filter_map(|&other| state.agents.get(other).map(|a| a.as_neighbor(other)))
            .collect();

        if let Some(agent) = state.agents.get_mut(handle) {
            agent.neighbors = neighbors;
        }
    }
}

fn evaluate_steering(state: &mut SimState) -> Vec<(Handle, SteeringOutput)> {
    let rng = &mut state.rng;
    state
        .agents
        .iter_mut()
        .filter(|(_, agent)| !agent.is_static())
        .map(|(handle, agent)| (handle, agent.steer(handle, rng)))
        .collect()
}

fn integrate(state: &mut SimState, outputs: &[(Handle, SteeringOutput)], dt: f32) {
    let world = state.settings.world_bounds();
    for (handle, output) in outputs {
        if let Some(agent) = state.agents.get_mut(*handle) {
            agent.integrate(output, dt);
            confine(agent, &world);
        }
    }
}

/// Keep an agent inside the world, killing velocity into the wall
fn confine(agent: &mut Agent, world: &Collider) {
    let (min, max) = (world.min(), world.max());
    let clamped = agent.position.clamp(min, max);
    if clamped.x != agent.position.x {
        agent.velocity.x = 0.0;
    }
    if clamped.y != agent.position.y {
        agent.velocity.y = 0.0;
    }
    agent.position = clamped;
    agent.sync_collider();
}

/// Advance every formation and push slot targets into its members
fn update_formations(state: &mut SimState, dt: f32) {
    let player = state.player_position();
    let view = state
        .settings
        .view_rect(player.unwrap_or_else(|| state.settings.world_bounds().position));

    for formation in &mut state.formations {
        if let Some(target) = player {
            formation.set_target(target);
        }
        let before = formation.state();
        for slot in formation.update_slots(dt, &view) {
            if let Some(agent) = state.agents.get_mut(slot.agent) {
                agent.data.target_position = slot.position;
                agent.data.target_orientation = slot.orientation;
                agent.data.target_velocity = Vec2::ZERO;
            }
        }
        if formation.state() != before {
            log::debug!(
                "tick {}: formation {:?} now {:?}",
                state.time_ticks,
                formation.pattern().kind(),
                formation.state()
            );
        }
    }
}

/// Enemies without a formation slot chase the player
fn retarget_chasers(state: &mut SimState) {
    let Some(player) = state.player.and_then(|h| state.agents.get(h)) else {
        return;
    };
    let (position, velocity) = (player.position, player.velocity);

    let formations = &state.formations;
    for (handle, agent) in state.agents.iter_mut() {
        let slotted = formations.iter().any(|f| f.assignment_for(handle).is_some());
        if agent.kind != ObjectKind::Agent || slotted {
            continue;
        }
        agent.data.target_position = position;
        agent.data.target_velocity = velocity;
    }
}
