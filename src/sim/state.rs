//! Simulation context
//!
//! Everything a tick touches lives here: entity storage, the spatial index,
//! the seeded RNG and the formation managers. Nothing is global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::agent::{Agent, ObjectKind};
use super::arena::{Arena, Handle};
use super::formation::{AnchorPoint, FormationKind, FormationManager, FormationPattern, Loadout};
use super::quadtree::QuadTree;
use super::steering::PrioritySteering;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct SimState {
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub agents: Arena<Agent>,
    /// Rebuilt from scratch every tick
    pub quadtree: QuadTree<Handle>,
    pub formations: Vec<FormationManager>,
    /// Formation target; enemies chase it
    pub player: Option<Handle>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl SimState {
    pub fn new(mut settings: Settings, seed: u64) -> Self {
        settings.sanitize();
        let quadtree = QuadTree::new(settings.world_bounds(), settings.quadtree_capacity);
        Self {
            agents: Arena::with_capacity(settings.max_entities),
            quadtree,
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            formations: Vec::new(),
            player: None,
            time_ticks: 0,
        }
    }

    /// Store an agent; `None` once the entity cap is reached
    pub fn spawn(&mut self, mut agent: Agent) -> Option<Handle> {
        agent.steering.epsilon = self.settings.priority_epsilon;
        agent.sync_collider();
        self.agents.insert(agent)
    }

    /// Spawn the player and make it the formation target
    pub fn spawn_player(&mut self, position: Vec2) -> Option<Handle> {
        let handle = self.spawn(Agent::player(position, self.settings.enemy))?;
        self.player = Some(handle);
        Some(handle)
    }

    /// Enemy using the configured `BehaviorData` and the chaser steering
    pub fn spawn_enemy(&mut self, position: Vec2, loadout: Loadout) -> Option<Handle> {
        self.spawn(Agent::enemy(position, self.settings.enemy, loadout))
    }

    pub fn spawn_wanderer(&mut self, position: Vec2, orientation: f32) -> Option<Handle> {
        let mut agent = Agent::enemy(position, self.settings.enemy, Loadout::Unarmed)
            .with_steering(PrioritySteering::wanderer());
        agent.orientation = crate::normalize_angle(orientation);
        self.spawn(agent)
    }

    pub fn spawn_obstacle(&mut self, position: Vec2, width: f32, height: f32) -> Option<Handle> {
        self.spawn(Agent::obstacle(position, width, height))
    }

    /// Remove an entity and drop it from every formation
    pub fn despawn(&mut self, handle: Handle) -> Option<Agent> {
        let agent = self.agents.remove(handle)?;
        for formation in &mut self.formations {
            formation.remove_character(handle);
        }
        if self.player == Some(handle) {
            self.player = None;
        }
        Some(agent)
    }

    pub fn agent(&self, handle: Handle) -> Option<&Agent> {
        self.agents.get(handle)
    }

    pub fn agent_mut(&mut self, handle: Handle) -> Option<&mut Agent> {
        self.agents.get_mut(handle)
    }

    pub fn player_position(&self) -> Option<Vec2> {
        self.player.and_then(|h| self.agents.get(h)).map(|p| p.position)
    }

    /// Register a formation manager; returns its index
    pub fn add_formation(&mut self, manager: FormationManager) -> usize {
        self.formations.push(manager);
        self.formations.len() - 1
    }

    /// Formation of `kind` anchored at `position`, using the configured params
    pub fn create_formation(&mut self, kind: FormationKind, slot_count: usize, position: Vec2) -> usize {
        let params = self.settings.formation;
        let pattern = FormationPattern::new(kind, slot_count, params.slot_spacing);
        let anchor = AnchorPoint::new(position, params.anchor_speed);
        self.add_formation(FormationManager::new(pattern, anchor, params))
    }

    pub fn formation(&self, index: usize) -> Option<&FormationManager> {
        self.formations.get(index)
    }

    pub fn formation_mut(&mut self, index: usize) -> Option<&mut FormationManager> {
        self.formations.get_mut(index)
    }

    /// Which formation, if any, an agent belongs to
    pub fn formation_of(&self, handle: Handle) -> Option<usize> {
        self.formations.iter().position(|f| f.contains(handle))
    }

    /// Put an enemy into a formation, switching it to formation steering
    ///
    /// False for unknown formations or agents, non-enemies, or agents already
    /// in a formation.
    pub fn join_formation(&mut self, index: usize, handle: Handle) -> bool {
        if index >= self.formations.len() || self.formation_of(handle).is_some() {
            return false;
        }
        let epsilon = self.settings.priority_epsilon;
        let Some(agent) = self.agents.get_mut(handle) else {
            return false;
        };
        if agent.kind != ObjectKind::Agent {
            return false;
        }

        agent.steering = PrioritySteering::formation_member();
        agent.steering.epsilon = epsilon;
        let loadout = agent.loadout;
        self.formations[index].add_character(handle, loadout)
    }

    /// Take an agent out of its formation and back to chasing
    pub fn leave_formation(&mut self, handle: Handle) -> bool {
        let Some(index) = self.formation_of(handle) else {
            return false;
        };
        self.formations[index].remove_character(handle);
        let epsilon = self.settings.priority_epsilon;
        if let Some(agent) = self.agents.get_mut(handle) {
            agent.steering = PrioritySteering::chaser();
            agent.steering.epsilon = epsilon;
        }
        true
    }
}
