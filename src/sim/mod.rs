//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by arena slot)
//! - No rendering or platform dependencies

pub mod agent;
pub mod arena;
pub mod collider;
pub mod formation;
pub mod quadtree;
pub mod raycast;
pub mod sort;
pub mod state;
pub mod steering;
pub mod tick;
pub mod vector;

pub use agent::{Agent, ObjectKind};
pub use arena::{Arena, Handle};
pub use collider::{Collider, Shape};
pub use formation::{
    AnchorPoint, FormationKind, FormationManager, FormationParams, FormationPattern, FormationState, Loadout,
    SlotAssignment, SlotRole, SlotTarget,
};
pub use quadtree::QuadTree;
pub use raycast::{Ray, RayHit, cast_ray, cast_ray_against_box};
pub use state::SimState;
pub use steering::{AgentView, Behavior, BehaviorData, BlendGroup, Neighbor, PrioritySteering, SteeringOutput};
pub use tick::{TickInput, tick};
pub use vector::{VecExt, clamp_length};
