//! Horde headless demo
//!
//! Spawns a player, some walls, two enemy formations and a few wanderers, then
//! runs the fixed-step simulation and logs how the formations settle.
//! Usage: `horde [settings.json]` (log level via `RUST_LOG`).

#[cfg(not(target_arch = "wasm32"))]
use horde::Settings;
#[cfg(not(target_arch = "wasm32"))]
use horde::sim::{FormationKind, FormationState, Loadout, SimState, TickInput, tick};

#[cfg(not(target_arch = "wasm32"))]
const LOADOUT_CYCLE: [Loadout; 5] = [
    Loadout::Shield,
    Loadout::Sword,
    Loadout::Staff,
    Loadout::Bow,
    Loadout::Sword,
];

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Horde (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        None => {
            log::info!("Using default settings");
            Settings::default()
        }
    };

    let mut state = populate(settings);
    run(&mut state);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library on the web; the host drives `tick`
}

/// Build the demo scene; placement is drawn from the seeded RNG
#[cfg(not(target_arch = "wasm32"))]
fn populate(settings: Settings) -> SimState {
    use glam::Vec2;
    use rand::Rng;

    let demo = settings.demo.clone();
    let mut state = SimState::new(settings, demo.seed);
    let world = state.settings.world_bounds();
    let (w, h) = (state.settings.world_width, state.settings.world_height);

    state.spawn_player(world.position);

    for _ in 0..demo.obstacles {
        let position = Vec2::new(
            state.rng.random_range(0.15..0.85) * w,
            state.rng.random_range(0.15..0.85) * h,
        );
        let size = Vec2::new(state.rng.random_range(40.0..120.0), state.rng.random_range(40.0..120.0));
        state.spawn_obstacle(position, size.x, size.y);
    }

    let groups = [
        (FormationKind::DefensiveCircle, demo.circle_members, Vec2::new(0.15 * w, 0.15 * h)),
        (FormationKind::VShape, demo.v_members, Vec2::new(0.85 * w, 0.15 * h)),
    ];
    for (kind, members, anchor) in groups {
        let index = state.create_formation(kind, members, anchor);
        for i in 0..members {
            let offset = Vec2::new((i % 4) as f32, (i / 4) as f32) * 30.0;
            let loadout = LOADOUT_CYCLE[i % LOADOUT_CYCLE.len()];
            let Some(enemy) = state.spawn_enemy(anchor + offset, loadout) else {
                log::warn!("entity cap reached while spawning formation members");
                break;
            };
            state.join_formation(index, enemy);
        }
        if let Some(formation) = state.formation(index) {
            log::info!(
                "{kind:?}: {} slots, {} assigned",
                formation.pattern().slot_count(),
                formation.get_slot_assignments().len()
            );
        }
    }

    for _ in 0..demo.wanderers {
        let position = Vec2::new(state.rng.random_range(0.0..w), state.rng.random_range(0.0..h));
        let heading = state.rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
        state.spawn_wanderer(position, heading);
    }

    log::info!("Spawned {} entities (seed {})", state.agents.len(), state.seed);
    state
}

/// Mean distance from each formation member to its slot target
#[cfg(not(target_arch = "wasm32"))]
fn mean_slot_error(state: &SimState, index: usize) -> f32 {
    let Some(formation) = state.formation(index) else {
        return 0.0;
    };
    let errors: Vec<f32> = formation
        .get_slot_assignments()
        .iter()
        .filter_map(|a| state.agent(a.agent))
        .map(|agent| agent.position.distance(agent.data.target_position))
        .collect();
    if errors.is_empty() {
        0.0
    } else {
        errors.iter().sum::<f32>() / errors.len() as f32
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run(state: &mut SimState) {
    use horde::consts::SIM_DT;

    let demo = state.settings.demo.clone();
    let input = TickInput {
        player_velocity: Some(demo.player_velocity),
    };

    for _ in 0..demo.ticks {
        tick(state, &input, SIM_DT);

        if demo.log_every > 0 && state.time_ticks % u64::from(demo.log_every) == 0 {
            for index in 0..state.formations.len() {
                log::info!(
                    "tick {:>5}  formation {index}: {:?}, mean slot error {:.1}",
                    state.time_ticks,
                    state.formations[index].state(),
                    mean_slot_error(state, index)
                );
            }
        }
    }

    let settled = state
        .formations
        .iter()
        .filter(|f| f.state() == FormationState::InPosition)
        .count();
    println!(
        "Simulated {} ticks: {}/{} formations in position",
        state.time_ticks,
        settled,
        state.formations.len()
    );
}
