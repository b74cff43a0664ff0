use cw_core::{Cell, CellKind, OrganismId, Vec2, World};
use cw_simulation::SimConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Body plan of a seeded organism, head to tail. The head owns the reserve.
const BODY: [CellKind; 4] = [
    CellKind::Reproducer,
    CellKind::Mouth,
    CellKind::Structure,
    CellKind::Connector,
];

/// Spacing between neighboring body cells, equal to two default radii.
const SEGMENT_LENGTH: f32 = 1.0;
const LINK_STIFFNESS: f32 = 0.5;

/// Organisms and food stay clear of the walls by this fraction.
const MARGIN: f32 = 0.9;

/// Build a reproducible starting scene.
///
/// Each organism is a straight chain following [`BODY`], linked both ways
/// between neighbors, pointing in a random direction. The head starts a few
/// meals short of reproducing.
pub fn seed_world(
    config: &SimConfig,
    seed: u64,
    organisms: usize,
    food: usize,
) -> Result<World, String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let bounds = config.world_half_extents * MARGIN;
    let mut world = World::new();

    for _ in 0..organisms {
        let head_at = random_point(&mut rng, bounds);
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let step = Vec2::from_angle(angle) * SEGMENT_LENGTH;
        let energy = config.reproduction_cost - 4.0 * config.food_value;
        spawn_chain(&mut world, head_at, step, energy.max(0.0))?;
    }

    for _ in 0..food {
        let at = random_point(&mut rng, bounds);
        world
            .add_cell(Cell::food(at, config.food_value))
            .map_err(|e| format!("failed to place food: {e}"))?;
    }

    tracing::debug!(
        organisms,
        food,
        cells = world.cell_count(),
        "seeded scene"
    );
    Ok(world)
}

fn random_point(rng: &mut StdRng, bounds: Vec2) -> Vec2 {
    Vec2::new(
        rng.random_range(-bounds.x..bounds.x),
        rng.random_range(-bounds.y..bounds.y),
    )
}

fn spawn_chain(world: &mut World, head_at: Vec2, step: Vec2, energy: f32) -> Result<(), String> {
    let head = Cell::new(BODY[0], head_at).with_energy(energy);
    let organism = OrganismId(head.id);
    let mut previous = world
        .add_cell(head)
        .map_err(|e| format!("failed to spawn organism: {e}"))?;

    for (i, kind) in BODY.iter().enumerate().skip(1) {
        let at = head_at + step * i as f32;
        let id = world
            .add_cell(Cell::new(*kind, at).with_organism(organism))
            .map_err(|e| format!("failed to spawn organism: {e}"))?;
        world
            .link(previous, id, SEGMENT_LENGTH, LINK_STIFFNESS)
            .map_err(|e| format!("failed to link organism: {e}"))?;
        previous = id;
    }
    Ok(())
}
