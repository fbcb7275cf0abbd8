use colony_core::{
    BodyPart, Position, RegionId, ResourceKind, StructureKind, Terrain, WorldView,
};

use crate::GridWorld;

const HOME: RegionId = RegionId(0);

fn at(x: i32, y: i32) -> Position {
    Position::new(HOME, x, y)
}

/// A single owned region with a spawn, two sources, a controller and some
/// half-finished infrastructure, populated with `agents` general-purpose workers.
pub fn demo_world(agents: usize) -> GridWorld {
    let mut world = GridWorld::new();
    world.add_region(HOME, true);

    for y in 18..=22 {
        world.set_terrain(at(32, y), Terrain::Wall);
    }
    for x in 14..=19 {
        for y in 28..=30 {
            world.set_terrain(at(x, y), Terrain::Swamp);
        }
    }

    let spawn = world.add_built(at(25, 25), StructureKind::Spawn);
    if let Some(store) = world.entity_mut(spawn).and_then(|e| e.store_mut()) {
        store.add(ResourceKind::Energy, 300);
    }
    world.add_built(at(27, 24), StructureKind::Extension);
    world.add_built(at(27, 26), StructureKind::Extension);
    world.add_built(at(23, 25), StructureKind::Tower);

    world.add_source(at(10, 10), 3000);
    world.add_source(at(40, 12), 3000);
    world.add_controller(at(25, 42), 2);

    let container = world.add_built(at(11, 11), StructureKind::Container);
    if let Some(colony_core::EntityKind::Structure(s)) =
        world.entity_mut(container).map(|e| &mut e.kind)
    {
        s.hits = s.hits_max / 2;
    }
    world.add_built(at(30, 30), StructureKind::Wall);
    world.add_site(at(24, 27), StructureKind::Extension);
    world.add_dropped(at(20, 20), ResourceKind::Energy, 80);

    let bodies = [
        vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move, BodyPart::Move],
        vec![BodyPart::Carry, BodyPart::Carry, BodyPart::Move, BodyPart::Move],
        vec![BodyPart::Work, BodyPart::Work, BodyPart::Carry, BodyPart::Move],
    ];
    let mut placed = 0;
    'rows: for y in 20..30 {
        for x in 20..30 {
            if placed == agents {
                break 'rows;
            }
            let pos = at(x, y);
            if world.is_passable(pos) && world.entities_at(pos).is_empty() {
                world.add_agent(pos, bodies[placed % bodies.len()].clone());
                placed += 1;
            }
        }
    }
    tracing::debug!(agents = placed, "demo world ready");
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_places_requested_agents() {
        let world = demo_world(12);
        assert_eq!(world.owned_agents().len(), 12);
        assert_eq!(world.owned_regions(), vec![HOME]);
    }
}
