use colony_core::{
    ActionCode, BodyPart, Direction, EntityKind, Position, Primitive, RegionId, ResourceKind,
    StructureKind, Terrain, WorldMut, WorldView,
};
use colony_sim::GridWorld;

fn at(x: i32, y: i32) -> Position {
    Position::new(RegionId(0), x, y)
}

fn walker() -> Vec<BodyPart> {
    vec![BodyPart::Move, BodyPart::Move]
}

fn world() -> GridWorld {
    let mut world = GridWorld::new();
    world.add_region(RegionId(0), true);
    world
}

#[test]
fn swapping_agents_trade_cells() {
    let mut world = world();
    let a = world.add_agent(at(5, 5), walker());
    let b = world.add_agent(at(6, 5), walker());

    assert_eq!(world.move_agent(a, Direction::Right), ActionCode::Ok);
    assert_eq!(world.move_agent(b, Direction::Left), ActionCode::Ok);
    world.end_tick();

    assert_eq!(world.position(a), Some(at(6, 5)));
    assert_eq!(world.position(b), Some(at(5, 5)));
}

#[test]
fn chains_move_together_and_stationary_agents_block() {
    let mut world = world();
    let a = world.add_agent(at(5, 5), walker());
    let b = world.add_agent(at(6, 5), walker());
    let c = world.add_agent(at(8, 5), walker());
    let idle = world.add_agent(at(9, 5), walker());

    world.move_agent(a, Direction::Right);
    world.move_agent(b, Direction::Right);
    world.move_agent(c, Direction::Right);
    world.end_tick();

    assert_eq!(world.position(a), Some(at(6, 5)));
    assert_eq!(world.position(b), Some(at(7, 5)));
    assert_eq!(world.position(c), Some(at(8, 5)));
    assert_eq!(world.position(idle), Some(at(9, 5)));
}

#[test]
fn walls_and_fatigue_reject_moves() {
    let mut world = world();
    world.set_terrain(at(6, 5), Terrain::Wall);
    let a = world.add_agent(at(5, 5), vec![BodyPart::Work, BodyPart::Move]);
    let b = world.add_agent(at(5, 7), vec![BodyPart::Work, BodyPart::Work, BodyPart::Move]);

    assert_eq!(world.move_agent(a, Direction::Right), ActionCode::InvalidArgs);
    assert_eq!(world.move_agent(b, Direction::Bottom), ActionCode::Ok);
    world.end_tick();
    assert_eq!(world.move_agent(b, Direction::Bottom), ActionCode::Tired);
}

#[test]
fn harvest_fills_the_agent_and_drains_the_source() {
    let mut world = world();
    let source = world.add_source(at(10, 10), 3000);
    let agent = world.add_agent(at(11, 10), vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move]);

    assert_eq!(
        world.apply(agent, Primitive::Harvest { target: source }),
        ActionCode::Ok
    );
    let carried = world.entity(agent).and_then(|e| e.store()).map(|s| s.get(ResourceKind::Energy));
    assert_eq!(carried, Some(2));
    assert!(matches!(
        world.entity(source).map(|e| &e.kind),
        Some(EntityKind::Source { energy: 2998, .. })
    ));
    assert_eq!(world.attempts().len(), 1);
}

#[test]
fn out_of_range_targets_are_reported() {
    let mut world = world();
    let source = world.add_source(at(10, 10), 3000);
    let agent = world.add_agent(at(15, 10), vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move]);
    assert_eq!(
        world.apply(agent, Primitive::Harvest { target: source }),
        ActionCode::NotInRange
    );
}

#[test]
fn finishing_a_site_creates_the_structure() {
    let mut world = world();
    let site = world.add_site(at(12, 12), StructureKind::Road);
    let builder = world.add_agent(
        at(12, 14),
        vec![BodyPart::Work, BodyPart::Carry, BodyPart::Carry, BodyPart::Move],
    );
    if let Some(agent) = world.agent_mut(builder) {
        agent.store.add(ResourceKind::Energy, 100);
    }

    let mut code = ActionCode::Ok;
    let mut ticks = 0;
    while world.entity(site).is_some() && code.is_ok() {
        code = world.apply(builder, Primitive::Build { target: site });
        ticks += 1;
    }
    assert_eq!(code, ActionCode::NotEnoughResources);
    assert_eq!(ticks, 21);

    while world.entity(site).is_some() {
        if let Some(agent) = world.agent_mut(builder) {
            if agent.store.is_empty() {
                agent.store.add(ResourceKind::Energy, 100);
            }
        }
        assert!(world.apply(builder, Primitive::Build { target: site }).is_ok());
    }
    assert!(world.has_structure_at(at(12, 12), StructureKind::Road));
    assert_eq!(world.move_cost(at(12, 12)), Some(1));
}

#[test]
fn spawning_agents_are_busy_until_the_next_tick() {
    let mut world = world();
    let spawn = world.add_built(at(20, 20), StructureKind::Spawn);
    if let Some(store) = world.entity_mut(spawn).and_then(|e| e.store_mut()) {
        store.add(ResourceKind::Energy, 300);
    }

    let op = Primitive::SpawnAgent {
        body: vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move],
        name: "worker".into(),
    };
    assert_eq!(world.apply(spawn, op.clone()), ActionCode::Ok);
    assert_eq!(world.apply(spawn, op), ActionCode::Busy);

    let agent = world.owned_agents()[0];
    assert_eq!(world.move_agent(agent, Direction::Top), ActionCode::Busy);
    world.end_tick();
    assert_ne!(world.move_agent(agent, Direction::Top), ActionCode::Busy);
}
