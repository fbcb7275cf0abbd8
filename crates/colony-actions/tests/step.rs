use colony_actions::{Action, StepStatus, MELEE_RANGE, RANGED_RANGE};
use colony_core::{
    BodyPart, EntityId, Position, RegionId, ResourceKind, StructureKind, TickContext,
    VecMovementSink, WorldView,
};
use colony_sim::GridWorld;

fn at(x: i32, y: i32) -> Position {
    Position::new(RegionId(0), x, y)
}

fn worker() -> Vec<BodyPart> {
    vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move]
}

fn setup() -> (GridWorld, VecMovementSink, TickContext) {
    let mut world = GridWorld::new();
    world.add_region(RegionId(0), true);
    (world, VecMovementSink::default(), TickContext::new(7))
}

#[test]
fn vanished_target_completes_without_touching_the_world() {
    let (mut world, mut mover, ctx) = setup();
    let agent = world.add_agent(at(5, 5), worker());
    let source = world.add_source(at(6, 5), 3000);
    world.remove(source);

    let status = Action::Harvest { source }.step(&ctx, agent, &mut world, &mut mover);

    assert_eq!(status, StepStatus::Complete);
    assert!(world.attempts().is_empty());
    assert!(mover.intents.is_empty());
}

#[test]
fn vanished_agent_completes() {
    let (mut world, mut mover, ctx) = setup();
    let source = world.add_source(at(6, 5), 3000);
    let status =
        Action::Harvest { source }.step(&ctx, EntityId(999), &mut world, &mut mover);
    assert!(status.is_complete());
}

#[test]
fn out_of_range_registers_movement_at_the_action_range() {
    let (mut world, mut mover, ctx) = setup();
    let agent = world.add_agent(at(5, 5), worker());
    if let Some(a) = world.agent_mut(agent) {
        a.store.add(ResourceKind::Energy, 50);
    }
    let source = world.add_source(at(20, 5), 3000);
    let site = world.add_site(at(5, 30), StructureKind::Extension);

    let harvest = Action::Harvest { source };
    assert_eq!(
        harvest.step(&ctx, agent, &mut world, &mut mover),
        StepStatus::Continuing
    );
    let build = Action::Build { site };
    assert_eq!(
        build.step(&ctx, agent, &mut world, &mut mover),
        StepStatus::Continuing
    );

    assert_eq!(mover.intents.len(), 2);
    assert_eq!(mover.intents[0].destination, at(20, 5));
    assert_eq!(mover.intents[0].range, MELEE_RANGE);
    assert_eq!(mover.intents[0].priority, harvest.move_priority());
    assert_eq!(mover.intents[1].destination, at(5, 30));
    assert_eq!(mover.intents[1].range, RANGED_RANGE);
    assert!(world.pending_moves().is_empty());
}

#[test]
fn harvest_continues_until_the_agent_is_full() {
    let (mut world, mut mover, ctx) = setup();
    let agent = world.add_agent(at(5, 5), worker());
    let source = world.add_source(at(6, 5), 3000);
    let action = Action::Harvest { source };

    let mut steps = 0;
    while action.step(&ctx, agent, &mut world, &mut mover) == StepStatus::Continuing {
        steps += 1;
        assert!(steps < 100, "harvest never completed");
    }
    // 50 capacity at 2 energy per Work part per tick.
    assert_eq!(steps, 24);
    assert_eq!(world.attempts().len(), 25);
    let carried = world
        .entity(agent)
        .and_then(|e| e.store())
        .map(|s| s.get(ResourceKind::Energy));
    assert_eq!(carried, Some(50));
}

#[test]
fn failure_codes_complete_immediately() {
    let (mut world, mut mover, ctx) = setup();
    let agent = world.add_agent(at(5, 5), worker());
    let site = world.add_site(at(6, 5), StructureKind::Road);

    // Nothing to build with.
    let status = Action::Build { site }.step(&ctx, agent, &mut world, &mut mover);
    assert_eq!(status, StepStatus::Complete);
    assert_eq!(world.attempts().len(), 1);
    assert!(mover.intents.is_empty());
}

#[test]
fn each_step_issues_exactly_one_primitive() {
    let (mut world, mut mover, ctx) = setup();
    let agent = world.add_agent(at(5, 5), worker());
    let spawn = world.add_built(at(6, 6), StructureKind::Spawn);
    if let Some(a) = world.agent_mut(agent) {
        a.store.add(ResourceKind::Energy, 50);
    }

    let transfer = Action::Transfer {
        target: spawn,
        resource: ResourceKind::Energy,
        amount: None,
    };
    assert!(transfer.step(&ctx, agent, &mut world, &mut mover).is_complete());
    assert_eq!(world.attempts().len(), 1);
    let stored = world
        .entity(spawn)
        .and_then(|e| e.store())
        .map(|s| s.get(ResourceKind::Energy));
    assert_eq!(stored, Some(50));
}

#[test]
fn move_completes_once_in_range() {
    let (mut world, mut mover, ctx) = setup();
    let agent = world.add_agent(at(5, 5), worker());
    let near = Action::Move {
        destination: at(7, 5),
        range: 2,
    };
    let far = Action::Move {
        destination: at(30, 5),
        range: 1,
    };
    assert!(near.step(&ctx, agent, &mut world, &mut mover).is_complete());
    assert_eq!(
        far.step(&ctx, agent, &mut world, &mut mover),
        StepStatus::Continuing
    );
    assert_eq!(mover.intents.len(), 1);
    assert!(world.attempts().is_empty());
}

#[test]
fn structure_actions_never_register_movement() {
    let (mut world, mut mover, ctx) = setup();
    let tower = world.add_built(at(5, 5), StructureKind::Tower);
    if let Some(store) = world.entity_mut(tower).and_then(|e| e.store_mut()) {
        store.add(ResourceKind::Energy, 500);
    }
    let wall = world.add_built(Position::new(RegionId(1), 5, 5), StructureKind::Wall);

    let status = Action::TowerRepair {
        tower,
        target: wall,
    }
    .step(&ctx, EntityId(42), &mut world, &mut mover);

    assert!(status.is_complete());
    assert!(mover.intents.is_empty());
}

#[test]
fn actions_round_trip_through_json() {
    let action = Action::Repair {
        target: EntityId(12),
        until: Some(10_000),
    };
    let json = serde_json::to_string(&action).unwrap();
    assert!(json.contains("\"kind\":\"repair\""));
    let back: Action = serde_json::from_str(&json).unwrap();
    assert_eq!(back, action);
}
