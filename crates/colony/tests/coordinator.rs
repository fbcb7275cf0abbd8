use colony::actions::Action;
use colony::core::{
    BodyPart, ColonyConfig, ColonyMemory, EntityId, EntityKind, ManualCpu, Position, RegionId,
    ResourceKind, StructureKind, TickContext, WorldView,
};
use colony::sim::{demo_world, GridWorld};
use colony::Colony;

fn damaged_road(world: &mut GridWorld, pos: Position, hits: u32) -> EntityId {
    let id = world.add_built(pos, StructureKind::Road);
    if let Some(EntityKind::Structure(road)) = world.entity_mut(id).map(|e| &mut e.kind) {
        road.hits = hits;
    }
    id
}

#[test]
fn first_tick_generates_assigns_and_plans() {
    let mut world = demo_world(6);
    let mut colony = Colony::new(&ColonyConfig::default());
    let cpu = ManualCpu::new(100.0);

    let report = colony.tick(&TickContext::new(0), &mut world, &cpu);

    assert!(report.generated > 0);
    assert!(report.assigned > 0);
    assert_eq!(report.execution.processed, 6);
    assert_eq!(report.execution.skipped, 0);
    assert_eq!(report.plans.len(), 1);
    assert_eq!(report.plans[0].region, Some(RegionId(0)));
    assert_eq!(report.plans[0].placed.len(), 1);
}

#[test]
fn agents_leave_traffic_behind() {
    let mut world = demo_world(6);
    let mut colony = Colony::new(&ColonyConfig::default());
    let cpu = ManualCpu::new(100.0);

    let mut moved = 0;
    for _ in 0..10 {
        let ctx = TickContext::new(world.tick());
        let report = colony.tick(&ctx, &mut world, &cpu);
        moved += report.movement.outcomes.values().filter(|o| o.moved).count();
        world.end_tick();
    }

    assert!(moved > 0);
    assert!(!colony.arbiter().heatmap().is_empty());
    assert_eq!(world.owned_agents().len(), 6);
}

#[test]
fn exhausted_budget_defers_everyone() {
    let mut world = demo_world(4);
    let mut colony = Colony::new(&ColonyConfig::default());
    let cpu = ManualCpu::new(100.0);
    cpu.set_used(95.0);

    let report = colony.tick(&TickContext::new(0), &mut world, &cpu);

    assert_eq!(report.execution.processed, 0);
    assert_eq!(report.execution.skipped, 4);
}

#[test]
fn state_survives_a_save_and_load() {
    let mut world = demo_world(6);
    let mut colony = Colony::new(&ColonyConfig::default());
    let cpu = ManualCpu::new(100.0);
    for _ in 0..5 {
        let ctx = TickContext::new(world.tick());
        colony.tick(&ctx, &mut world, &cpu);
        world.end_tick();
    }

    let mut memory = ColonyMemory::default();
    colony.save(&mut memory).expect("save");
    let json = serde_json::to_string(&memory).expect("encode");
    let memory = ColonyMemory::from_json(Some(&json));

    let mut restored = Colony::new(&ColonyConfig::default());
    restored.load(&memory);

    assert_eq!(restored.tasks().len(), colony.tasks().len());
    assert_eq!(
        restored.arbiter().requests().count(),
        colony.arbiter().requests().count()
    );
    assert_eq!(
        restored.arbiter().heatmap().len(),
        colony.arbiter().heatmap().len()
    );
}

#[test]
fn busy_roads_are_repaired_before_quiet_ones() {
    let home = RegionId(0);
    let mut world = GridWorld::new();
    world.add_region(home, true);
    let quiet = damaged_road(&mut world, Position::new(home, 5, 5), 100);
    let busy = damaged_road(&mut world, Position::new(home, 9, 9), 4000);
    let agent = world.add_agent(
        Position::new(home, 7, 7),
        vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move, BodyPart::Move],
    );
    if let Some(state) = world.agent_mut(agent) {
        state.store.add(ResourceKind::Energy, 50);
    }

    let mut colony = Colony::new(&ColonyConfig::default());
    for tick in 0..5 {
        colony.arbiter_mut().heatmap_mut().record(Position::new(home, 9, 9), tick);
    }
    let report = colony.tick(&TickContext::new(0), &mut world, &ManualCpu::new(100.0));

    assert_eq!(report.repairs_ranked, 2);
    assert_eq!(
        colony.tasks().assignment(agent).map(|t| t.action.clone()),
        Some(Action::Repair {
            target: busy,
            until: None,
        })
    );
    assert!(colony
        .tasks()
        .tasks()
        .any(|t| t.action.primary_target() == Some(quiet) && t.is_pending()));
}
