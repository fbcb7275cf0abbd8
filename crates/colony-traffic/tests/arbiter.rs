use colony_core::{
    AgentId, BodyPart, ColonyMemory, MoveIntent, MovementConfig, MovementSink, Position, RegionId,
    Terrain, TickContext, TrafficConfig, WorldView,
};
use colony_sim::GridWorld;
use colony_traffic::MovementArbiter;

fn at(x: i32, y: i32) -> Position {
    Position::new(RegionId(0), x, y)
}

/// A one-cell-wide east/west corridor along y = 5.
fn corridor() -> GridWorld {
    let mut world = GridWorld::new();
    world.add_region(RegionId(0), true);
    for x in 0..20 {
        world.set_terrain(at(x, 4), Terrain::Wall);
        world.set_terrain(at(x, 6), Terrain::Wall);
    }
    world
}

fn walker(world: &mut GridWorld, pos: Position) -> AgentId {
    world.add_agent(pos, vec![BodyPart::Move, BodyPart::Move])
}

fn request(arbiter: &mut MovementArbiter, tick: u64, agent: AgentId, dest: Position, range: u32, priority: u32) {
    arbiter.request_move(&TickContext::new(tick), MoveIntent::new(agent, dest, range, priority));
}

#[test]
fn higher_priority_claims_the_contested_cell() {
    let mut world = corridor();
    let low = walker(&mut world, at(5, 5));
    let high = walker(&mut world, at(7, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, low, at(6, 5), 0, 1);
    request(&mut arbiter, 0, high, at(6, 5), 0, 5);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);
    world.end_tick();

    let high_outcome = report.outcome(high).unwrap_or_default();
    let low_outcome = report.outcome(low).unwrap_or_default();
    assert!(high_outcome.moved);
    assert!(!low_outcome.moved);
    assert!(low_outcome.collision_avoided);
    assert_eq!(world.position(high), Some(at(6, 5)));
    assert_eq!(world.position(low), Some(at(5, 5)));
}

#[test]
fn lower_priority_occupant_is_swapped() {
    let mut world = corridor();
    let mover = walker(&mut world, at(5, 5));
    let blocker = walker(&mut world, at(6, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, mover, at(9, 5), 0, 10);
    request(&mut arbiter, 0, blocker, at(2, 5), 0, 1);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);
    world.end_tick();

    for agent in [mover, blocker] {
        let outcome = report.outcome(agent).unwrap_or_default();
        assert!(outcome.moved, "{agent} should have moved");
        assert!(outcome.collision_avoided);
    }
    assert_eq!(world.position(mover), Some(at(6, 5)));
    assert_eq!(world.position(blocker), Some(at(5, 5)));
    assert_eq!(arbiter.heatmap().count(at(5, 5)), 1.0);
    assert_eq!(arbiter.heatmap().count(at(6, 5)), 1.0);
}

#[test]
fn equal_priorities_wait_instead_of_swapping() {
    let mut world = corridor();
    let a = walker(&mut world, at(5, 5));
    let b = walker(&mut world, at(6, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, a, at(9, 5), 0, 3);
    request(&mut arbiter, 0, b, at(2, 5), 0, 3);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);
    world.end_tick();

    assert_eq!(report.summary(), "Moved: 0, Arrived: 0, Avoided: 2, Blocked: 0");
    assert_eq!(world.position(a), Some(at(5, 5)));
    assert_eq!(world.position(b), Some(at(6, 5)));
}

#[test]
fn idle_occupant_is_never_pushed() {
    let mut world = corridor();
    let mover = walker(&mut world, at(5, 5));
    let idle = walker(&mut world, at(6, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, mover, at(9, 5), 0, 10);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);
    world.end_tick();

    assert!(report.outcome(mover).is_some_and(|o| o.collision_avoided && !o.moved));
    assert_eq!(report.outcome(idle), None);
    assert_eq!(world.position(idle), Some(at(6, 5)));
}

#[test]
fn arrival_retires_the_request() {
    let mut world = corridor();
    let agent = walker(&mut world, at(5, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, agent, at(6, 5), 1, 1);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);

    assert!(report.outcome(agent).is_some_and(|o| o.arrived));
    assert!(arbiter.request(agent).is_none());
}

#[test]
fn agents_walk_until_they_arrive() {
    let mut world = corridor();
    let agent = walker(&mut world, at(2, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, agent, at(6, 5), 0, 1);

    for _ in 0..5 {
        let ctx = TickContext::new(world.tick());
        arbiter.arbitrate(&ctx, &mut world);
        world.end_tick();
    }

    assert_eq!(world.position(agent), Some(at(6, 5)));
    assert!(arbiter.request(agent).is_none());
    assert_eq!(arbiter.heatmap().count(at(3, 5)), 1.0);
    assert_eq!(arbiter.heatmap().count(at(6, 5)), 1.0);
    assert_eq!(arbiter.heatmap().count(at(2, 5)), 0.0);
}

#[test]
fn unreachable_destinations_are_blocked() {
    let mut world = corridor();
    let agent = walker(&mut world, at(5, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, agent, Position::new(RegionId(1), 5, 5), 0, 1);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);

    assert!(report.outcome(agent).is_some_and(|o| o.blocked));
    assert!(arbiter.request(agent).is_some());
}

#[test]
fn tired_agents_stay_but_still_heat_the_reserved_cell() {
    let mut world = corridor();
    let agent = walker(&mut world, at(5, 5));
    if let Some(state) = world.agent_mut(agent) {
        state.fatigue = 4;
    }
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, agent, at(9, 5), 0, 1);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);

    let outcome = report.outcome(agent).unwrap_or_default();
    assert!(!outcome.moved);
    assert!(!outcome.blocked);
    assert_eq!(arbiter.heatmap().count(at(6, 5)), 1.0);
    assert_eq!(arbiter.heatmap().count(at(5, 5)), 0.0);
}

#[test]
fn steps_heat_the_cell_entered() {
    let mut world = corridor();
    let agent = walker(&mut world, at(5, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, agent, at(9, 5), 0, 1);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);
    world.end_tick();

    assert!(report.outcome(agent).is_some_and(|o| o.moved));
    assert_eq!(world.position(agent), Some(at(6, 5)));
    assert_eq!(arbiter.heatmap().count(at(6, 5)), 1.0);
    assert_eq!(arbiter.heatmap().count(at(5, 5)), 0.0);
}

#[test]
fn tired_mover_does_not_displace_the_occupant() {
    let mut world = corridor();
    let mover = walker(&mut world, at(5, 5));
    let blocker = walker(&mut world, at(6, 5));
    if let Some(state) = world.agent_mut(mover) {
        state.fatigue = 4;
    }
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, mover, at(9, 5), 0, 10);
    request(&mut arbiter, 0, blocker, at(2, 5), 0, 1);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);
    world.end_tick();

    for agent in [mover, blocker] {
        let outcome = report.outcome(agent).unwrap_or_default();
        assert!(!outcome.moved, "{agent} should have stayed");
        assert!(outcome.collision_avoided);
    }
    assert_eq!(world.position(mover), Some(at(5, 5)));
    assert_eq!(world.position(blocker), Some(at(6, 5)));
    assert!(arbiter.heatmap().is_empty());
}

#[test]
fn dead_agents_lose_their_requests() {
    let mut world = corridor();
    let agent = walker(&mut world, at(5, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 0, agent, at(9, 5), 0, 1);
    world.remove(agent);

    let report = arbiter.arbitrate(&TickContext::new(0), &mut world);

    assert_eq!(report.outcome(agent), None);
    assert_eq!(arbiter.requests().count(), 0);
}

#[test]
fn cleanup_drops_stale_requests() {
    let mut world = corridor();
    let agent = walker(&mut world, at(5, 5));
    let mut arbiter = MovementArbiter::new(
        MovementConfig { max_request_age: 100 },
        TrafficConfig::default(),
    );
    request(&mut arbiter, 0, agent, at(9, 5), 0, 1);

    assert_eq!(arbiter.cleanup(&TickContext::new(100), &world), 0);
    assert_eq!(arbiter.cleanup(&TickContext::new(101), &world), 1);
    assert!(world.agent(agent).is_some());
}

#[test]
fn requests_and_heat_survive_a_save() {
    let mut world = corridor();
    let agent = walker(&mut world, at(5, 5));
    let mut arbiter = MovementArbiter::default();
    request(&mut arbiter, 3, agent, at(9, 5), 0, 7);
    arbiter.heatmap_mut().record(at(5, 5), 3);

    let mut memory = ColonyMemory::default();
    arbiter.save(&mut memory);
    let json = memory.to_json().unwrap_or_default();
    let restored_memory = ColonyMemory::from_json(Some(&json));

    let mut restored = MovementArbiter::default();
    restored.load(&restored_memory);

    assert_eq!(restored.request(agent), arbiter.request(agent));
    assert_eq!(restored.heatmap().count(at(5, 5)), 1.0);
}
