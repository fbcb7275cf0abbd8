use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use colony_core::{
    ActionCode, AgentId, BodyPart, ColonyConfig, ColonyMemory, MoveIntent, MoveRecord,
    MovementConfig, MovementSink, Position, TickContext, TrafficConfig, WorldMut, WorldView,
};

use crate::{first_step, TrafficHeatmap};

/// Whether `agent` would have a step accepted this tick.
fn ready_to_move<W: WorldView + ?Sized>(world: &W, agent: AgentId) -> bool {
    world
        .agent(agent)
        .and_then(|e| e.as_agent())
        .is_some_and(|s| s.fatigue == 0 && !s.spawning && s.has(BodyPart::Move))
}

/// An outstanding "get me there" request, kept until satisfied or stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementRequest {
    pub agent: AgentId,
    pub destination: Position,
    pub range: u32,
    pub priority: u32,
    pub requested_at: u64,
}

impl MovementRequest {
    fn to_record(self) -> MoveRecord {
        MoveRecord {
            agent: self.agent,
            x: self.destination.x,
            y: self.destination.y,
            region: self.destination.region,
            range: self.range,
            priority: self.priority,
            requested_at: self.requested_at,
        }
    }

    fn from_record(record: &MoveRecord) -> Self {
        Self {
            agent: record.agent,
            destination: record.destination(),
            range: record.range,
            priority: record.priority,
            requested_at: record.requested_at,
        }
    }
}

/// What happened to one agent's request this pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// A step was issued and accepted by the world.
    pub moved: bool,
    /// Contention was detected, whether resolved by a swap or by waiting.
    pub collision_avoided: bool,
    /// Already within range; the request was retired.
    pub arrived: bool,
    /// No path, a cross-region destination, or a world refusal.
    pub blocked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArbitrationReport {
    pub tick: u64,
    pub outcomes: BTreeMap<AgentId, MoveOutcome>,
}

impl ArbitrationReport {
    pub fn outcome(&self, agent: AgentId) -> Option<MoveOutcome> {
        self.outcomes.get(&agent).copied()
    }

    fn count(&self, f: impl Fn(&MoveOutcome) -> bool) -> usize {
        self.outcomes.values().filter(|o| f(o)).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Moved: {}, Arrived: {}, Avoided: {}, Blocked: {}",
            self.count(|o| o.moved),
            self.count(|o| o.arrived),
            self.count(|o| o.collision_avoided),
            self.count(|o| o.blocked),
        )
    }
}

/// Resolves movement contention once per tick and records traffic.
#[derive(Debug, Clone)]
pub struct MovementArbiter {
    config: MovementConfig,
    requests: BTreeMap<AgentId, MovementRequest>,
    heatmap: TrafficHeatmap,
}

impl Default for MovementArbiter {
    fn default() -> Self {
        Self::new(MovementConfig::default(), TrafficConfig::default())
    }
}

impl MovementSink for MovementArbiter {
    fn request_move(&mut self, ctx: &TickContext, intent: MoveIntent) {
        self.requests.insert(
            intent.agent,
            MovementRequest {
                agent: intent.agent,
                destination: intent.destination,
                range: intent.range,
                priority: intent.priority,
                requested_at: ctx.tick,
            },
        );
    }
}

impl MovementArbiter {
    pub fn new(config: MovementConfig, traffic: TrafficConfig) -> Self {
        Self {
            config,
            requests: BTreeMap::new(),
            heatmap: TrafficHeatmap::new(traffic),
        }
    }

    pub fn from_config(config: &ColonyConfig) -> Self {
        Self::new(config.movement.clone(), config.traffic.clone())
    }

    pub fn request(&self, agent: AgentId) -> Option<&MovementRequest> {
        self.requests.get(&agent)
    }

    pub fn requests(&self) -> impl Iterator<Item = &MovementRequest> {
        self.requests.values()
    }

    pub fn heatmap(&self) -> &TrafficHeatmap {
        &self.heatmap
    }

    pub fn heatmap_mut(&mut self) -> &mut TrafficHeatmap {
        &mut self.heatmap
    }

    /// Decay the heatmap when due.
    pub fn maintain(&mut self, ctx: &TickContext) -> bool {
        self.heatmap.maintain(ctx)
    }

    /// Resolve every outstanding request for this tick.
    ///
    /// Requests run highest priority first, ties by agent id. A cell reserved
    /// earlier in the pass always wins, so a lower-priority agent never takes a
    /// cell from a higher one.
    pub fn arbitrate<W: WorldMut + ?Sized>(&mut self, ctx: &TickContext, world: &mut W) -> ArbitrationReport {
        let mut report = ArbitrationReport {
            tick: ctx.tick,
            ..ArbitrationReport::default()
        };
        let mut order: Vec<(Reverse<u32>, AgentId)> = self
            .requests
            .values()
            .map(|r| (Reverse(r.priority), r.agent))
            .collect();
        order.sort();

        let mut reserved: BTreeMap<Position, AgentId> = BTreeMap::new();
        // Agents whose step this tick was accepted; the cells they stand on will be free.
        let mut leaving: BTreeSet<AgentId> = BTreeSet::new();

        for (_, agent) in order {
            if leaving.contains(&agent) {
                continue;
            }
            let Some(request) = self.requests.get(&agent).copied() else {
                continue;
            };
            let Some(pos) = world.agent(agent).map(|e| e.pos) else {
                self.requests.remove(&agent);
                continue;
            };
            let outcome = report.outcomes.entry(agent).or_default();

            if pos.in_range_to(request.destination, request.range) {
                outcome.arrived = true;
                self.requests.remove(&agent);
                continue;
            }

            let step = first_step(&*world, pos, request.destination, request.range);
            let Some((dir, next)) = step.and_then(|d| pos.offset(d).map(|n| (d, n))) else {
                outcome.blocked = true;
                continue;
            };

            if reserved.get(&next).is_some_and(|holder| *holder != agent) {
                outcome.collision_avoided = true;
                continue;
            }

            let occupant = world
                .agent_at(next)
                .filter(|o| *o != agent && !leaving.contains(o));
            if let Some(occupant) = occupant {
                outcome.collision_avoided = true;
                let yields = self
                    .requests
                    .get(&occupant)
                    .is_some_and(|r| r.priority < request.priority);
                // A mover that cannot step this tick leaves the occupant alone.
                if !yields || !ready_to_move(&*world, agent) {
                    continue;
                }
                if world.move_agent(occupant, dir.reverse()) != ActionCode::Ok {
                    continue;
                }
                leaving.insert(occupant);
                reserved.insert(pos, occupant);
                self.heatmap.record(pos, ctx.tick);
                let swapped = report.outcomes.entry(occupant).or_default();
                swapped.moved = true;
                swapped.collision_avoided = true;
                tracing::debug!(tick = ctx.tick, %agent, %occupant, "agents swapped");
            }

            reserved.insert(next, agent);
            let outcome = report.outcomes.entry(agent).or_default();
            match world.move_agent(agent, dir) {
                ActionCode::Ok => {
                    outcome.moved = true;
                    leaving.insert(agent);
                    self.heatmap.record(next, ctx.tick);
                }
                ActionCode::Tired => {
                    self.heatmap.record(next, ctx.tick);
                }
                code => {
                    outcome.blocked = true;
                    tracing::debug!(tick = ctx.tick, %agent, ?code, "move refused");
                }
            }
        }

        tracing::debug!(tick = ctx.tick, summary = %report.summary(), "movement arbitrated");
        report
    }

    /// Purge stale requests and requests of agents that no longer exist.
    pub fn cleanup<W: WorldView + ?Sized>(&mut self, ctx: &TickContext, world: &W) -> usize {
        let before = self.requests.len();
        let max_age = self.config.max_request_age;
        self.requests.retain(|agent, request| {
            ctx.ticks_since(request.requested_at) <= max_age && world.agent(*agent).is_some()
        });
        before - self.requests.len()
    }

    pub fn save(&self, memory: &mut ColonyMemory) {
        memory.movement = self.requests.values().map(|r| r.to_record()).collect();
        memory.traffic = self.heatmap.to_records();
    }

    pub fn load(&mut self, memory: &ColonyMemory) {
        self.requests = memory
            .movement
            .iter()
            .map(|r| (r.agent, MovementRequest::from_record(r)))
            .collect();
        self.heatmap.restore(&memory.traffic);
    }
}
