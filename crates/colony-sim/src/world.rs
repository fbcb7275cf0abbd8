use std::collections::{BTreeMap, BTreeSet};

use colony_core::{
    ActionCode, AgentState, BodyPart, ControllerState, Direction, Entity, EntityId, EntityKind,
    Position, Primitive, RegionId, ResourceKind, Store, StructureKind, StructureState, Terrain,
    WorldMut, WorldView, REGION_SIZE,
};

/// One primitive attempt, recorded for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub tick: u64,
    pub actor: EntityId,
    pub op: Primitive,
    pub code: ActionCode,
}

#[derive(Debug, Clone)]
pub struct GridWorld {
    tick: u64,
    terrain: BTreeMap<RegionId, Vec<Terrain>>,
    owned_regions: BTreeSet<RegionId>,
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
    move_intents: BTreeMap<EntityId, Position>,
    attempts: Vec<Attempt>,
}

impl Default for GridWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl GridWorld {
    pub fn new() -> Self {
        Self {
            tick: 0,
            terrain: BTreeMap::new(),
            owned_regions: BTreeSet::new(),
            entities: BTreeMap::new(),
            next_id: 1,
            move_intents: BTreeMap::new(),
            attempts: Vec::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Continue from `tick`, e.g. when restoring persisted state.
    pub fn resume_at(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn add_region(&mut self, region: RegionId, owned: bool) {
        self.terrain
            .entry(region)
            .or_insert_with(|| vec![Terrain::Plain; (REGION_SIZE * REGION_SIZE) as usize]);
        if owned {
            self.owned_regions.insert(region);
        }
    }

    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) {
        self.add_region(pos.region, false);
        if let (Some(cells), Some(idx)) = (self.terrain.get_mut(&pos.region), cell_index(pos)) {
            cells[idx] = terrain;
        }
    }

    pub fn insert(&mut self, pos: Position, kind: EntityKind) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.add_region(pos.region, false);
        self.entities.insert(id, Entity::new(id, pos, kind));
        id
    }

    pub fn add_agent(&mut self, pos: Position, body: Vec<BodyPart>) -> EntityId {
        self.insert(pos, EntityKind::Agent(AgentState::new(body)))
    }

    pub fn add_source(&mut self, pos: Position, energy: u32) -> EntityId {
        self.insert(
            pos,
            EntityKind::Source {
                energy,
                capacity: energy.max(3000),
            },
        )
    }

    pub fn add_structure(&mut self, pos: Position, structure: StructureState) -> EntityId {
        self.insert(pos, EntityKind::Structure(structure))
    }

    /// A finished, full-health structure of `kind` with its usual store.
    pub fn add_built(&mut self, pos: Position, kind: StructureKind) -> EntityId {
        self.insert(pos, EntityKind::Structure(built_structure(kind)))
    }

    pub fn add_site(&mut self, pos: Position, structure: StructureKind) -> EntityId {
        self.insert(
            pos,
            EntityKind::Site {
                structure,
                progress: 0,
                total: site_cost(structure),
            },
        )
    }

    pub fn add_controller(&mut self, pos: Position, level: u8) -> EntityId {
        self.insert(
            pos,
            EntityKind::Controller(ControllerState {
                level,
                owned: level > 0,
                reservation: None,
                progress: 0,
                safe_mode_available: 0,
                sign: None,
            }),
        )
    }

    pub fn add_dropped(&mut self, pos: Position, resource: ResourceKind, amount: u32) -> EntityId {
        self.insert(pos, EntityKind::Dropped { resource, amount })
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.move_intents.remove(&id);
        self.entities.remove(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut AgentState> {
        self.entities.get_mut(&id).and_then(|e| e.as_agent_mut())
    }

    pub fn set_position(&mut self, id: EntityId, pos: Position) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.pos = pos;
        }
    }

    pub fn position(&self, id: EntityId) -> Option<Position> {
        self.entities.get(&id).map(|e| e.pos)
    }

    /// Every primitive attempt since the world was built.
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn clear_attempts(&mut self) {
        self.attempts.clear();
    }

    /// Movement intents registered this tick, by agent.
    pub fn pending_moves(&self) -> &BTreeMap<EntityId, Position> {
        &self.move_intents
    }

    /// Resolve movement, then advance timers by one tick.
    pub fn end_tick(&mut self) {
        self.resolve_moves();
        for entity in self.entities.values_mut() {
            match &mut entity.kind {
                EntityKind::Agent(agent) => {
                    let recovery = 2 * agent.count(BodyPart::Move);
                    agent.fatigue = agent.fatigue.saturating_sub(recovery);
                    agent.spawning = false;
                }
                EntityKind::Structure(structure) => {
                    structure.cooldown = structure.cooldown.saturating_sub(1);
                }
                EntityKind::Controller(controller) => {
                    if let Some(ticks) = controller.reservation.as_mut() {
                        *ticks = ticks.saturating_sub(1);
                    }
                }
                _ => {}
            }
        }
        self.tick += 1;
    }

    /// An intent succeeds unless its target cell is still held at the end of the
    /// tick by an agent that is not leaving it. Swaps and chains resolve.
    fn resolve_moves(&mut self) {
        let intents = std::mem::take(&mut self.move_intents);
        let mut accepted: BTreeMap<EntityId, Position> = BTreeMap::new();
        let mut claimed: BTreeSet<Position> = BTreeSet::new();
        for (agent, target) in &intents {
            // First claim wins a contested cell.
            if claimed.insert(*target) {
                accepted.insert(*agent, *target);
            }
        }

        loop {
            let staying: BTreeSet<Position> = self
                .entities
                .values()
                .filter(|e| e.as_agent().is_some() && !accepted.contains_key(&e.id))
                .map(|e| e.pos)
                .collect();
            let before = accepted.len();
            accepted.retain(|_, target| !staying.contains(target));
            if accepted.len() == before {
                break;
            }
        }

        for (agent, target) in accepted {
            self.set_position(agent, target);
        }
    }

    fn record(&mut self, actor: EntityId, op: Primitive, code: ActionCode) -> ActionCode {
        self.attempts.push(Attempt {
            tick: self.tick,
            actor,
            op,
            code,
        });
        code
    }
}

pub(crate) fn site_cost(structure: StructureKind) -> u32 {
    match structure {
        StructureKind::Road => 300,
        StructureKind::Extension => 3000,
        StructureKind::Container => 5000,
        StructureKind::Spawn => 15_000,
        StructureKind::Tower => 5000,
        StructureKind::Wall | StructureKind::Rampart => 1,
        _ => 10_000,
    }
}

pub(crate) fn built_structure(kind: StructureKind) -> StructureState {
    let hits = match kind {
        StructureKind::Wall => 300_000_000,
        StructureKind::Rampart => 1_000_000,
        StructureKind::Road | StructureKind::Spawn => 5000,
        StructureKind::Container => 250_000,
        StructureKind::Storage => 10_000,
        StructureKind::Tower | StructureKind::Terminal => 3000,
        StructureKind::Extension | StructureKind::Link => 1000,
        StructureKind::Lab | StructureKind::Extractor => 500,
    };
    let capacity = match kind {
        StructureKind::Spawn => Some(300),
        StructureKind::Extension => Some(50),
        StructureKind::Container => Some(2000),
        StructureKind::Storage => Some(1_000_000),
        StructureKind::Tower => Some(1000),
        StructureKind::Link => Some(800),
        StructureKind::Lab => Some(5000),
        StructureKind::Terminal => Some(300_000),
        _ => None,
    };
    let mut state = StructureState::new(kind, hits);
    if kind.is_fortification() {
        state.hits = 1;
    }
    if let Some(capacity) = capacity {
        state = state.with_store(Store::with_capacity(capacity));
    }
    state
}

fn cell_index(pos: Position) -> Option<usize> {
    pos.in_bounds()
        .then(|| (pos.y * REGION_SIZE + pos.x) as usize)
}

impl WorldView for GridWorld {
    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    fn entities_in(&self, region: RegionId) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.pos.region == region)
            .collect()
    }

    fn agent_at(&self, pos: Position) -> Option<EntityId> {
        self.entities
            .values()
            .find(|e| e.pos == pos && e.as_agent().is_some())
            .map(|e| e.id)
    }

    fn terrain(&self, pos: Position) -> Terrain {
        match (self.terrain.get(&pos.region), cell_index(pos)) {
            (Some(cells), Some(idx)) => cells[idx],
            _ => Terrain::Wall,
        }
    }

    fn owned_agents(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.as_agent().is_some_and(|a| a.owned))
            .map(|e| e.id)
            .collect()
    }

    fn owned_regions(&self) -> Vec<RegionId> {
        self.owned_regions.iter().copied().collect()
    }
}

impl WorldMut for GridWorld {
    fn apply(&mut self, actor: EntityId, op: Primitive) -> ActionCode {
        let code = crate::rules::apply(self, actor, &op);
        self.record(actor, op, code)
    }

    fn move_agent(&mut self, agent: EntityId, dir: Direction) -> ActionCode {
        let Some(entity) = self.entities.get(&agent) else {
            return ActionCode::InvalidTarget;
        };
        let Some(state) = entity.as_agent() else {
            return ActionCode::InvalidTarget;
        };
        if state.spawning {
            return ActionCode::Busy;
        }
        if !state.has(BodyPart::Move) {
            return ActionCode::NoBodyPart;
        }
        if state.fatigue > 0 {
            return ActionCode::Tired;
        }
        let Some(next) = entity.pos.offset(dir) else {
            return ActionCode::InvalidArgs;
        };
        if !self.is_passable(next) {
            return ActionCode::InvalidArgs;
        }

        let weight = state
            .body
            .iter()
            .filter(|p| **p != BodyPart::Move)
            .count() as u32;
        let cost = self.move_cost(next).unwrap_or(2);
        let fatigue = weight * cost;

        self.move_intents.insert(agent, next);
        if let Some(state) = self.agent_mut(agent) {
            state.fatigue += fatigue;
        }
        ActionCode::Ok
    }
}
