use serde::{Deserialize, Serialize};

use crate::{BodyPart, EntityId, Position, ResourceKind, Store};

/// Traversal cost of a cell carrying a road.
pub const ROAD_COST: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Plain,
    Swamp,
    Wall,
}

impl Terrain {
    /// Movement cost of the bare terrain; `None` for walls.
    pub fn traversal_cost(self) -> Option<u32> {
        match self {
            Terrain::Plain => Some(2),
            Terrain::Swamp => Some(10),
            Terrain::Wall => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Spawn,
    Extension,
    Road,
    Wall,
    Rampart,
    Container,
    Storage,
    Tower,
    Link,
    Lab,
    Terminal,
    Extractor,
}

impl StructureKind {
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            StructureKind::Road | StructureKind::Container | StructureKind::Rampart
        )
    }

    /// Defensive structures whose hit pools are too large to top up completely.
    pub fn is_fortification(self) -> bool {
        matches!(self, StructureKind::Wall | StructureKind::Rampart)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub body: Vec<BodyPart>,
    pub store: Store,
    #[serde(default)]
    pub fatigue: u32,
    #[serde(default)]
    pub spawning: bool,
    pub hits: u32,
    pub hits_max: u32,
    #[serde(default = "default_owned")]
    pub owned: bool,
}

fn default_owned() -> bool {
    true
}

impl AgentState {
    pub fn new(body: Vec<BodyPart>) -> Self {
        let carry = body.iter().filter(|p| **p == BodyPart::Carry).count() as u32;
        let hits = body.len() as u32 * 100;
        Self {
            body,
            store: Store::with_capacity(carry * 50),
            fatigue: 0,
            spawning: false,
            hits,
            hits_max: hits,
            owned: true,
        }
    }

    pub fn count(&self, part: BodyPart) -> u32 {
        self.body.iter().filter(|p| **p == part).count() as u32
    }

    pub fn has(&self, part: BodyPart) -> bool {
        self.body.contains(&part)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureState {
    pub kind: StructureKind,
    pub hits: u32,
    pub hits_max: u32,
    #[serde(default)]
    pub store: Option<Store>,
    #[serde(default)]
    pub cooldown: u32,
    #[serde(default = "default_owned")]
    pub owned: bool,
}

impl StructureState {
    pub fn new(kind: StructureKind, hits_max: u32) -> Self {
        Self {
            kind,
            hits: hits_max,
            hits_max,
            store: None,
            cooldown: 0,
            owned: true,
        }
    }

    pub fn with_store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    pub level: u8,
    pub owned: bool,
    /// Remaining reservation ticks, when reserved.
    #[serde(default)]
    pub reservation: Option<u32>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub safe_mode_available: u32,
    #[serde(default)]
    pub sign: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Agent(AgentState),
    Source {
        energy: u32,
        capacity: u32,
    },
    Mineral {
        resource: ResourceKind,
        amount: u32,
    },
    Site {
        structure: StructureKind,
        progress: u32,
        total: u32,
    },
    Structure(StructureState),
    Controller(ControllerState),
    Dropped {
        resource: ResourceKind,
        amount: u32,
    },
}

/// A read-only snapshot of one world entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Position,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(id: EntityId, pos: Position, kind: EntityKind) -> Self {
        Self { id, pos, kind }
    }

    pub fn as_agent(&self) -> Option<&AgentState> {
        match &self.kind {
            EntityKind::Agent(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn as_agent_mut(&mut self) -> Option<&mut AgentState> {
        match &mut self.kind {
            EntityKind::Agent(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&StructureState> {
        match &self.kind {
            EntityKind::Structure(structure) => Some(structure),
            _ => None,
        }
    }

    pub fn as_controller(&self) -> Option<&ControllerState> {
        match &self.kind {
            EntityKind::Controller(controller) => Some(controller),
            _ => None,
        }
    }

    pub fn structure_kind(&self) -> Option<StructureKind> {
        self.as_structure().map(|s| s.kind)
    }

    /// `(hits, hits_max)` for anything that can be damaged.
    pub fn hits(&self) -> Option<(u32, u32)> {
        match &self.kind {
            EntityKind::Agent(agent) => Some((agent.hits, agent.hits_max)),
            EntityKind::Structure(structure) => Some((structure.hits, structure.hits_max)),
            _ => None,
        }
    }

    pub fn is_damaged(&self) -> bool {
        self.hits().is_some_and(|(hits, max)| hits < max)
    }

    pub fn store(&self) -> Option<&Store> {
        match &self.kind {
            EntityKind::Agent(agent) => Some(&agent.store),
            EntityKind::Structure(structure) => structure.store.as_ref(),
            _ => None,
        }
    }

    pub fn store_mut(&mut self) -> Option<&mut Store> {
        match &mut self.kind {
            EntityKind::Agent(agent) => Some(&mut agent.store),
            EntityKind::Structure(structure) => structure.store.as_mut(),
            _ => None,
        }
    }

    /// Whether the cell this entity occupies stops agents from entering it.
    pub fn blocks_movement(&self) -> bool {
        match &self.kind {
            EntityKind::Agent(_) => false,
            EntityKind::Source { .. } | EntityKind::Mineral { .. } | EntityKind::Controller(_) => {
                true
            }
            EntityKind::Site { .. } | EntityKind::Dropped { .. } => false,
            EntityKind::Structure(structure) => !structure.kind.is_walkable(),
        }
    }
}
