use serde::{Deserialize, Serialize};

use crate::{
    BodyPart, Direction, Entity, EntityId, Position, RegionId, ResourceKind, StructureKind,
    Terrain,
};

/// Status codes returned by primitive world mutations.
///
/// This is the closed set the core reacts to; everything that is not `Ok`,
/// `NotInRange`, or `Tired` is a terminal failure for the step that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCode {
    Ok,
    NotInRange,
    /// Fatigued agent or structure on cooldown; the intent may be retried next tick.
    Tired,
    NotEnoughResources,
    Full,
    InvalidTarget,
    NoBodyPart,
    Busy,
    NotOwner,
    InvalidArgs,
    Failed,
}

impl ActionCode {
    pub fn is_ok(self) -> bool {
        self == ActionCode::Ok
    }
}

/// One primitive world mutation attempt, issued by `actor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primitive {
    Harvest {
        target: EntityId,
    },
    Build {
        target: EntityId,
    },
    Repair {
        target: EntityId,
    },
    UpgradeController {
        target: EntityId,
    },
    Transfer {
        target: EntityId,
        resource: ResourceKind,
        amount: Option<u32>,
    },
    Withdraw {
        target: EntityId,
        resource: ResourceKind,
        amount: Option<u32>,
    },
    Pickup {
        target: EntityId,
    },
    Drop {
        resource: ResourceKind,
        amount: Option<u32>,
    },
    ClaimController {
        target: EntityId,
    },
    ReserveController {
        target: EntityId,
    },
    Attack {
        target: EntityId,
    },
    RangedAttack {
        target: EntityId,
    },
    Heal {
        target: EntityId,
    },
    RangedHeal {
        target: EntityId,
    },
    Dismantle {
        target: EntityId,
    },
    SignController {
        target: EntityId,
        text: String,
    },
    /// The actor agent asks `spawn` to recycle it.
    Recycle {
        spawn: EntityId,
    },
    SpawnAgent {
        body: Vec<BodyPart>,
        name: String,
    },
    CreateSite {
        pos: Position,
        structure: StructureKind,
    },
    TowerAttack {
        target: EntityId,
    },
    TowerHeal {
        target: EntityId,
    },
    TowerRepair {
        target: EntityId,
    },
    /// The actor agent asks `lab` to boost it.
    Boost {
        lab: EntityId,
    },
    RunReaction {
        input_a: EntityId,
        input_b: EntityId,
    },
    LinkTransfer {
        target: EntityId,
        amount: Option<u32>,
    },
    GenerateSafeMode {
        target: EntityId,
    },
}

/// Read-only per-tick world snapshot.
///
/// Entity lookups are by stable id and may miss at any time: entities vanish
/// between ticks and callers must treat a miss as "the assumption no longer holds".
pub trait WorldView {
    fn entity(&self, id: EntityId) -> Option<&Entity>;

    /// Every entity in `region`, ordered by id.
    fn entities_in(&self, region: RegionId) -> Vec<&Entity>;

    fn agent_at(&self, pos: Position) -> Option<EntityId>;

    fn terrain(&self, pos: Position) -> Terrain;

    /// Agents under our control, ordered by id.
    fn owned_agents(&self) -> Vec<EntityId>;

    fn owned_regions(&self) -> Vec<RegionId>;

    fn agent(&self, id: EntityId) -> Option<&Entity> {
        self.entity(id).filter(|e| e.as_agent().is_some())
    }

    fn entities_at(&self, pos: Position) -> Vec<&Entity> {
        self.entities_in(pos.region)
            .into_iter()
            .filter(|e| e.pos == pos)
            .collect()
    }

    fn structures_in(&self, region: RegionId, kind: StructureKind) -> Vec<&Entity> {
        self.entities_in(region)
            .into_iter()
            .filter(|e| e.structure_kind() == Some(kind))
            .collect()
    }

    fn has_structure_at(&self, pos: Position, kind: StructureKind) -> bool {
        self.entities_at(pos)
            .iter()
            .any(|e| e.structure_kind() == Some(kind))
    }

    /// Terrain walls and non-walkable structures; agents do not count.
    fn is_passable(&self, pos: Position) -> bool {
        pos.in_bounds()
            && self.terrain(pos) != Terrain::Wall
            && !self.entities_at(pos).iter().any(|e| e.blocks_movement())
    }

    /// Movement cost for entering `pos`, honoring roads. `None` if impassable.
    fn move_cost(&self, pos: Position) -> Option<u32> {
        if !self.is_passable(pos) {
            return None;
        }
        if self.has_structure_at(pos, StructureKind::Road) {
            return Some(crate::ROAD_COST);
        }
        self.terrain(pos).traversal_cost()
    }
}

/// Write access: the only way the core mutates the world.
pub trait WorldMut: WorldView {
    fn apply(&mut self, actor: EntityId, op: Primitive) -> ActionCode;

    fn move_agent(&mut self, agent: EntityId, dir: Direction) -> ActionCode;
}
