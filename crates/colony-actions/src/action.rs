use colony_core::{
    BodyPart, EntityId, Position, Primitive, ResourceKind, StructureKind, WorldView,
};
use serde::{Deserialize, Serialize};

use crate::Prerequisite;

/// Range for melee and transfer-like operations.
pub const MELEE_RANGE: u32 = 1;
/// Range for ranged operations (ranged combat, build, repair, upgrade).
pub const RANGED_RANGE: u32 = 3;
/// Reservation ticks at which a reserve action stops topping up.
pub const RESERVATION_CAP: u32 = 5000;

/// One unit of work.
///
/// Target references are stable ids and are resolved again on every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Harvest {
        source: EntityId,
    },
    Build {
        site: EntityId,
    },
    Repair {
        target: EntityId,
        /// Stop at this many hits instead of full health (fortifications).
        #[serde(default)]
        until: Option<u32>,
    },
    Upgrade {
        controller: EntityId,
    },
    Transfer {
        target: EntityId,
        resource: ResourceKind,
        #[serde(default)]
        amount: Option<u32>,
    },
    Withdraw {
        target: EntityId,
        resource: ResourceKind,
        #[serde(default)]
        amount: Option<u32>,
    },
    Move {
        destination: Position,
        range: u32,
    },
    Spawn {
        spawn: EntityId,
        body: Vec<BodyPart>,
        name: String,
    },
    PlaceStructure {
        pos: Position,
        structure: StructureKind,
    },
    Pickup {
        target: EntityId,
    },
    Drop {
        resource: ResourceKind,
        #[serde(default)]
        amount: Option<u32>,
    },
    Claim {
        controller: EntityId,
    },
    Reserve {
        controller: EntityId,
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
    Sign {
        controller: EntityId,
        text: String,
    },
    Recycle {
        spawn: EntityId,
    },
    TowerAttack {
        tower: EntityId,
        target: EntityId,
    },
    TowerHeal {
        tower: EntityId,
        target: EntityId,
    },
    TowerRepair {
        tower: EntityId,
        target: EntityId,
    },
    BoostCreep {
        lab: EntityId,
    },
    RunReaction {
        lab: EntityId,
        input_a: EntityId,
        input_b: EntityId,
    },
    LinkTransfer {
        link: EntityId,
        target: EntityId,
        #[serde(default)]
        amount: Option<u32>,
    },
    GenerateSafeMode {
        controller: EntityId,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Harvest { .. } => "harvest",
            Action::Build { .. } => "build",
            Action::Repair { .. } => "repair",
            Action::Upgrade { .. } => "upgrade",
            Action::Transfer { .. } => "transfer",
            Action::Withdraw { .. } => "withdraw",
            Action::Move { .. } => "move",
            Action::Spawn { .. } => "spawn",
            Action::PlaceStructure { .. } => "place_structure",
            Action::Pickup { .. } => "pickup",
            Action::Drop { .. } => "drop",
            Action::Claim { .. } => "claim",
            Action::Reserve { .. } => "reserve",
            Action::Attack { .. } => "attack",
            Action::RangedAttack { .. } => "ranged_attack",
            Action::Heal { .. } => "heal",
            Action::RangedHeal { .. } => "ranged_heal",
            Action::Dismantle { .. } => "dismantle",
            Action::Sign { .. } => "sign",
            Action::Recycle { .. } => "recycle",
            Action::TowerAttack { .. } => "tower_attack",
            Action::TowerHeal { .. } => "tower_heal",
            Action::TowerRepair { .. } => "tower_repair",
            Action::BoostCreep { .. } => "boost_creep",
            Action::RunReaction { .. } => "run_reaction",
            Action::LinkTransfer { .. } => "link_transfer",
            Action::GenerateSafeMode { .. } => "generate_safe_mode",
        }
    }

    /// Actions executed by a structure rather than by the assigned agent.
    /// Structures cannot move, so these never register movement.
    pub fn structure_actor(&self) -> Option<EntityId> {
        match self {
            Action::Spawn { spawn, .. } => Some(*spawn),
            Action::TowerAttack { tower, .. }
            | Action::TowerHeal { tower, .. }
            | Action::TowerRepair { tower, .. } => Some(*tower),
            Action::RunReaction { lab, .. } => Some(*lab),
            Action::LinkTransfer { link, .. } => Some(*link),
            _ => None,
        }
    }

    /// The entity that issues the primitive when `assignee` owns the task.
    pub fn executor(&self, assignee: EntityId) -> EntityId {
        self.structure_actor().unwrap_or(assignee)
    }

    /// The entity this action is "about", used to count concurrent tasks per demand.
    pub fn primary_target(&self) -> Option<EntityId> {
        match self {
            Action::Harvest { source } => Some(*source),
            Action::Build { site } => Some(*site),
            Action::Repair { target, .. }
            | Action::Transfer { target, .. }
            | Action::Withdraw { target, .. }
            | Action::Pickup { target }
            | Action::Attack { target }
            | Action::RangedAttack { target }
            | Action::Heal { target }
            | Action::RangedHeal { target }
            | Action::Dismantle { target }
            | Action::TowerAttack { target, .. }
            | Action::TowerHeal { target, .. }
            | Action::TowerRepair { target, .. }
            | Action::LinkTransfer { target, .. } => Some(*target),
            Action::Upgrade { controller }
            | Action::Claim { controller }
            | Action::Reserve { controller }
            | Action::Sign { controller, .. }
            | Action::GenerateSafeMode { controller } => Some(*controller),
            Action::Spawn { spawn, .. } | Action::Recycle { spawn } => Some(*spawn),
            Action::BoostCreep { lab } | Action::RunReaction { lab, .. } => Some(*lab),
            Action::Move { .. } | Action::PlaceStructure { .. } | Action::Drop { .. } => None,
        }
    }

    /// Every entity reference the action depends on.
    pub fn targets(&self) -> Vec<EntityId> {
        let mut out = Vec::with_capacity(3);
        if let Some(actor) = self.structure_actor() {
            out.push(actor);
        }
        if let Action::RunReaction {
            input_a, input_b, ..
        } = self
        {
            out.push(*input_a);
            out.push(*input_b);
        }
        if let Some(target) = self.primary_target() {
            if !out.contains(&target) {
                out.push(target);
            }
        }
        out
    }

    /// Interaction range required by the primitive.
    pub fn range(&self) -> u32 {
        match self {
            Action::Build { .. }
            | Action::Repair { .. }
            | Action::Upgrade { .. }
            | Action::RangedAttack { .. }
            | Action::RangedHeal { .. } => RANGED_RANGE,
            Action::Move { range, .. } => *range,
            _ => MELEE_RANGE,
        }
    }

    /// Where an agent has to be to perform this action.
    pub fn target_pos<W: WorldView + ?Sized>(&self, world: &W) -> Option<Position> {
        match self {
            Action::Move { destination, .. } => Some(*destination),
            Action::PlaceStructure { pos, .. } => Some(*pos),
            Action::Drop { .. } => None,
            _ => self
                .primary_target()
                .and_then(|id| world.entity(id))
                .map(|e| e.pos),
        }
    }

    /// Movement priority for requests issued on this action's behalf.
    pub fn move_priority(&self) -> u32 {
        match self {
            Action::Attack { .. }
            | Action::RangedAttack { .. }
            | Action::Heal { .. }
            | Action::RangedHeal { .. } => 100,
            Action::Transfer { .. } | Action::Pickup { .. } => 70,
            Action::Claim { .. } | Action::Reserve { .. } | Action::BoostCreep { .. } => 60,
            Action::Harvest { .. } | Action::Withdraw { .. } => 50,
            Action::Build { .. } | Action::Repair { .. } | Action::Dismantle { .. } => 40,
            Action::Upgrade { .. } => 30,
            _ => 20,
        }
    }

    pub fn prerequisites(&self) -> Vec<Prerequisite> {
        use Prerequisite as P;

        let mut out = match self {
            Action::Harvest { .. } => vec![
                P::part(BodyPart::Work),
                P::part(BodyPart::Carry),
                P::free_capacity(),
            ],
            Action::Build { .. } | Action::Repair { .. } | Action::Upgrade { .. } => vec![
                P::part(BodyPart::Work),
                P::part(BodyPart::Carry),
                P::carries(ResourceKind::Energy),
            ],
            Action::Transfer { resource, .. } | Action::Drop { resource, .. } => {
                vec![P::carries(*resource)]
            }
            Action::Withdraw { .. } | Action::Pickup { .. } => {
                vec![P::part(BodyPart::Carry), P::free_capacity()]
            }
            Action::Move { .. } | Action::Sign { .. } => vec![P::part(BodyPart::Move)],
            Action::Claim { .. } | Action::Reserve { .. } => {
                vec![P::part(BodyPart::Claim), P::part(BodyPart::Move)]
            }
            Action::Attack { .. } => vec![P::part(BodyPart::Attack)],
            Action::RangedAttack { .. } => vec![P::part(BodyPart::RangedAttack)],
            Action::Heal { .. } | Action::RangedHeal { .. } => vec![P::part(BodyPart::Heal)],
            Action::Dismantle { .. } => vec![P::part(BodyPart::Work)],
            Action::GenerateSafeMode { .. } => vec![P::CarriesResource {
                resource: ResourceKind::Ghodium,
                min: 1000,
            }],
            Action::Recycle { .. } | Action::BoostCreep { .. } => Vec::new(),
            Action::Spawn { .. }
            | Action::PlaceStructure { .. }
            | Action::TowerAttack { .. }
            | Action::TowerHeal { .. }
            | Action::TowerRepair { .. }
            | Action::RunReaction { .. }
            | Action::LinkTransfer { .. } => Vec::new(),
        };
        if self.structure_actor().is_none() && !matches!(self, Action::PlaceStructure { .. }) {
            out.push(P::NotSpawning);
        }
        out
    }

    /// The primitive this action attempts each step. `Move` has none: its only
    /// effect is a movement registration.
    pub fn primitive(&self) -> Option<Primitive> {
        let op = match self {
            Action::Harvest { source } => Primitive::Harvest { target: *source },
            Action::Build { site } => Primitive::Build { target: *site },
            Action::Repair { target, .. } => Primitive::Repair { target: *target },
            Action::Upgrade { controller } => Primitive::UpgradeController {
                target: *controller,
            },
            Action::Transfer {
                target,
                resource,
                amount,
            } => Primitive::Transfer {
                target: *target,
                resource: *resource,
                amount: *amount,
            },
            Action::Withdraw {
                target,
                resource,
                amount,
            } => Primitive::Withdraw {
                target: *target,
                resource: *resource,
                amount: *amount,
            },
            Action::Move { .. } => return None,
            Action::Spawn { body, name, .. } => Primitive::SpawnAgent {
                body: body.clone(),
                name: name.clone(),
            },
            Action::PlaceStructure { pos, structure } => Primitive::CreateSite {
                pos: *pos,
                structure: *structure,
            },
            Action::Pickup { target } => Primitive::Pickup { target: *target },
            Action::Drop { resource, amount } => Primitive::Drop {
                resource: *resource,
                amount: *amount,
            },
            Action::Claim { controller } => Primitive::ClaimController {
                target: *controller,
            },
            Action::Reserve { controller } => Primitive::ReserveController {
                target: *controller,
            },
            Action::Attack { target } => Primitive::Attack { target: *target },
            Action::RangedAttack { target } => Primitive::RangedAttack { target: *target },
            Action::Heal { target } => Primitive::Heal { target: *target },
            Action::RangedHeal { target } => Primitive::RangedHeal { target: *target },
            Action::Dismantle { target } => Primitive::Dismantle { target: *target },
            Action::Sign { controller, text } => Primitive::SignController {
                target: *controller,
                text: text.clone(),
            },
            Action::Recycle { spawn } => Primitive::Recycle { spawn: *spawn },
            Action::TowerAttack { target, .. } => Primitive::TowerAttack { target: *target },
            Action::TowerHeal { target, .. } => Primitive::TowerHeal { target: *target },
            Action::TowerRepair { target, .. } => Primitive::TowerRepair { target: *target },
            Action::BoostCreep { lab } => Primitive::Boost { lab: *lab },
            Action::RunReaction {
                input_a, input_b, ..
            } => Primitive::RunReaction {
                input_a: *input_a,
                input_b: *input_b,
            },
            Action::LinkTransfer { target, amount, .. } => Primitive::LinkTransfer {
                target: *target,
                amount: *amount,
            },
            Action::GenerateSafeMode { controller } => Primitive::GenerateSafeMode {
                target: *controller,
            },
        };
        Some(op)
    }
}
