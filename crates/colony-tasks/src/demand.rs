use colony_actions::Action;
use colony_core::{
    EntityId, EntityKind, RegionId, ResourceKind, StructureKind, TaskConfig, WorldView,
};

use crate::Priority;

/// Rank of a plain repair demand in the normal tier.
pub(crate) const REPAIR_RANK: u32 = 20;

/// How far traffic ranking may lift a repair above [`REPAIR_RANK`]; stays below building.
pub(crate) const REPAIR_RANK_SPREAD: u32 = 19;

/// One source of work in a region and how many agents may serve it at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demand {
    pub action: Action,
    pub priority: Priority,
    pub slots: usize,
    /// Ticks until a request generated for this demand expires.
    pub ttl: u64,
}

impl Demand {
    fn new(action: Action, priority: Priority, slots: usize, ttl: u64) -> Self {
        Self {
            action,
            priority,
            slots,
            ttl,
        }
    }

    /// Key used to count live tasks against this demand.
    pub fn key(&self) -> (&'static str, Option<EntityId>) {
        (self.action.name(), self.action.primary_target())
    }
}

/// Every demand visible in `region`, in entity id order.
pub fn demands<W: WorldView + ?Sized>(world: &W, region: RegionId, config: &TaskConfig) -> Vec<Demand> {
    let ttl = config.task_ttl;
    let mut out = Vec::new();

    for entity in world.entities_in(region) {
        let id = entity.id;
        match &entity.kind {
            EntityKind::Source { energy, .. } if *energy > 0 => out.push(Demand::new(
                Action::Harvest { source: id },
                Priority::normal(50),
                config.harvest_slots_per_source,
                ttl,
            )),
            EntityKind::Site { structure, .. } => {
                let priority = match structure {
                    StructureKind::Spawn | StructureKind::Extension => Priority::high(60),
                    _ => Priority::normal(40),
                };
                out.push(Demand::new(
                    Action::Build { site: id },
                    priority,
                    config.build_slots_per_site,
                    ttl,
                ));
            }
            EntityKind::Controller(controller) if controller.owned => out.push(Demand::new(
                Action::Upgrade { controller: id },
                Priority::low(50),
                config.upgrade_slots,
                ttl,
            )),
            EntityKind::Dropped { amount, .. } if *amount > 0 => out.push(Demand::new(
                Action::Pickup { target: id },
                Priority::normal(70),
                1,
                config.perishable_ttl,
            )),
            EntityKind::Structure(structure) if structure.owned => {
                if structure.hits < structure.hits_max {
                    if structure.kind.is_fortification() {
                        if structure.hits < config.wall_repair_target {
                            out.push(Demand::new(
                                Action::Repair {
                                    target: id,
                                    until: Some(config.wall_repair_target),
                                },
                                Priority::low(10),
                                1,
                                ttl,
                            ));
                        }
                    } else {
                        out.push(Demand::new(
                            Action::Repair {
                                target: id,
                                until: None,
                            },
                            Priority::normal(REPAIR_RANK),
                            1,
                            ttl,
                        ));
                    }
                }

                let energy_free = structure.store.as_ref().map_or(0, |s| s.free());
                let energy_held = structure
                    .store
                    .as_ref()
                    .map_or(0, |s| s.get(ResourceKind::Energy));
                let depot = match structure.kind {
                    StructureKind::Spawn | StructureKind::Extension => Some(Priority::high(100)),
                    StructureKind::Tower => Some(Priority::high(80)),
                    _ => None,
                };
                if let Some(priority) = depot.filter(|_| energy_free > 0) {
                    out.push(Demand::new(
                        Action::Transfer {
                            target: id,
                            resource: ResourceKind::Energy,
                            amount: None,
                        },
                        priority,
                        1,
                        ttl,
                    ));
                }
                let stockpile = matches!(
                    structure.kind,
                    StructureKind::Container | StructureKind::Storage
                );
                if stockpile && energy_held >= config.withdraw_min_energy {
                    out.push(Demand::new(
                        Action::Withdraw {
                            target: id,
                            resource: ResourceKind::Energy,
                            amount: None,
                        },
                        Priority::low(40),
                        1,
                        ttl,
                    ));
                }
            }
            _ => {}
        }
    }
    out
}
