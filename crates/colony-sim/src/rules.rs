//! Simplified mutation rules for every primitive.

use colony_core::{
    ActionCode, BodyPart, Entity, EntityId, EntityKind, Position, Primitive, ResourceKind, Store,
    StructureKind, WorldView,
};

use crate::world::{built_structure, GridWorld};

type Outcome = Result<(), ActionCode>;

const HARVEST_POWER: u32 = 2;
const HARVEST_MINERAL_POWER: u32 = 1;
const BUILD_POWER: u32 = 5;
const REPAIR_POWER: u32 = 100;
const DISMANTLE_POWER: u32 = 50;
const ATTACK_POWER: u32 = 30;
const RANGED_ATTACK_POWER: u32 = 10;
const HEAL_POWER: u32 = 12;
const RANGED_HEAL_POWER: u32 = 4;
const RESERVE_POWER: u32 = 1;
const RESERVE_MAX: u32 = 5000;
const TOWER_ENERGY_COST: u32 = 10;
const TOWER_ATTACK: u32 = 300;
const TOWER_HEAL: u32 = 200;
const TOWER_REPAIR: u32 = 400;
const BOOST_MINERAL_COST: u32 = 30;
const BOOST_ENERGY_COST: u32 = 20;
const REACTION_AMOUNT: u32 = 5;
const REACTION_COOLDOWN: u32 = 10;
const LAB_RANGE: u32 = 2;
const LINK_LOSS_PERCENT: u32 = 3;
const SAFE_MODE_COST: u32 = 1000;
const SPAWN_TIME_PER_PART: u32 = 3;
const RECYCLE_REFUND: u32 = 50;

pub(crate) fn apply(world: &mut GridWorld, actor: EntityId, op: &Primitive) -> ActionCode {
    let outcome = match op {
        Primitive::Harvest { target } => harvest(world, actor, *target),
        Primitive::Build { target } => build(world, actor, *target),
        Primitive::Repair { target } => repair(world, actor, *target),
        Primitive::UpgradeController { target } => upgrade(world, actor, *target),
        Primitive::Transfer {
            target,
            resource,
            amount,
        } => transfer(world, actor, *target, *resource, *amount),
        Primitive::Withdraw {
            target,
            resource,
            amount,
        } => transfer(world, *target, actor, *resource, *amount),
        Primitive::Pickup { target } => pickup(world, actor, *target),
        Primitive::Drop { resource, amount } => drop_resource(world, actor, *resource, *amount),
        Primitive::ClaimController { target } => claim(world, actor, *target),
        Primitive::ReserveController { target } => reserve(world, actor, *target),
        Primitive::Attack { target } => {
            combat(world, actor, *target, BodyPart::Attack, 1, ATTACK_POWER)
        }
        Primitive::RangedAttack { target } => combat(
            world,
            actor,
            *target,
            BodyPart::RangedAttack,
            3,
            RANGED_ATTACK_POWER,
        ),
        Primitive::Heal { target } => heal(world, actor, *target, 1, HEAL_POWER),
        Primitive::RangedHeal { target } => heal(world, actor, *target, 3, RANGED_HEAL_POWER),
        Primitive::Dismantle { target } => dismantle(world, actor, *target),
        Primitive::SignController { target, text } => sign(world, actor, *target, text),
        Primitive::Recycle { spawn } => recycle(world, actor, *spawn),
        Primitive::SpawnAgent { body, name } => spawn(world, actor, body, name),
        Primitive::CreateSite { pos, structure } => create_site(world, *pos, *structure),
        Primitive::TowerAttack { target } => tower(world, actor, *target, TowerEffect::Attack),
        Primitive::TowerHeal { target } => tower(world, actor, *target, TowerEffect::Heal),
        Primitive::TowerRepair { target } => tower(world, actor, *target, TowerEffect::Repair),
        Primitive::Boost { lab } => boost(world, actor, *lab),
        Primitive::RunReaction { input_a, input_b } => react(world, actor, *input_a, *input_b),
        Primitive::LinkTransfer { target, amount } => link_transfer(world, actor, *target, *amount),
        Primitive::GenerateSafeMode { target } => safe_mode(world, actor, *target),
    };
    match outcome {
        Ok(()) => ActionCode::Ok,
        Err(code) => code,
    }
}

fn entity(world: &GridWorld, id: EntityId) -> Result<&Entity, ActionCode> {
    world.entity(id).ok_or(ActionCode::InvalidTarget)
}

fn kind_mut(world: &mut GridWorld, id: EntityId) -> Result<&mut EntityKind, ActionCode> {
    world
        .entity_mut(id)
        .map(|e| &mut e.kind)
        .ok_or(ActionCode::InvalidTarget)
}

fn store_mut(world: &mut GridWorld, id: EntityId) -> Result<&mut Store, ActionCode> {
    world
        .entity_mut(id)
        .and_then(|e| e.store_mut())
        .ok_or(ActionCode::InvalidTarget)
}

fn energy(world: &GridWorld, id: EntityId) -> u32 {
    world
        .entity(id)
        .and_then(|e| e.store())
        .map_or(0, |s| s.get(ResourceKind::Energy))
}

/// Position and active part count of an agent able to act this tick.
fn worker(world: &GridWorld, actor: EntityId, part: BodyPart) -> Result<(Position, u32), ActionCode> {
    let entity = entity(world, actor)?;
    let agent = entity.as_agent().ok_or(ActionCode::InvalidTarget)?;
    if agent.spawning {
        return Err(ActionCode::Busy);
    }
    let count = agent.count(part);
    if count == 0 {
        return Err(ActionCode::NoBodyPart);
    }
    Ok((entity.pos, count))
}

fn agent_pos(world: &GridWorld, actor: EntityId) -> Result<Position, ActionCode> {
    let entity = entity(world, actor)?;
    match entity.as_agent() {
        Some(agent) if agent.spawning => Err(ActionCode::Busy),
        Some(_) => Ok(entity.pos),
        None => Err(ActionCode::InvalidTarget),
    }
}

fn structure_actor(
    world: &GridWorld,
    actor: EntityId,
    kind: StructureKind,
) -> Result<(Position, u32), ActionCode> {
    let entity = entity(world, actor)?;
    match entity.as_structure() {
        Some(s) if s.kind == kind => Ok((entity.pos, s.cooldown)),
        _ => Err(ActionCode::InvalidTarget),
    }
}

fn reach(world: &GridWorld, from: Position, target: EntityId, range: u32) -> Result<&Entity, ActionCode> {
    let entity = entity(world, target)?;
    if !from.in_range_to(entity.pos, range) {
        return Err(ActionCode::NotInRange);
    }
    Ok(entity)
}

fn spend_energy(world: &mut GridWorld, actor: EntityId, amount: u32) -> Result<u32, ActionCode> {
    let store = store_mut(world, actor)?;
    let spent = store.remove(ResourceKind::Energy, amount);
    Ok(spent)
}

fn harvest(world: &mut GridWorld, actor: EntityId, target: EntityId) -> Outcome {
    let (pos, work) = worker(world, actor, BodyPart::Work)?;
    let (resource, available) = match &reach(world, pos, target, 1)?.kind {
        EntityKind::Source { energy, .. } => (ResourceKind::Energy, *energy),
        EntityKind::Mineral { resource, amount } => (*resource, *amount),
        _ => return Err(ActionCode::InvalidTarget),
    };
    if available == 0 {
        return Err(ActionCode::NotEnoughResources);
    }
    let power = if resource == ResourceKind::Energy {
        HARVEST_POWER
    } else {
        HARVEST_MINERAL_POWER
    };
    let store = store_mut(world, actor)?;
    if store.is_full() {
        return Err(ActionCode::Full);
    }
    let taken = store.add(resource, (work * power).min(available));
    match kind_mut(world, target)? {
        EntityKind::Source { energy, .. } => *energy -= taken,
        EntityKind::Mineral { amount, .. } => *amount -= taken,
        _ => {}
    }
    Ok(())
}

fn build(world: &mut GridWorld, actor: EntityId, target: EntityId) -> Outcome {
    let (pos, work) = worker(world, actor, BodyPart::Work)?;
    let site = reach(world, pos, target, 3)?;
    let site_pos = site.pos;
    let EntityKind::Site {
        structure,
        progress,
        total,
    } = site.kind
    else {
        return Err(ActionCode::InvalidTarget);
    };
    let carried = energy(world, actor);
    if carried == 0 {
        return Err(ActionCode::NotEnoughResources);
    }

    let amount = (work * BUILD_POWER).min(carried).min(total - progress);
    spend_energy(world, actor, amount)?;
    let done = progress + amount >= total;
    if let EntityKind::Site { progress, .. } = kind_mut(world, target)? {
        *progress += amount;
    }
    if done {
        world.remove(target);
        let id = world.insert(site_pos, EntityKind::Structure(built_structure(structure)));
        tracing::debug!(site = %target, structure = %id, ?structure, "construction finished");
    }
    Ok(())
}

fn repair(world: &mut GridWorld, actor: EntityId, target: EntityId) -> Outcome {
    let (pos, work) = worker(world, actor, BodyPart::Work)?;
    let (hits, hits_max) = reach(world, pos, target, 3)?
        .as_structure()
        .map(|s| (s.hits, s.hits_max))
        .ok_or(ActionCode::InvalidTarget)?;
    if hits >= hits_max {
        return Ok(());
    }
    let carried = energy(world, actor);
    if carried == 0 {
        return Err(ActionCode::NotEnoughResources);
    }
    let cost = work.min(carried);
    spend_energy(world, actor, cost)?;
    if let EntityKind::Structure(s) = kind_mut(world, target)? {
        s.hits = (s.hits + cost * REPAIR_POWER).min(s.hits_max);
    }
    Ok(())
}

fn upgrade(world: &mut GridWorld, actor: EntityId, target: EntityId) -> Outcome {
    let (pos, work) = worker(world, actor, BodyPart::Work)?;
    let owned = reach(world, pos, target, 3)?
        .as_controller()
        .map(|c| c.owned)
        .ok_or(ActionCode::InvalidTarget)?;
    if !owned {
        return Err(ActionCode::NotOwner);
    }
    let carried = energy(world, actor);
    if carried == 0 {
        return Err(ActionCode::NotEnoughResources);
    }
    let spent = spend_energy(world, actor, work.min(carried))?;
    if let EntityKind::Controller(c) = kind_mut(world, target)? {
        c.progress += spent;
    }
    Ok(())
}

/// Moves a resource from `from` to `to`; one of them is the acting agent.
fn transfer(
    world: &mut GridWorld,
    from: EntityId,
    to: EntityId,
    resource: ResourceKind,
    amount: Option<u32>,
) -> Outcome {
    let from_entity = entity(world, from)?;
    let to_entity = entity(world, to)?;
    if let Some(agent) = from_entity.as_agent().or(to_entity.as_agent()) {
        if agent.spawning {
            return Err(ActionCode::Busy);
        }
    }
    if !from_entity.pos.is_near_to(to_entity.pos) {
        return Err(ActionCode::NotInRange);
    }
    let held = from_entity
        .store()
        .map(|s| s.get(resource))
        .ok_or(ActionCode::InvalidTarget)?;
    let free = to_entity
        .store()
        .map(|s| s.free())
        .ok_or(ActionCode::InvalidTarget)?;
    if held == 0 || amount.is_some_and(|a| a > held) {
        return Err(ActionCode::NotEnoughResources);
    }
    if free == 0 || amount.is_some_and(|a| a > free) {
        return Err(ActionCode::Full);
    }
    let moved = store_mut(world, from)?.remove(resource, amount.unwrap_or(held.min(free)));
    store_mut(world, to)?.add(resource, moved);
    Ok(())
}

fn pickup(world: &mut GridWorld, actor: EntityId, target: EntityId) -> Outcome {
    let pos = agent_pos(world, actor)?;
    let EntityKind::Dropped { resource, amount } = reach(world, pos, target, 1)?.kind else {
        return Err(ActionCode::InvalidTarget);
    };
    let store = store_mut(world, actor)?;
    if store.is_full() {
        return Err(ActionCode::Full);
    }
    let taken = store.add(resource, amount);
    if taken == amount {
        world.remove(target);
    } else if let EntityKind::Dropped { amount, .. } = kind_mut(world, target)? {
        *amount -= taken;
    }
    Ok(())
}

fn drop_resource(
    world: &mut GridWorld,
    actor: EntityId,
    resource: ResourceKind,
    amount: Option<u32>,
) -> Outcome {
    let pos = agent_pos(world, actor)?;
    let store = store_mut(world, actor)?;
    let held = store.get(resource);
    if held == 0 || amount.is_some_and(|a| a > held) {
        return Err(ActionCode::NotEnoughResources);
    }
    let dropped = store.remove(resource, amount.unwrap_or(held));
    let pile = world
        .entities_at(pos)
        .into_iter()
        .find(|e| matches!(e.kind, EntityKind::Dropped { resource: r, .. } if r == resource))
        .map(|e| e.id);
    match pile {
        Some(id) => {
            if let EntityKind::Dropped { amount, .. } = kind_mut(world, id)? {
                *amount += dropped;
            }
        }
        None => {
            world.add_dropped(pos, resource, dropped);
        }
    }
    Ok(())
}

fn claim(world: &mut GridWorld, actor: EntityId, target: EntityId) -> Outcome {
    let (pos, _) = worker(world, actor, BodyPart::Claim)?;
    let controller = reach(world, pos, target, 1)?;
    let region = controller.pos.region;
    let state = controller.as_controller().ok_or(ActionCode::InvalidTarget)?;
    if state.owned {
        return Err(ActionCode::InvalidTarget);
    }
    if let EntityKind::Controller(c) = kind_mut(world, target)? {
        c.owned = true;
        c.level = c.level.max(1);
        c.reservation = None;
    }
    world.add_region(region, true);
    Ok(())
}

fn reserve(world: &mut GridWorld, actor: EntityId, target: EntityId) -> Outcome {
    let (pos, claim_parts) = worker(world, actor, BodyPart::Claim)?;
    let state = reach(world, pos, target, 1)?
        .as_controller()
        .ok_or(ActionCode::InvalidTarget)?;
    if state.owned {
        return Err(ActionCode::InvalidTarget);
    }
    if let EntityKind::Controller(c) = kind_mut(world, target)? {
        let ticks = c.reservation.unwrap_or(0) + claim_parts * RESERVE_POWER;
        c.reservation = Some(ticks.min(RESERVE_MAX));
    }
    Ok(())
}

/// Subtracts hits; anything reduced to zero is destroyed.
fn damage(world: &mut GridWorld, target: EntityId, amount: u32) -> Outcome {
    let destroyed = match kind_mut(world, target)? {
        EntityKind::Agent(a) => {
            a.hits = a.hits.saturating_sub(amount);
            a.hits == 0
        }
        EntityKind::Structure(s) => {
            s.hits = s.hits.saturating_sub(amount);
            s.hits == 0
        }
        _ => return Err(ActionCode::InvalidTarget),
    };
    if destroyed {
        world.remove(target);
    }
    Ok(())
}

fn combat(
    world: &mut GridWorld,
    actor: EntityId,
    target: EntityId,
    part: BodyPart,
    range: u32,
    power: u32,
) -> Outcome {
    let (pos, parts) = worker(world, actor, part)?;
    reach(world, pos, target, range)?;
    damage(world, target, parts * power)
}

fn heal(world: &mut GridWorld, actor: EntityId, target: EntityId, range: u32, power: u32) -> Outcome {
    let (pos, parts) = worker(world, actor, BodyPart::Heal)?;
    reach(world, pos, target, range)?;
    match kind_mut(world, target)? {
        EntityKind::Agent(a) => {
            a.hits = (a.hits + parts * power).min(a.hits_max);
            Ok(())
        }
        _ => Err(ActionCode::InvalidTarget),
    }
}

fn dismantle(world: &mut GridWorld, actor: EntityId, target: EntityId) -> Outcome {
    let (pos, work) = worker(world, actor, BodyPart::Work)?;
    let hits = reach(world, pos, target, 1)?
        .as_structure()
        .map(|s| s.hits)
        .ok_or(ActionCode::InvalidTarget)?;
    let removed = (work * DISMANTLE_POWER).min(hits);
    store_mut(world, actor)?.add(ResourceKind::Energy, removed / 4);
    damage(world, target, removed)
}

fn sign(world: &mut GridWorld, actor: EntityId, target: EntityId, text: &str) -> Outcome {
    let pos = agent_pos(world, actor)?;
    if reach(world, pos, target, 1)?.as_controller().is_none() {
        return Err(ActionCode::InvalidTarget);
    }
    if let EntityKind::Controller(c) = kind_mut(world, target)? {
        c.sign = (!text.is_empty()).then(|| text.to_owned());
    }
    Ok(())
}

fn recycle(world: &mut GridWorld, actor: EntityId, spawn: EntityId) -> Outcome {
    let pos = agent_pos(world, actor)?;
    let spawn_entity = reach(world, pos, spawn, 1)?;
    if spawn_entity.structure_kind() != Some(StructureKind::Spawn) {
        return Err(ActionCode::InvalidTarget);
    }
    let refund = world
        .entity(actor)
        .and_then(|e| e.as_agent())
        .map_or(0, |a| a.body.len() as u32 * RECYCLE_REFUND / 2);
    world.remove(actor);
    store_mut(world, spawn)?.add(ResourceKind::Energy, refund);
    Ok(())
}

fn spawn(world: &mut GridWorld, actor: EntityId, body: &[BodyPart], name: &str) -> Outcome {
    let (pos, cooldown) = structure_actor(world, actor, StructureKind::Spawn)?;
    if cooldown > 0 {
        return Err(ActionCode::Busy);
    }
    if body.is_empty() {
        return Err(ActionCode::InvalidArgs);
    }
    let cost: u32 = body.iter().map(|p| p.cost()).sum();
    if energy(world, actor) < cost {
        return Err(ActionCode::NotEnoughResources);
    }
    let exit = pos
        .neighbors()
        .find(|p| world.is_passable(*p) && world.agent_at(*p).is_none())
        .ok_or(ActionCode::Failed)?;

    spend_energy(world, actor, cost)?;
    let id = world.add_agent(exit, body.to_vec());
    if let Some(agent) = world.agent_mut(id) {
        agent.spawning = true;
    }
    if let EntityKind::Structure(s) = kind_mut(world, actor)? {
        s.cooldown = SPAWN_TIME_PER_PART * body.len() as u32;
    }
    tracing::debug!(spawn = %actor, agent = %id, name, parts = body.len(), "agent spawned");
    Ok(())
}

fn create_site(world: &mut GridWorld, pos: Position, structure: StructureKind) -> Outcome {
    if !pos.in_bounds() {
        return Err(ActionCode::InvalidArgs);
    }
    if world.terrain(pos) == colony_core::Terrain::Wall {
        return Err(ActionCode::InvalidTarget);
    }
    let occupied = world.entities_at(pos).iter().any(|e| {
        matches!(e.kind, EntityKind::Site { .. } | EntityKind::Structure(_)) || e.blocks_movement()
    });
    if occupied {
        return Err(ActionCode::InvalidTarget);
    }
    world.add_site(pos, structure);
    Ok(())
}

enum TowerEffect {
    Attack,
    Heal,
    Repair,
}

fn tower(world: &mut GridWorld, actor: EntityId, target: EntityId, effect: TowerEffect) -> Outcome {
    let (pos, _) = structure_actor(world, actor, StructureKind::Tower)?;
    if entity(world, target)?.pos.region != pos.region {
        return Err(ActionCode::NotInRange);
    }
    if energy(world, actor) < TOWER_ENERGY_COST {
        return Err(ActionCode::NotEnoughResources);
    }
    if let TowerEffect::Attack = effect {
        spend_energy(world, actor, TOWER_ENERGY_COST)?;
        return damage(world, target, TOWER_ATTACK);
    }
    match (effect, kind_mut(world, target)?) {
        (TowerEffect::Heal, EntityKind::Agent(a)) => {
            a.hits = (a.hits + TOWER_HEAL).min(a.hits_max);
        }
        (TowerEffect::Repair, EntityKind::Structure(s)) => {
            s.hits = (s.hits + TOWER_REPAIR).min(s.hits_max);
        }
        _ => return Err(ActionCode::InvalidTarget),
    }
    spend_energy(world, actor, TOWER_ENERGY_COST)?;
    Ok(())
}

fn boost(world: &mut GridWorld, actor: EntityId, lab: EntityId) -> Outcome {
    let pos = agent_pos(world, actor)?;
    let lab_entity = reach(world, pos, lab, 1)?;
    if lab_entity.structure_kind() != Some(StructureKind::Lab) {
        return Err(ActionCode::InvalidTarget);
    }
    let store = lab_entity.store().ok_or(ActionCode::InvalidTarget)?;
    let mineral = store
        .resources()
        .find(|(r, a)| *r != ResourceKind::Energy && *a >= BOOST_MINERAL_COST)
        .map(|(r, _)| r);
    let Some(mineral) = mineral else {
        return Err(ActionCode::NotEnoughResources);
    };
    if store.get(ResourceKind::Energy) < BOOST_ENERGY_COST {
        return Err(ActionCode::NotEnoughResources);
    }
    let store = store_mut(world, lab)?;
    store.remove(mineral, BOOST_MINERAL_COST);
    store.remove(ResourceKind::Energy, BOOST_ENERGY_COST);
    Ok(())
}

fn reaction(a: ResourceKind, b: ResourceKind) -> Option<ResourceKind> {
    use ResourceKind::*;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    match (lo, hi) {
        (Hydrogen, Oxygen) => Some(Hydroxide),
        (Hydrogen, Utrium) => Some(UtriumHydride),
        (Oxygen, Keanium) => Some(KeaniumOxide),
        (Oxygen, Ghodium) => Some(GhodiumOxide),
        _ => None,
    }
}

fn lab_mineral(world: &GridWorld, from: Position, lab: EntityId) -> Result<ResourceKind, ActionCode> {
    let entity = reach(world, from, lab, LAB_RANGE)?;
    if entity.structure_kind() != Some(StructureKind::Lab) {
        return Err(ActionCode::InvalidTarget);
    }
    entity
        .store()
        .and_then(|s| {
            s.resources()
                .find(|(r, a)| *r != ResourceKind::Energy && *a >= REACTION_AMOUNT)
        })
        .map(|(r, _)| r)
        .ok_or(ActionCode::NotEnoughResources)
}

fn react(world: &mut GridWorld, actor: EntityId, input_a: EntityId, input_b: EntityId) -> Outcome {
    let (pos, cooldown) = structure_actor(world, actor, StructureKind::Lab)?;
    if cooldown > 0 {
        return Err(ActionCode::Tired);
    }
    let a = lab_mineral(world, pos, input_a)?;
    let b = lab_mineral(world, pos, input_b)?;
    let product = reaction(a, b).ok_or(ActionCode::InvalidArgs)?;
    let output = store_mut(world, actor)?;
    if output.free() < REACTION_AMOUNT {
        return Err(ActionCode::Full);
    }
    output.add(product, REACTION_AMOUNT);
    store_mut(world, input_a)?.remove(a, REACTION_AMOUNT);
    store_mut(world, input_b)?.remove(b, REACTION_AMOUNT);
    if let EntityKind::Structure(s) = kind_mut(world, actor)? {
        s.cooldown = REACTION_COOLDOWN;
    }
    Ok(())
}

fn link_transfer(world: &mut GridWorld, actor: EntityId, target: EntityId, amount: Option<u32>) -> Outcome {
    let (pos, cooldown) = structure_actor(world, actor, StructureKind::Link)?;
    if cooldown > 0 {
        return Err(ActionCode::Tired);
    }
    let receiver = entity(world, target)?;
    if receiver.structure_kind() != Some(StructureKind::Link) {
        return Err(ActionCode::InvalidTarget);
    }
    if receiver.pos.region != pos.region {
        return Err(ActionCode::NotInRange);
    }
    let distance = pos.range_to(receiver.pos);
    let free = receiver.store().map_or(0, |s| s.free());
    let held = energy(world, actor);
    if held == 0 || amount.is_some_and(|a| a > held) {
        return Err(ActionCode::NotEnoughResources);
    }
    if free == 0 {
        return Err(ActionCode::Full);
    }
    let sent = spend_energy(world, actor, amount.unwrap_or(held).min(free))?;
    let lost = (sent * LINK_LOSS_PERCENT).div_ceil(100);
    store_mut(world, target)?.add(ResourceKind::Energy, sent - lost);
    if let EntityKind::Structure(s) = kind_mut(world, actor)? {
        s.cooldown = distance;
    }
    Ok(())
}

fn safe_mode(world: &mut GridWorld, actor: EntityId, target: EntityId) -> Outcome {
    let pos = agent_pos(world, actor)?;
    let controller = reach(world, pos, target, 1)?
        .as_controller()
        .ok_or(ActionCode::InvalidTarget)?;
    if !controller.owned {
        return Err(ActionCode::NotOwner);
    }
    let store = store_mut(world, actor)?;
    if store.get(ResourceKind::Ghodium) < SAFE_MODE_COST {
        return Err(ActionCode::NotEnoughResources);
    }
    store.remove(ResourceKind::Ghodium, SAFE_MODE_COST);
    if let EntityKind::Controller(c) = kind_mut(world, target)? {
        c.safe_mode_available += 1;
    }
    Ok(())
}
