use colony_core::{
    ActionCode, EntityId, EntityKind, MoveIntent, MovementSink, ResourceKind, TickContext,
    WorldMut, WorldView,
};

use crate::action::RESERVATION_CAP;
use crate::Action;

/// Result of one step. There is no failure variant: failing fast means completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Continuing,
    Complete,
}

impl StepStatus {
    pub fn is_complete(self) -> bool {
        self == StepStatus::Complete
    }
}

impl Action {
    /// Advance the action by one tick on behalf of `assignee`.
    ///
    /// Issues at most one primitive mutation. Movement toward the target is
    /// registered with `mover`, never performed here.
    pub fn step<W, M>(
        &self,
        ctx: &TickContext,
        assignee: EntityId,
        world: &mut W,
        mover: &mut M,
    ) -> StepStatus
    where
        W: WorldMut + ?Sized,
        M: MovementSink + ?Sized,
    {
        let actor = self.executor(assignee);
        if world.entity(actor).is_none() {
            tracing::debug!(tick = ctx.tick, %actor, action = self.name(), "actor vanished");
            return StepStatus::Complete;
        }
        if let Some(missing) = self
            .targets()
            .into_iter()
            .find(|id| world.entity(*id).is_none())
        {
            tracing::debug!(tick = ctx.tick, %actor, %missing, action = self.name(), "target vanished");
            return StepStatus::Complete;
        }

        let Some(op) = self.primitive() else {
            return self.step_move(ctx, actor, &*world, mover);
        };

        match world.apply(actor, op) {
            ActionCode::Ok => {
                if self.is_done(&*world, actor) {
                    StepStatus::Complete
                } else {
                    StepStatus::Continuing
                }
            }
            ActionCode::NotInRange => self.approach(ctx, actor, &*world, mover),
            ActionCode::Tired => StepStatus::Continuing,
            code => {
                tracing::debug!(
                    tick = ctx.tick,
                    %actor,
                    action = self.name(),
                    ?code,
                    "primitive failed"
                );
                StepStatus::Complete
            }
        }
    }

    fn step_move<W, M>(
        &self,
        ctx: &TickContext,
        actor: EntityId,
        world: &W,
        mover: &mut M,
    ) -> StepStatus
    where
        W: WorldView + ?Sized,
        M: MovementSink + ?Sized,
    {
        let Action::Move { destination, range } = self else {
            return StepStatus::Complete;
        };
        let Some(agent) = world.agent(actor) else {
            return StepStatus::Complete;
        };
        if agent.pos.in_range_to(*destination, *range) {
            return StepStatus::Complete;
        }
        mover.request_move(
            ctx,
            MoveIntent::new(actor, *destination, *range, self.move_priority()),
        );
        StepStatus::Continuing
    }

    fn approach<W, M>(
        &self,
        ctx: &TickContext,
        actor: EntityId,
        world: &W,
        mover: &mut M,
    ) -> StepStatus
    where
        W: WorldView + ?Sized,
        M: MovementSink + ?Sized,
    {
        if self.structure_actor().is_some() || world.agent(actor).is_none() {
            return StepStatus::Complete;
        }
        let Some(pos) = self.target_pos(world) else {
            return StepStatus::Complete;
        };
        mover.request_move(
            ctx,
            MoveIntent::new(actor, pos, self.range(), self.move_priority()),
        );
        StepStatus::Continuing
    }

    /// Completion condition, evaluated against the state visible after the attempt.
    fn is_done<W: WorldView + ?Sized>(&self, world: &W, actor: EntityId) -> bool {
        let agent_store = || world.entity(actor).and_then(|e| e.store());
        let out_of_energy = || agent_store().is_none_or(|s| s.get(ResourceKind::Energy) == 0);
        let agent_full = || agent_store().is_none_or(|s| s.is_full());
        let target = |id: EntityId| world.entity(id);
        let healthy = |id: EntityId| target(id).is_none_or(|e| !e.is_damaged());

        match self {
            Action::Harvest { source } => {
                let depleted = match target(*source).map(|e| &e.kind) {
                    Some(EntityKind::Source { energy, .. }) => *energy == 0,
                    Some(EntityKind::Mineral { amount, .. }) => *amount == 0,
                    _ => true,
                };
                agent_full() || depleted
            }
            Action::Build { site } => out_of_energy() || target(*site).is_none(),
            Action::Repair { target: id, until } => {
                let repaired = match target(*id).and_then(|e| e.hits()) {
                    Some((hits, max)) => hits >= until.map_or(max, |u| u.min(max)),
                    None => true,
                };
                repaired || out_of_energy()
            }
            Action::Upgrade { .. } => out_of_energy(),
            Action::Reserve { controller } => target(*controller)
                .and_then(|e| e.as_controller())
                .is_none_or(|c| c.reservation.unwrap_or(0) >= RESERVATION_CAP),
            Action::Attack { target: id }
            | Action::RangedAttack { target: id }
            | Action::TowerAttack { target: id, .. } => {
                target(*id).is_none_or(|e| e.hits().is_some_and(|(hits, _)| hits == 0))
            }
            Action::Dismantle { target: id } => {
                let carries = agent_store().is_some_and(|s| s.capacity() > 0);
                target(*id).is_none() || (carries && agent_full())
            }
            Action::Heal { target: id }
            | Action::RangedHeal { target: id }
            | Action::TowerHeal { target: id, .. }
            | Action::TowerRepair { target: id, .. } => healthy(*id),
            Action::RunReaction {
                lab,
                input_a,
                input_b,
            } => {
                let empty = |id: EntityId| {
                    target(id)
                        .and_then(|e| e.store())
                        .is_none_or(|s| s.is_empty())
                };
                let output_full = target(*lab)
                    .and_then(|e| e.store())
                    .is_none_or(|s| s.is_full());
                empty(*input_a) || empty(*input_b) || output_full
            }
            Action::Transfer { .. }
            | Action::Withdraw { .. }
            | Action::Move { .. }
            | Action::Spawn { .. }
            | Action::PlaceStructure { .. }
            | Action::Pickup { .. }
            | Action::Drop { .. }
            | Action::Claim { .. }
            | Action::Sign { .. }
            | Action::Recycle { .. }
            | Action::BoostCreep { .. }
            | Action::LinkTransfer { .. }
            | Action::GenerateSafeMode { .. } => true,
        }
    }
}
