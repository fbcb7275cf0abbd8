use std::cmp::Reverse;
use std::collections::BTreeMap;

use colony_actions::{all_satisfied, Action};
use colony_core::{
    memory::warn_malformed, AgentId, ColonyConfig, ColonyMemory, CpuMeter, EntityId, MovementSink,
    SchedulerConfig, TaskConfig, TickContext, WorldMut, WorldView,
};
use serde::{Deserialize, Serialize};

use crate::demand::{demands, REPAIR_RANK, REPAIR_RANK_SPREAD};
use crate::{ExecutionReport, Priority, StarvationReport, TaskId, TaskRequest, TaskStatus};

/// Owns the live task set and the per-agent scheduling bookkeeping.
#[derive(Debug, Clone)]
pub struct TaskManager {
    config: TaskConfig,
    scheduler: SchedulerConfig,
    tasks: BTreeMap<TaskId, TaskRequest>,
    assignments: BTreeMap<AgentId, TaskId>,
    last_executed: BTreeMap<AgentId, u64>,
    offset: usize,
    id_tick: u64,
    id_sequence: u64,
}

/// The persisted shape of a [`TaskManager`], stored under `ColonyMemory::tasks`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct TaskSnapshot {
    tasks: Vec<TaskRequest>,
    assignments: Vec<(AgentId, TaskId)>,
    last_executed: Vec<(AgentId, u64)>,
    offset: usize,
    id_tick: u64,
    id_sequence: u64,
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new(TaskConfig::default(), SchedulerConfig::default())
    }
}

impl TaskManager {
    pub fn new(config: TaskConfig, scheduler: SchedulerConfig) -> Self {
        Self {
            config,
            scheduler,
            tasks: BTreeMap::new(),
            assignments: BTreeMap::new(),
            last_executed: BTreeMap::new(),
            offset: 0,
            id_tick: 0,
            id_sequence: 0,
        }
    }

    pub fn from_config(config: &ColonyConfig) -> Self {
        Self::new(config.tasks.clone(), config.scheduler.clone())
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskRequest> {
        self.tasks.get(&id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskRequest> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.values().filter(|t| t.is_pending()).count()
    }

    /// The task currently owned by `agent`.
    pub fn assignment(&self, agent: AgentId) -> Option<&TaskRequest> {
        self.assignments
            .get(&agent)
            .and_then(|id| self.tasks.get(id))
    }

    pub fn last_executed(&self, agent: AgentId) -> Option<u64> {
        self.last_executed.get(&agent).copied()
    }

    fn next_id(&mut self, ctx: &TickContext) -> TaskId {
        if ctx.tick > self.id_tick {
            self.id_tick = ctx.tick;
            self.id_sequence = 0;
        }
        if self.id_sequence > TaskId::MAX_SEQUENCE {
            // Borrow the next tick's id space rather than wrap.
            self.id_tick += 1;
            self.id_sequence = 0;
        }
        let id = TaskId::new(self.id_tick, self.id_sequence);
        self.id_sequence += 1;
        id
    }

    /// Enqueue a task directly, bypassing demand generation.
    pub fn submit(&mut self, ctx: &TickContext, action: Action, priority: Priority, ttl: u64) -> TaskId {
        let id = self.next_id(ctx);
        self.tasks.insert(
            id,
            TaskRequest {
                id,
                action,
                priority,
                status: TaskStatus::Pending,
                created_at: ctx.tick,
                expires_at: ctx.tick.saturating_add(ttl),
                owner: None,
            },
        );
        id
    }

    /// Refresh pending work from world demand. Returns the number of new requests.
    pub fn generate_tasks<W: WorldView + ?Sized>(&mut self, ctx: &TickContext, world: &W) -> usize {
        self.cleanup_expired_tasks(ctx);

        let mut live: BTreeMap<(&'static str, Option<AgentId>), usize> = BTreeMap::new();
        for task in self.tasks.values().filter(|t| t.is_live()) {
            *live
                .entry((task.action.name(), task.action.primary_target()))
                .or_default() += 1;
        }

        let mut created = 0;
        for region in world.owned_regions() {
            for demand in demands(world, region, &self.config) {
                let have = live.entry(demand.key()).or_default();
                let missing = demand.slots.saturating_sub(*have);
                *have += missing;
                for _ in 0..missing {
                    self.submit(ctx, demand.action.clone(), demand.priority, demand.ttl);
                    created += 1;
                }
            }
        }
        if created > 0 {
            tracing::debug!(tick = ctx.tick, created, live = self.tasks.len(), "tasks generated");
        }
        created
    }

    /// Lift pending full repairs of `ranked` targets, most urgent first, so
    /// assignment serves them in that order. Returns how many tasks changed.
    pub fn rank_repairs(&mut self, ranked: &[EntityId]) -> usize {
        let mut changed = 0;
        for task in self.tasks.values_mut().filter(|t| t.is_pending()) {
            let Action::Repair {
                target,
                until: None,
            } = &task.action
            else {
                continue;
            };
            let Some(index) = ranked.iter().position(|id| id == target) else {
                continue;
            };
            let lift = REPAIR_RANK_SPREAD.saturating_sub(u32::try_from(index).unwrap_or(u32::MAX));
            let priority = Priority::normal(REPAIR_RANK + lift);
            if task.priority != priority {
                task.priority = priority;
                changed += 1;
            }
        }
        changed
    }

    /// Hand pending tasks to idle agents. Returns the number of assignments made.
    pub fn assign_tasks<W: WorldView + ?Sized>(
        &mut self,
        ctx: &TickContext,
        world: &W,
        agents: &[AgentId],
    ) -> usize {
        self.assignments
            .retain(|agent, _| world.agent(*agent).is_some());
        self.last_executed
            .retain(|agent, _| world.agent(*agent).is_some());
        let tasks = &self.tasks;
        self.assignments
            .retain(|_, id| tasks.get(id).is_some_and(|t| t.is_live()));

        let mut pending: Vec<(Reverse<Priority>, TaskId)> = self
            .tasks
            .values()
            .filter(|t| t.is_pending())
            .map(|t| (Reverse(t.priority), t.id))
            .collect();
        pending.sort();

        let mut order = agents.to_vec();
        order.sort();
        order.dedup();

        let mut assigned = 0;
        for agent in order {
            if pending.is_empty() {
                break;
            }
            if self.assignments.contains_key(&agent) {
                continue;
            }
            let Some(state) = world.entity(agent).and_then(|e| e.as_agent()) else {
                continue;
            };
            if state.spawning {
                continue;
            }
            let tasks = &self.tasks;
            let chosen = pending.iter().position(|(_, id)| {
                tasks
                    .get(id)
                    .is_some_and(|t| all_satisfied(&t.action.prerequisites(), state))
            });
            let Some(index) = chosen else {
                continue;
            };
            let (_, id) = pending.remove(index);
            if let Some(task) = self.tasks.get_mut(&id) {
                task.status = TaskStatus::InProcess;
                task.owner = Some(agent);
                self.assignments.insert(agent, id);
                assigned += 1;
                tracing::debug!(tick = ctx.tick, %agent, task = %id, action = task.action.name(), "task assigned");
            }
        }
        assigned
    }

    /// Step every assigned agent once, round-robin, until the CPU budget is spent.
    pub fn execute_tasks<W, M, C>(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        mover: &mut M,
        cpu: &C,
        agents: &[AgentId],
    ) -> ExecutionReport
    where
        W: WorldMut + ?Sized,
        M: MovementSink + ?Sized,
        C: CpuMeter + ?Sized,
    {
        let budget = cpu.limit() * self.scheduler.cpu_threshold;
        let mut report = ExecutionReport {
            tick: ctx.tick,
            budget,
            ..ExecutionReport::default()
        };

        let mut order = agents.to_vec();
        order.sort();
        order.dedup();
        let n = order.len();
        if n == 0 {
            return report;
        }
        let start = self.offset % n;
        self.offset = self.offset.wrapping_add(1);

        for i in 0..n {
            let used = cpu.used();
            if used > budget {
                report.skipped = n - i;
                tracing::warn!(
                    tick = ctx.tick,
                    skipped = report.skipped,
                    used,
                    budget,
                    "cpu budget exhausted, agents deferred to a later tick"
                );
                break;
            }

            let agent = order[(start + i) % n];
            report.processed += 1;
            self.last_executed.insert(agent, ctx.tick);

            let Some(&id) = self.assignments.get(&agent) else {
                continue;
            };
            let Some(task) = self.tasks.get(&id) else {
                self.assignments.remove(&agent);
                continue;
            };
            report.stepped += 1;
            let status = task.action.step(ctx, agent, world, mover);
            if status.is_complete() {
                self.tasks.remove(&id);
                self.assignments.remove(&agent);
                report.completed += 1;
            }
        }

        tracing::debug!(tick = ctx.tick, summary = %report.summary(), "tasks executed");
        report
    }

    /// Drop completed and expired requests. Returns how many were removed.
    pub fn cleanup_expired_tasks(&mut self, ctx: &TickContext) -> usize {
        let before = self.tasks.len();
        self.tasks
            .retain(|_, task| task.is_live() && !task.is_expired(ctx));
        let tasks = &self.tasks;
        self.assignments.retain(|_, id| tasks.contains_key(id));
        before - self.tasks.len()
    }

    /// Tracked agents not executed for `starvation_ticks` or more.
    pub fn starved_agents(&self, ctx: &TickContext) -> Vec<AgentId> {
        self.starvation_report(ctx).starved
    }

    pub fn starvation_report(&self, ctx: &TickContext) -> StarvationReport {
        let threshold = self.scheduler.starvation_ticks;
        let mut report = StarvationReport {
            tracked: self.last_executed.len(),
            ..StarvationReport::default()
        };
        for (agent, last) in &self.last_executed {
            let gap = ctx.ticks_since(*last);
            report.worst_gap = report.worst_gap.max(gap);
            if gap >= threshold {
                report.starved.push(*agent);
            }
        }
        if !report.is_healthy() {
            tracing::warn!(
                tick = ctx.tick,
                starved = report.starved.len(),
                worst_gap = report.worst_gap,
                "agents starved of execution"
            );
        }
        report
    }

    pub fn save(&self, memory: &mut ColonyMemory) -> colony_core::Result<()> {
        let snapshot = TaskSnapshot {
            tasks: self.tasks.values().cloned().collect(),
            assignments: self.assignments.iter().map(|(a, t)| (*a, *t)).collect(),
            last_executed: self.last_executed.iter().map(|(a, t)| (*a, *t)).collect(),
            offset: self.offset,
            id_tick: self.id_tick,
            id_sequence: self.id_sequence,
        };
        memory.tasks = serde_json::to_value(snapshot)?;
        Ok(())
    }

    /// Restore from `memory`. A missing record leaves the manager empty; a
    /// malformed one is logged and ignored.
    pub fn load(&mut self, memory: &ColonyMemory) {
        if memory.tasks.is_null() {
            return;
        }
        let snapshot: TaskSnapshot = match serde_json::from_value(memory.tasks.clone()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn_malformed("tasks", &err);
                return;
            }
        };
        self.tasks = snapshot.tasks.into_iter().map(|t| (t.id, t)).collect();
        let tasks = &self.tasks;
        self.assignments = snapshot
            .assignments
            .into_iter()
            .filter(|(_, id)| tasks.contains_key(id))
            .collect();
        self.last_executed = snapshot.last_executed.into_iter().collect();
        self.offset = snapshot.offset;
        self.id_tick = snapshot.id_tick;
        self.id_sequence = snapshot.id_sequence;
    }
}
