use colony_core::{
    ColonyConfig, ColonyMemory, CpuMeter, EntityId, TickContext, WorldMut, WorldView,
};
use colony_planner::{prioritize_repairs, InfrastructurePlanner, PlanReport};
use colony_tasks::{ExecutionReport, StarvationReport, TaskManager};
use colony_traffic::{ArbitrationReport, MovementArbiter};

/// Everything one [`Colony::tick`] did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    pub generated: usize,
    /// Pending road repairs whose priority changed with traffic.
    pub repairs_ranked: usize,
    pub assigned: usize,
    pub execution: ExecutionReport,
    pub stale_requests: usize,
    pub movement: ArbitrationReport,
    pub heatmap_decayed: bool,
    /// One entry per owned region when planning was due.
    pub plans: Vec<PlanReport>,
    pub starvation: StarvationReport,
}

impl TickReport {
    pub fn summary(&self) -> String {
        let placed: usize = self.plans.iter().map(|p| p.placed.len()).sum();
        format!(
            "tick {}: generated {}, assigned {}, [{}], [{}], sites placed {}, starved {}",
            self.tick,
            self.generated,
            self.assigned,
            self.execution.summary(),
            self.movement.summary(),
            placed,
            self.starvation.starved.len()
        )
    }
}

/// The coordination core: tasks, movement and infrastructure, wired in tick order.
#[derive(Debug, Clone, Default)]
pub struct Colony {
    tasks: TaskManager,
    arbiter: MovementArbiter,
    planner: InfrastructurePlanner,
}

impl Colony {
    pub fn new(config: &ColonyConfig) -> Self {
        Self {
            tasks: TaskManager::from_config(config),
            arbiter: MovementArbiter::from_config(config),
            planner: InfrastructurePlanner::from_config(config),
        }
    }

    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskManager {
        &mut self.tasks
    }

    pub fn arbiter(&self) -> &MovementArbiter {
        &self.arbiter
    }

    pub fn arbiter_mut(&mut self) -> &mut MovementArbiter {
        &mut self.arbiter
    }

    pub fn planner(&self) -> &InfrastructurePlanner {
        &self.planner
    }

    /// Run one tick: generate, rank road repairs by traffic, assign, execute
    /// under the CPU budget, arbitrate movement, maintain the heatmap and,
    /// when due, plan roads.
    ///
    /// Moves are only registered with the world; the caller advances it.
    pub fn tick<W, C>(&mut self, ctx: &TickContext, world: &mut W, cpu: &C) -> TickReport
    where
        W: WorldMut + ?Sized,
        C: CpuMeter + ?Sized,
    {
        let mut report = TickReport {
            tick: ctx.tick,
            ..TickReport::default()
        };

        report.generated = self.tasks.generate_tasks(ctx, &*world);
        for region in world.owned_regions() {
            let ranked: Vec<EntityId> =
                prioritize_repairs(&*world, region, Some(self.arbiter.heatmap()))
                    .iter()
                    .map(|t| t.id)
                    .collect();
            report.repairs_ranked += self.tasks.rank_repairs(&ranked);
        }
        let agents = world.owned_agents();
        report.assigned = self.tasks.assign_tasks(ctx, &*world, &agents);
        report.execution = self
            .tasks
            .execute_tasks(ctx, world, &mut self.arbiter, cpu, &agents);

        report.stale_requests = self.arbiter.cleanup(ctx, &*world);
        report.movement = self.arbiter.arbitrate(ctx, world);
        report.heatmap_decayed = self.arbiter.maintain(ctx);

        if self.planner.due(ctx) {
            for region in world.owned_regions() {
                let plan = self
                    .planner
                    .plan_pass(ctx, world, self.arbiter.heatmap(), region);
                report.plans.push(plan);
            }
        }

        report.starvation = self.tasks.starvation_report(ctx);
        tracing::debug!(tick = ctx.tick, summary = %report.summary(), "colony tick");
        report
    }

    pub fn save(&self, memory: &mut ColonyMemory) -> colony_core::Result<()> {
        self.tasks.save(memory)?;
        self.arbiter.save(memory);
        Ok(())
    }

    pub fn load(&mut self, memory: &ColonyMemory) {
        self.tasks.load(memory);
        self.arbiter.load(memory);
    }
}
