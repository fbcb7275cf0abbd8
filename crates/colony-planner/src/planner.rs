use std::collections::{BTreeMap, BTreeSet};

use colony_core::{
    ActionCode, ColonyConfig, EntityId, EntityKind, PlannerConfig, Position, Primitive, RegionId,
    StructureKind, TickContext, WorldMut, WorldView, ROAD_COST,
};
use colony_traffic::{find_path, TrafficHeatmap};

/// A cell worth paving, with the movement cost it would save weighted by use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub pos: Position,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    pub tick: u64,
    pub region: Option<RegionId>,
    pub considered: usize,
    pub placed: Vec<Position>,
    pub failed: Vec<(Position, ActionCode)>,
}

impl PlanReport {
    fn new(tick: u64, region: RegionId) -> Self {
        Self {
            tick,
            region: Some(region),
            ..Self::default()
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Considered: {}, Placed: {}, Failed: {}",
            self.considered,
            self.placed.len(),
            self.failed.len()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct InfrastructurePlanner {
    config: PlannerConfig,
    failures: BTreeMap<Position, u32>,
}

/// Cells that can take a new road: not already paved, not under construction,
/// and not blocked by a structure or natural feature.
fn buildable<W: WorldView + ?Sized>(world: &W, pos: Position) -> bool {
    world.terrain(pos).traversal_cost().is_some()
        && !world.entities_at(pos).iter().any(|e| {
            matches!(e.kind, EntityKind::Site { .. } | EntityKind::Structure(_)) || e.blocks_movement()
        })
}

/// The controller through which sites in `region` are placed, if it is ours.
fn placement_actor<W: WorldView + ?Sized>(world: &W, region: RegionId) -> Option<EntityId> {
    world
        .entities_in(region)
        .into_iter()
        .find(|e| e.as_controller().is_some_and(|c| c.owned))
        .map(|e| e.id)
}

impl InfrastructurePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            failures: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &ColonyConfig) -> Self {
        Self::new(config.planner.clone())
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Failed placement attempts recorded at `pos`.
    pub fn failures(&self, pos: Position) -> u32 {
        self.failures.get(&pos).copied().unwrap_or(0)
    }

    /// Whether a planning pass should run this tick.
    pub fn due(&self, ctx: &TickContext) -> bool {
        ctx.every(self.config.plan_interval)
    }

    /// Score every trafficked, buildable cell of `region`, best first.
    ///
    /// A cell's value is its traffic count times the cost a road would save
    /// there. Cells below `min_value` are dropped; ties keep position order.
    pub fn rank_candidates<W: WorldView + ?Sized>(
        &self,
        world: &W,
        heatmap: &TrafficHeatmap,
        region: RegionId,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = heatmap
            .region(region)
            .filter(|(pos, _)| buildable(world, *pos))
            .filter_map(|(pos, count)| {
                let saved = world.terrain(pos).traversal_cost()?.saturating_sub(ROAD_COST);
                let value = count * f64::from(saved);
                (value > 0.0 && value >= self.config.min_value).then_some(Candidate { pos, value })
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.value.total_cmp(&a.value).then(a.pos.cmp(&b.pos))
        });
        candidates
    }

    /// Place road sites on the best candidates, at most `placements_per_pass` of them.
    pub fn plan_roads<W: WorldMut + ?Sized>(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        heatmap: &TrafficHeatmap,
        region: RegionId,
    ) -> PlanReport {
        let candidates = self.rank_candidates(&*world, heatmap, region);
        let cells: Vec<Position> = candidates.iter().map(|c| c.pos).collect();
        let report = self.place(ctx, world, region, &cells);
        if let Some(best) = candidates.first() {
            tracing::debug!(
                tick = ctx.tick,
                %region,
                best = %best.pos,
                value = best.value,
                summary = %report.summary(),
                "road plan pass"
            );
        }
        report
    }

    /// One planning pass for `region`: pave the best trafficked cells, or lay
    /// the fixed source segments while no cell is worth paving yet.
    pub fn plan_pass<W: WorldMut + ?Sized>(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        heatmap: &TrafficHeatmap,
        region: RegionId,
    ) -> PlanReport {
        if self.rank_candidates(&*world, heatmap, region).is_empty() {
            tracing::debug!(tick = ctx.tick, %region, "no traffic candidates, placing fixed segments");
            return self.place_fixed_segments(ctx, world, region);
        }
        self.plan_roads(ctx, world, heatmap, region)
    }

    /// Path cells joining each source to the depot (storage, else spawn) and to
    /// the controller. Overlapping cells appear once, in first-seen order.
    pub fn fixed_segments<W: WorldView + ?Sized>(&self, world: &W, region: RegionId) -> Vec<Position> {
        let entities = world.entities_in(region);
        let sources: Vec<Position> = entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Source { .. }))
            .map(|e| e.pos)
            .collect();
        let depot = [StructureKind::Storage, StructureKind::Spawn]
            .into_iter()
            .find_map(|kind| world.structures_in(region, kind).first().map(|e| e.pos));
        let controller = entities
            .iter()
            .find(|e| e.as_controller().is_some())
            .map(|e| e.pos);

        let mut seen = BTreeSet::new();
        let mut cells = Vec::new();
        for source in sources {
            for goal in [depot, controller].into_iter().flatten() {
                let Some(path) = find_path(world, source, goal, 1) else {
                    continue;
                };
                for pos in path {
                    if seen.insert(pos) {
                        cells.push(pos);
                    }
                }
            }
        }
        cells
    }

    /// Place road sites along [`fixed_segments`](Self::fixed_segments) that are not built yet.
    pub fn place_fixed_segments<W: WorldMut + ?Sized>(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        region: RegionId,
    ) -> PlanReport {
        let cells: Vec<Position> = self
            .fixed_segments(&*world, region)
            .into_iter()
            .filter(|pos| buildable(&*world, *pos))
            .collect();
        self.place(ctx, world, region, &cells)
    }

    fn place<W: WorldMut + ?Sized>(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        region: RegionId,
        cells: &[Position],
    ) -> PlanReport {
        let mut report = PlanReport::new(ctx.tick, region);
        report.considered = cells.len();
        let Some(actor) = placement_actor(&*world, region) else {
            tracing::debug!(tick = ctx.tick, %region, "no owned controller, skipping placement");
            return report;
        };

        for &pos in cells {
            if report.placed.len() >= self.config.placements_per_pass {
                break;
            }
            let code = world.apply(
                actor,
                Primitive::CreateSite {
                    pos,
                    structure: StructureKind::Road,
                },
            );
            if code == ActionCode::Ok {
                self.failures.remove(&pos);
                tracing::info!(tick = ctx.tick, %pos, "road site placed");
                report.placed.push(pos);
                continue;
            }
            let failures = self.failures.entry(pos).or_insert(0);
            *failures += 1;
            if *failures == self.config.placement_failure_warn {
                tracing::warn!(
                    tick = ctx.tick,
                    %pos,
                    ?code,
                    failures = *failures,
                    "road placement keeps failing"
                );
            }
            report.failed.push((pos, code));
        }
        report
    }
}
