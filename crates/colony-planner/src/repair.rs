use colony_core::{EntityId, Position, RegionId, StructureKind, WorldView};
use colony_traffic::TrafficHeatmap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepairTarget {
    pub id: EntityId,
    pub pos: Position,
    pub hits: u32,
    pub hits_max: u32,
    /// Traffic at the road's cell; zero when ranked without a heatmap.
    pub traffic: f64,
}

/// Damaged roads of `region`, most urgent first.
///
/// With traffic data the busiest roads come first and remaining hits break
/// ties; without it the weakest roads come first.
pub fn prioritize_repairs<W: WorldView + ?Sized>(
    world: &W,
    region: RegionId,
    heatmap: Option<&TrafficHeatmap>,
) -> Vec<RepairTarget> {
    let mut targets: Vec<RepairTarget> = world
        .structures_in(region, StructureKind::Road)
        .into_iter()
        .filter_map(|e| {
            let (hits, hits_max) = e.hits()?;
            (hits < hits_max).then(|| RepairTarget {
                id: e.id,
                pos: e.pos,
                hits,
                hits_max,
                traffic: heatmap.map_or(0.0, |h| h.count(e.pos)),
            })
        })
        .collect();

    match heatmap {
        Some(_) => targets.sort_by(|a, b| {
            b.traffic
                .total_cmp(&a.traffic)
                .then(a.hits.cmp(&b.hits))
                .then(a.id.cmp(&b.id))
        }),
        None => targets.sort_by_key(|t| (t.hits, t.id)),
    }
    targets
}
