use std::collections::BTreeMap;

use colony_core::{Position, RegionId, TickContext, TrafficConfig, TrafficRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficCell {
    pub count: f64,
    pub last_update: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatmapStats {
    pub cells: usize,
    pub per_region: BTreeMap<RegionId, usize>,
    /// Fill fraction of the global cap.
    pub utilization: f64,
    pub hottest: Option<(Position, f64)>,
}

/// Decaying per-cell usage counts, bounded globally and per region.
#[derive(Debug, Clone)]
pub struct TrafficHeatmap {
    config: TrafficConfig,
    cells: BTreeMap<Position, TrafficCell>,
    last_decay: u64,
}

impl Default for TrafficHeatmap {
    fn default() -> Self {
        Self::new(TrafficConfig::default())
    }
}

fn hotter_first(a: &(Position, f64), b: &(Position, f64)) -> std::cmp::Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

impl TrafficHeatmap {
    pub fn new(config: TrafficConfig) -> Self {
        Self {
            config,
            cells: BTreeMap::new(),
            last_decay: 0,
        }
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn record(&mut self, pos: Position, tick: u64) {
        let cell = self.cells.entry(pos).or_insert(TrafficCell {
            count: 0.0,
            last_update: tick,
        });
        cell.count += 1.0;
        cell.last_update = tick;
    }

    pub fn count(&self, pos: Position) -> f64 {
        self.cells.get(&pos).map_or(0.0, |c| c.count)
    }

    pub fn get(&self, pos: Position) -> Option<&TrafficCell> {
        self.cells.get(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &TrafficCell)> {
        self.cells.iter().map(|(p, c)| (*p, c))
    }

    /// Cells of one region, in position order.
    pub fn region(&self, region: RegionId) -> impl Iterator<Item = (Position, f64)> + '_ {
        let lo = Position::new(region, i32::MIN, i32::MIN);
        let hi = Position::new(region, i32::MAX, i32::MAX);
        self.cells.range(lo..=hi).map(|(p, c)| (*p, c.count))
    }

    fn under_pressure(&self) -> bool {
        self.cells.len() as f64 >= self.config.pressure_fraction * self.config.max_total_positions as f64
    }

    /// Run [`decay`](Self::decay) when `decay_interval` ticks have passed. Returns whether it ran.
    pub fn maintain(&mut self, ctx: &TickContext) -> bool {
        if ctx.ticks_since(self.last_decay) < self.config.decay_interval.max(1) {
            return false;
        }
        self.decay(ctx.tick);
        true
    }

    /// One decay pass, followed by cap enforcement.
    pub fn decay(&mut self, tick: u64) {
        let mut rate = self.config.decay_rate;
        if self.under_pressure() {
            rate *= self.config.aggressive_decay_factor;
            tracing::warn!(
                tick,
                cells = self.cells.len(),
                cap = self.config.max_total_positions,
                rate,
                "traffic heatmap under memory pressure, decaying aggressively"
            );
        }
        let threshold = self.config.cleanup_threshold;
        self.cells.retain(|_, cell| {
            cell.count *= rate;
            cell.count >= threshold
        });
        self.last_decay = tick;
        self.enforce_caps();
    }

    /// Evict the coldest cells until both caps hold. Returns how many were evicted.
    pub fn enforce_caps(&mut self) -> usize {
        let mut evicted = 0;

        let mut by_region: BTreeMap<RegionId, Vec<(Position, f64)>> = BTreeMap::new();
        for (pos, cell) in &self.cells {
            by_region.entry(pos.region).or_default().push((*pos, cell.count));
        }
        for (region, mut cells) in by_region {
            let cap = self.config.max_positions_per_region;
            if cells.len() <= cap {
                continue;
            }
            cells.sort_by(|a, b| hotter_first(a, b));
            let excess = cells.len() - cap;
            for (pos, _) in cells.drain(cap..) {
                self.cells.remove(&pos);
            }
            evicted += excess;
            tracing::debug!(%region, excess, "region traffic cap enforced");
        }

        let cap = self.config.max_total_positions;
        if self.cells.len() > cap {
            let mut cells: Vec<(Position, f64)> =
                self.cells.iter().map(|(p, c)| (*p, c.count)).collect();
            cells.sort_by(hotter_first);
            let excess = cells.len() - cap;
            for (pos, _) in cells.drain(cap..) {
                self.cells.remove(&pos);
            }
            evicted += excess;
        }

        if self.near_capacity() {
            tracing::warn!(
                cells = self.cells.len(),
                cap,
                utilization = self.utilization(),
                "traffic heatmap near capacity"
            );
        }
        evicted
    }

    /// Whether the map has reached the high-water mark of its global cap.
    pub fn near_capacity(&self) -> bool {
        self.utilization() >= self.config.high_water_mark
    }

    fn utilization(&self) -> f64 {
        if self.config.max_total_positions == 0 {
            return 1.0;
        }
        self.cells.len() as f64 / self.config.max_total_positions as f64
    }

    pub fn stats(&self) -> HeatmapStats {
        let mut per_region = BTreeMap::new();
        let mut hottest: Option<(Position, f64)> = None;
        for (pos, cell) in &self.cells {
            *per_region.entry(pos.region).or_default() += 1;
            if hottest.is_none_or(|(_, count)| cell.count > count) {
                hottest = Some((*pos, cell.count));
            }
        }
        HeatmapStats {
            cells: self.cells.len(),
            per_region,
            utilization: self.utilization(),
            hottest,
        }
    }

    /// The `n` busiest cells of `region`, hottest first, ties by position.
    pub fn hottest(&self, region: RegionId, n: usize) -> Vec<(Position, f64)> {
        let mut cells: Vec<_> = self.region(region).collect();
        cells.sort_by(hotter_first);
        cells.truncate(n);
        cells
    }

    pub fn to_records(&self) -> Vec<TrafficRecord> {
        self.cells
            .iter()
            .map(|(pos, cell)| TrafficRecord {
                x: pos.x,
                y: pos.y,
                region: pos.region,
                count: cell.count,
                last_update: cell.last_update,
            })
            .collect()
    }

    /// Replace the contents with persisted records. Non-finite, non-positive,
    /// or out-of-bounds records are skipped.
    pub fn restore(&mut self, records: &[TrafficRecord]) {
        self.cells = records
            .iter()
            .filter(|r| r.count.is_finite() && r.count > 0.0 && r.position().in_bounds())
            .map(|r| {
                (
                    r.position(),
                    TrafficCell {
                        count: r.count,
                        last_update: r.last_update,
                    },
                )
            })
            .collect();
        self.last_decay = self.cells.values().map(|c| c.last_update).max().unwrap_or(0);
        self.enforce_caps();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: i32, y: i32) -> Position {
        Position::new(RegionId(0), x, y)
    }

    #[test]
    fn ten_visits_fade_after_114_decays() {
        let mut heatmap = TrafficHeatmap::default();
        for tick in 0..10 {
            heatmap.record(at(10, 10), tick);
        }
        for k in 1..=113 {
            heatmap.decay(k);
        }
        assert!(heatmap.count(at(10, 10)) >= 1.0);
        heatmap.decay(114);
        assert_eq!(heatmap.count(at(10, 10)), 0.0);
        assert!(heatmap.is_empty());
    }

    #[test]
    fn region_cap_evicts_the_coldest_cells() {
        let mut heatmap = TrafficHeatmap::new(TrafficConfig {
            max_positions_per_region: 10,
            ..TrafficConfig::default()
        });
        for i in 0..15 {
            for _ in 0..=i {
                heatmap.record(at(i, 0), 1);
            }
        }
        assert_eq!(heatmap.enforce_caps(), 5);
        assert_eq!(heatmap.len(), 10);
        for i in 0..5 {
            assert_eq!(heatmap.count(at(i, 0)), 0.0);
        }
        assert_eq!(heatmap.count(at(5, 0)), 6.0);
    }

    #[test]
    fn global_cap_applies_across_regions() {
        let mut heatmap = TrafficHeatmap::new(TrafficConfig {
            max_total_positions: 4,
            ..TrafficConfig::default()
        });
        for region in 0..3 {
            for x in 0..2 {
                let pos = Position::new(RegionId(region), x, 0);
                for _ in 0..(region * 2 + x as u32 + 1) {
                    heatmap.record(pos, 1);
                }
            }
        }
        assert_eq!(heatmap.enforce_caps(), 2);
        assert_eq!(heatmap.stats().per_region.get(&RegionId(0)), None);
    }

    #[test]
    fn decay_trims_overflow_spread_over_regions() {
        let mut heatmap = TrafficHeatmap::default();
        let cap = heatmap.config().max_total_positions;
        let per_region = (cap + 5) / 5;
        let cold: Vec<Position> = (0..5).map(|i| Position::new(RegionId(3), i, 0)).collect();
        for region in 0..5 {
            for i in 0..per_region as i32 {
                let pos = Position::new(RegionId(region), i % 50, i / 50);
                let visits = if cold.contains(&pos) { 2 } else { 10 };
                for _ in 0..visits {
                    heatmap.record(pos, 1);
                }
            }
        }
        assert_eq!(heatmap.len(), cap + 5);
        assert!(per_region <= heatmap.config().max_positions_per_region);

        heatmap.decay(10);

        assert_eq!(heatmap.len(), cap);
        for pos in cold {
            assert_eq!(heatmap.get(pos), None);
        }
        assert!(heatmap.near_capacity());
        assert_eq!(heatmap.stats().utilization, 1.0);
    }

    #[test]
    fn high_water_mark_tracks_utilization() {
        let mut heatmap = TrafficHeatmap::new(TrafficConfig {
            max_total_positions: 10,
            ..TrafficConfig::default()
        });
        for x in 0..8 {
            heatmap.record(at(x, 0), 1);
        }
        assert!(!heatmap.near_capacity());
        heatmap.record(at(8, 0), 1);
        assert!(heatmap.near_capacity());
    }

    #[test]
    fn pressure_decays_faster() {
        let config = TrafficConfig {
            max_total_positions: 10,
            ..TrafficConfig::default()
        };
        let mut relaxed = TrafficHeatmap::new(config.clone());
        let mut pressed = TrafficHeatmap::new(config);
        for _ in 0..10 {
            relaxed.record(at(0, 0), 1);
        }
        for x in 0..8 {
            for _ in 0..10 {
                pressed.record(at(x, 0), 1);
            }
        }
        relaxed.decay(2);
        pressed.decay(2);
        assert!(pressed.count(at(0, 0)) < relaxed.count(at(0, 0)));
    }

    #[test]
    fn maintain_follows_the_interval() {
        let mut heatmap = TrafficHeatmap::default();
        heatmap.record(at(1, 1), 0);
        assert!(!heatmap.maintain(&TickContext::new(9)));
        assert!(heatmap.maintain(&TickContext::new(10)));
        assert!(!heatmap.maintain(&TickContext::new(15)));
        assert!(heatmap.maintain(&TickContext::new(20)));
    }

    #[test]
    fn hottest_orders_by_count_then_position() {
        let mut heatmap = TrafficHeatmap::default();
        heatmap.record(at(3, 3), 1);
        heatmap.record(at(1, 1), 1);
        heatmap.record(at(2, 2), 1);
        heatmap.record(at(2, 2), 2);
        let top = heatmap.hottest(RegionId(0), 2);
        assert_eq!(top, vec![(at(2, 2), 2.0), (at(1, 1), 1.0)]);
        assert_eq!(heatmap.stats().hottest, Some((at(2, 2), 2.0)));
    }

    #[test]
    fn records_restore_the_map() {
        let mut heatmap = TrafficHeatmap::default();
        heatmap.record(at(4, 4), 7);
        let mut records = heatmap.to_records();
        records.push(TrafficRecord {
            x: 99,
            y: 0,
            region: RegionId(0),
            count: 3.0,
            last_update: 7,
        });
        let mut restored = TrafficHeatmap::default();
        restored.restore(&records);
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.get(at(4, 4)).map(|c| c.last_update), Some(7));
    }
}
