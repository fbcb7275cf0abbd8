use colony_core::{
    MoveIntent, MovementSink, Position, RegionId, TickContext, TrafficConfig, WorldView,
};
use colony_sim::demo_world;
use colony_traffic::{find_path, MovementArbiter, TrafficHeatmap};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn filled_heatmap(cells: usize) -> TrafficHeatmap {
    let mut heatmap = TrafficHeatmap::new(TrafficConfig {
        max_total_positions: cells,
        max_positions_per_region: cells,
        ..TrafficConfig::default()
    });
    for i in 0..cells {
        let region = RegionId((i / 2500) as u32);
        let pos = Position::new(region, (i % 50) as i32, ((i / 50) % 50) as i32);
        for _ in 0..(i % 7 + 2) {
            heatmap.record(pos, 1);
        }
    }
    heatmap
}

fn bench_heatmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("colony-traffic/heatmap.decay");
    for &n in &[500usize, 2_000usize] {
        let heatmap = filled_heatmap(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_n| {
            b.iter_batched(
                || heatmap.clone(),
                |mut heatmap| {
                    heatmap.decay(10);
                    black_box(heatmap.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_arbitrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("colony-traffic/arbitrate");
    let targets = [
        Position::new(RegionId(0), 10, 10),
        Position::new(RegionId(0), 40, 12),
        Position::new(RegionId(0), 25, 42),
    ];
    for &n in &[10usize, 60usize] {
        let world = demo_world(n);
        let ctx = TickContext::new(0);
        let mut arbiter = MovementArbiter::default();
        for (i, agent) in world.owned_agents().into_iter().enumerate() {
            let intent = MoveIntent::new(agent, targets[i % targets.len()], 1, (i % 4) as u32);
            arbiter.request_move(&ctx, intent);
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_n| {
            b.iter_batched(
                || (world.clone(), arbiter.clone()),
                |(mut world, mut arbiter)| {
                    let report = arbiter.arbitrate(&ctx, &mut world);
                    black_box(report.outcomes.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_path(c: &mut Criterion) {
    let world = demo_world(0);
    let start = Position::new(RegionId(0), 45, 45);
    let goal = Position::new(RegionId(0), 10, 10);
    c.bench_function("colony-traffic/find_path(corner-to-source)", |b| {
        b.iter(|| {
            let path = find_path(&world, start, goal, 1);
            black_box(path.map(|p| p.len()));
        })
    });
}

criterion_group!(benches, bench_heatmap, bench_arbitrate, bench_path);
criterion_main!(benches);
